//! Declarative settings schema consumed by the settings-page generator.
//!
//! Plugins describe their fields; rendering is someone else's job. The JSON
//! shape is `{section: {title, fields: {name: {type, label, desc, ...}}}}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input widget of a settings field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// On/off toggle.
    Switch,
    /// One-of choice rendered as radio buttons.
    Radio,
    /// Bounded integer.
    Number,
}

/// One configurable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Widget type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Field label.
    pub label: String,
    /// Help text under the field.
    #[serde(rename = "desc", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Field whose value controls this field's visibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Whether other fields hang off this one.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_parent: bool,
    /// Choices for radio fields: value → label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<BTreeMap<String, String>>,
    /// Lower bound for number fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    /// Upper bound for number fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Default value.
    pub default: Value,
}

impl FieldSpec {
    fn base(field_type: FieldType, label: &str, default: Value) -> Self {
        Self {
            field_type,
            label: label.to_string(),
            description: None,
            parent: None,
            is_parent: false,
            options: None,
            min: None,
            max: None,
            default,
        }
    }

    /// An on/off switch. Defaults are stored as `0`/`1`.
    pub fn switch(label: &str, default: bool) -> Self {
        Self::base(FieldType::Switch, label, Value::from(u8::from(default)))
    }

    /// A radio choice.
    pub fn radio<'a>(
        label: &str,
        options: impl IntoIterator<Item = (&'a str, &'a str)>,
        default: &str,
    ) -> Self {
        let options = options
            .into_iter()
            .map(|(value, text)| (value.to_string(), text.to_string()))
            .collect();
        Self {
            options: Some(options),
            ..Self::base(FieldType::Radio, label, Value::from(default))
        }
    }

    /// A bounded integer.
    pub fn number(label: &str, min: i64, max: i64, default: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::base(FieldType::Number, label, Value::from(default))
        }
    }

    /// Sets the help text.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Shows this field only while `parent` is on.
    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    /// Marks this field as controlling others.
    pub fn as_parent(mut self) -> Self {
        self.is_parent = true;
        self
    }
}

/// A titled group of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsSection {
    /// Section heading.
    pub title: String,
    /// Field name → spec.
    pub fields: BTreeMap<String, FieldSpec>,
}

impl SettingsSection {
    /// Creates an empty section.
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a field.
    pub fn field(mut self, name: &str, spec: FieldSpec) -> Self {
        self.fields.insert(name.to_string(), spec);
        self
    }
}

/// A plugin's full settings schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsBlueprint {
    /// Section key → section.
    sections: BTreeMap<String, SettingsSection>,
}

impl SettingsBlueprint {
    /// Creates an empty blueprint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a section.
    pub fn section(mut self, key: &str, section: SettingsSection) -> Self {
        self.sections.insert(key.to_string(), section);
        self
    }

    /// Looks up a field across all sections.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.sections.values().find_map(|s| s.fields.get(name))
    }

    /// Field defaults as a flat object, the shape stored in the option store.
    pub fn defaults(&self) -> serde_json::Map<String, Value> {
        self.sections
            .values()
            .flat_map(|s| s.fields.iter())
            .map(|(name, spec)| (name.clone(), spec.default.clone()))
            .collect()
    }
}
