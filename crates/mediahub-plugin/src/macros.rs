//! Convenience macros for plugin development.

/// Macro for creating a plugin info struct.
///
/// # Example
/// ```rust,ignore
/// let info = plugin_info!(
///     id: "my-plugin",
///     name: "My Plugin",
///     version: "1.0.0",
///     description: "Does things",
///     author: "Dev"
/// );
/// ```
#[macro_export]
macro_rules! plugin_info {
    (
        id: $id:expr,
        name: $name:expr,
        version: $version:expr,
        description: $desc:expr,
        author: $author:expr
    ) => {
        $crate::plugin_info!(
            id: $id,
            name: $name,
            version: $version,
            description: $desc,
            author: $author,
            priority: 100
        )
    };
    (
        id: $id:expr,
        name: $name:expr,
        version: $version:expr,
        description: $desc:expr,
        author: $author:expr,
        priority: $priority:expr
    ) => {
        $crate::registry::PluginInfo {
            id: $id.to_string(),
            name: $name.to_string(),
            version: $version.to_string(),
            description: $desc.to_string(),
            author: $author.to_string(),
            hooks: Vec::new(),
            priority: $priority,
        }
    };
}

/// Macro for quickly building a `HookPayload`.
///
/// # Example
/// ```rust,ignore
/// let payload = hook_payload!(HookPoint::HandleUpload, {
///     "upload" => json!({ "file": "/tmp/a.avif", "url": "a.avif", "type": "image/avif" }),
/// });
/// ```
#[macro_export]
macro_rules! hook_payload {
    ($hook:expr) => {
        $crate::hooks::definitions::HookPayload::new($hook)
    };
    ($hook:expr, { $($key:expr => $value:expr),* $(,)? }) => {{
        let mut payload = $crate::hooks::definitions::HookPayload::new($hook);
        $(
            payload.data.insert($key.to_string(), $value);
        )*
        payload
    }};
}
