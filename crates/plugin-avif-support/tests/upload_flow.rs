//! End-to-end hook flow: plugin loaded into a manager, uploads filtered
//! through `upload_mimes` and `handle_upload` with a recording codec.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use mediahub_core::error::ErrorKind;
use mediahub_core::result::AppResult;
use mediahub_core::traits::codec::{CodecError, ImageCodec};
use mediahub_core::traits::option_store::OptionStore;
use mediahub_core::types::{ImageFormat, MimeMap, UploadDescriptor};
use mediahub_plugin::capability::{CapabilityRegistry, NamedCapability};
use mediahub_plugin::hooks::definitions::HookPoint;
use mediahub_plugin::manager::PluginManager;
use mediahub_plugin::store::MemoryOptionStore;
use plugin_avif_support::{AvifSupportPlugin, SLUG, WEBP_CAPABILITY};

const OPTION: &str = "avif-support_options";

#[derive(Debug, Default)]
struct RecordingCodec {
    calls: Mutex<Vec<(UploadDescriptor, ImageFormat, u8)>>,
    fail: bool,
}

impl RecordingCodec {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<(UploadDescriptor, ImageFormat, u8)> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl ImageCodec for RecordingCodec {
    fn name(&self) -> &str {
        "recording"
    }

    fn supports(&self, _target: ImageFormat) -> bool {
        true
    }

    async fn convert(
        &self,
        upload: &UploadDescriptor,
        target: ImageFormat,
        quality: u8,
    ) -> Result<UploadDescriptor, CodecError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((upload.clone(), target, quality));
        if self.fail {
            return Err(CodecError::Encode {
                format: target,
                reason: "encoder exploded".to_string(),
            });
        }
        Ok(upload.with_format(target))
    }
}

struct Host {
    manager: PluginManager,
    plugin: Arc<AvifSupportPlugin>,
    store: Arc<MemoryOptionStore>,
    codec: Arc<RecordingCodec>,
}

impl Host {
    async fn start(record: Option<Value>, webp: bool, codec: RecordingCodec) -> Self {
        let store = Arc::new(MemoryOptionStore::new());
        if let Some(record) = record {
            store.update_option(OPTION, record).await.expect("seed options");
        }

        let capabilities = Arc::new(CapabilityRegistry::new());
        if webp {
            capabilities
                .register(Arc::new(NamedCapability::new(WEBP_CAPABILITY, "1.0.0")))
                .await;
        }

        let codec = Arc::new(codec);
        let plugin = Arc::new(AvifSupportPlugin::new(store.clone(), codec.clone()));
        let manager = PluginManager::new(capabilities);
        manager
            .load_plugin(plugin.clone())
            .await
            .expect("load plugin");

        Self {
            manager,
            plugin,
            store,
            codec,
        }
    }

    async fn upload(&self, upload: &UploadDescriptor) -> AppResult<UploadDescriptor> {
        let ctx = self.manager.request_context().await;
        self.manager
            .dispatcher()
            .apply_filter(HookPoint::HandleUpload, &ctx, "upload", upload)
            .await
    }

    async fn mimes(&self) -> MimeMap {
        let ctx = self.manager.request_context().await;
        self.manager
            .dispatcher()
            .apply_filter(HookPoint::UploadMimes, &ctx, "mimes", &MimeMap::host_defaults())
            .await
            .expect("upload_mimes")
    }
}

fn avif_upload() -> UploadDescriptor {
    UploadDescriptor::new(
        "/srv/uploads/2026/10/photo.avif",
        "https://media.test/uploads/2026/10/photo.avif",
        "image/avif",
    )
}

#[tokio::test]
async fn test_asis_keeps_upload() {
    let host = Host::start(
        Some(json!({ "enabled": 1, "handling_mode": "asis", "quality": 80 })),
        true,
        RecordingCodec::default(),
    )
    .await;

    assert_eq!(host.upload(&avif_upload()).await.expect("upload"), avif_upload());
    assert!(host.codec.calls().is_empty());
    assert_eq!(host.mimes().await.get("avif"), Some("image/avif"));
}

#[tokio::test]
async fn test_disabled_is_identity_everywhere() {
    let host = Host::start(
        Some(json!({ "enabled": 0, "handling_mode": "webp" })),
        true,
        RecordingCodec::default(),
    )
    .await;

    assert_eq!(host.upload(&avif_upload()).await.expect("upload"), avif_upload());
    assert_eq!(host.mimes().await, MimeMap::host_defaults());
    assert!(host.codec.calls().is_empty());
}

#[tokio::test]
async fn test_webp_mode_with_capability_converts() {
    let host = Host::start(
        Some(json!({ "enabled": 1, "handling_mode": "webp", "quality": 80 })),
        true,
        RecordingCodec::default(),
    )
    .await;

    let result = host.upload(&avif_upload()).await.expect("upload");

    assert_eq!(host.codec.calls(), vec![(avif_upload(), ImageFormat::Webp, 80)]);
    assert_eq!(result.mime_type, "image/webp");
    assert_eq!(result.url, "https://media.test/uploads/2026/10/photo.webp");
}

#[tokio::test]
async fn test_webp_mode_without_capability_falls_back() {
    let host = Host::start(
        Some(json!({ "enabled": 1, "handling_mode": "webp", "quality": 80 })),
        false,
        RecordingCodec::default(),
    )
    .await;

    assert_eq!(host.upload(&avif_upload()).await.expect("upload"), avif_upload());
    assert!(host.codec.calls().is_empty());
}

#[tokio::test]
async fn test_non_avif_uploads_are_untouched() {
    let host = Host::start(
        Some(json!({ "enabled": 1, "handling_mode": "convert" })),
        true,
        RecordingCodec::default(),
    )
    .await;

    let png = UploadDescriptor::new("/srv/uploads/a.png", "https://media.test/a.png", "image/png");
    assert_eq!(host.upload(&png).await.expect("upload"), png);
    assert!(host.codec.calls().is_empty());
}

#[tokio::test]
async fn test_missing_options_use_defaults() {
    let host = Host::start(None, true, RecordingCodec::default()).await;

    assert_eq!(host.upload(&avif_upload()).await.expect("upload"), avif_upload());
    assert_eq!(host.mimes().await.get("avif"), Some("image/avif"));
    assert!(host.store.get_option(OPTION).await.expect("read").is_none());
}

#[tokio::test]
async fn test_option_changes_apply_to_next_upload() {
    let host = Host::start(
        Some(json!({ "enabled": 1, "handling_mode": "asis" })),
        false,
        RecordingCodec::default(),
    )
    .await;
    assert_eq!(host.upload(&avif_upload()).await.expect("upload"), avif_upload());

    host.store
        .update_option(
            OPTION,
            json!({ "enabled": 1, "handling_mode": "convert", "quality": 150 }),
        )
        .await
        .expect("edit options");

    let result = host.upload(&avif_upload()).await.expect("upload");
    assert_eq!(result, avif_upload());
    assert_eq!(host.codec.calls(), vec![(avif_upload(), ImageFormat::Avif, 100)]);
}

#[tokio::test]
async fn test_legacy_record_is_honored() {
    let host = Host::start(
        Some(json!({ "enabled": true, "target_format": "webp", "quality": 40 })),
        true,
        RecordingCodec::default(),
    )
    .await;

    host.upload(&avif_upload()).await.expect("upload");
    assert_eq!(host.codec.calls(), vec![(avif_upload(), ImageFormat::Webp, 40)]);
}

#[tokio::test]
async fn test_codec_failure_bubbles_up() {
    let host = Host::start(
        Some(json!({ "enabled": 1, "handling_mode": "webp", "quality": 80 })),
        true,
        RecordingCodec::failing(),
    )
    .await;

    let err = host.upload(&avif_upload()).await.expect_err("codec failure");
    assert_eq!(err.kind, ErrorKind::ExternalService);
    assert!(err.message.contains("encoder exploded"));
    assert_eq!(host.codec.calls().len(), 1);
}

#[tokio::test]
async fn test_capabilities_are_snapshotted_per_request() {
    let host = Host::start(
        Some(json!({ "enabled": 1, "handling_mode": "webp" })),
        false,
        RecordingCodec::default(),
    )
    .await;

    let ctx = host.manager.request_context().await;
    host.manager
        .capabilities()
        .register(Arc::new(NamedCapability::new(WEBP_CAPABILITY, "1.0.0")))
        .await;

    let same_request = host
        .manager
        .dispatcher()
        .apply_filter(HookPoint::HandleUpload, &ctx, "upload", &avif_upload())
        .await
        .expect("upload");
    assert_eq!(same_request, avif_upload());
    assert!(host.codec.calls().is_empty());

    host.upload(&avif_upload()).await.expect("next request");
    assert_eq!(host.codec.calls().len(), 1);
}

#[tokio::test]
async fn test_init_publishes_blueprint() {
    let with_webp = Host::start(None, true, RecordingCodec::default()).await;
    let without_webp = Host::start(None, false, RecordingCodec::default()).await;

    for host in [&with_webp, &without_webp] {
        host.manager.init().await.expect("init");
    }

    let with = serde_json::to_value(with_webp.plugin.settings().blueprint().await)
        .expect("serialize");
    let without = serde_json::to_value(without_webp.plugin.settings().blueprint().await)
        .expect("serialize");
    assert!(with["config"]["fields"]["handling_mode"]["options"]["webp"].is_string());
    assert!(without["config"]["fields"]["handling_mode"]["options"]["webp"].is_null());
}

#[tokio::test]
async fn test_activation_runs_once_and_keeps_data() {
    let host = Host::start(None, false, RecordingCodec::default()).await;

    assert!(host.manager.activate(SLUG).await.expect("activate"));
    assert_eq!(
        host.store.get_option(OPTION).await.expect("read"),
        Some(json!({ "enabled": 1, "handling_mode": "asis", "quality": 80 }))
    );

    assert!(!host.manager.activate(SLUG).await.expect("second activate"));
}
