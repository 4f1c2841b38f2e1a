use crate::config::UploadConfig;
use crate::services::storage::LocalStorageService;
use std::sync::Arc;
use tracing::{info, warn};

pub async fn setup_storage(config: &UploadConfig) -> Arc<LocalStorageService> {
    let storage = LocalStorageService::new(&config.upload_dir);

    info!("📂 Upload directory: {}", config.upload_dir.display());

    // Uploads retry the mkdir on every write, so a failure here is not fatal
    match storage.ensure_root().await {
        Ok(()) => info!("✅ Upload directory is ready"),
        Err(e) => warn!("❌ Upload directory not ready yet: {:?}", e),
    }

    Arc::new(storage)
}
