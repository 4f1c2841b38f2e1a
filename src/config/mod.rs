use std::env;
use std::path::PathBuf;

/// Runtime configuration for the upload server
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory uploaded statements are written to (default: "uploads")
    pub upload_dir: PathBuf,

    /// Maximum file size in bytes (default: 50 MB)
    pub max_file_size: usize,

    /// Interface to bind (default: "127.0.0.1")
    pub host: String,

    /// Port to bind (default: 3000)
    pub port: u16,

    /// Notification socket URL handed to the upload page.
    /// When unset the page connects to `/ws` on the serving host.
    pub ws_url: Option<String>,

    /// Buffered events per notification subscriber (default: 64)
    pub notify_channel_capacity: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_file_size: 50 * 1024 * 1024, // 50 MB
            host: "127.0.0.1".to_string(),
            port: 3000,
            ws_url: None,
            notify_channel_capacity: 64,
        }
    }
}

impl UploadConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            upload_dir: env::var("UPLOAD_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            host: env::var("HOST").unwrap_or(default.host),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            ws_url: env::var("WS_URL").ok().filter(|v| !v.trim().is_empty()),

            notify_channel_capacity: env::var("NOTIFY_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(default.notify_channel_capacity),
        }
    }

    /// Config for tests and local runs, writing into the given directory
    pub fn development(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_file_size: 10 * 1024 * 1024,
            host: "127.0.0.1".to_string(),
            port: 0,
            ws_url: None,
            notify_channel_capacity: 16,
        }
    }

    /// Body limit for the upload route: the file plus multipart framing
    pub fn upload_body_limit(&self) -> usize {
        self.max_file_size + 1024 * 1024
    }
}
