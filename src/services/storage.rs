use crate::models::StoredFile;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Streams `reader` into a new file named `{unix_millis}-{filename}`.
    /// `filename` must already be sanitized.
    async fn save_stream<'a>(
        &self,
        filename: &str,
        reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> Result<StoredFile>;

    /// Whether the backing location can currently be written to
    async fn is_writable(&self) -> bool;
}

/// Writes statements to a directory on local disk
pub struct LocalStorageService {
    root: PathBuf,
}

impl LocalStorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("creating upload directory {}", self.root.display()))
    }
}

pub fn timestamped_name(filename: &str) -> String {
    format!("{}-{}", Utc::now().timestamp_millis(), filename)
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn save_stream<'a>(
        &self,
        filename: &str,
        mut reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> Result<StoredFile> {
        // A missing directory surfaces as a write error below
        if let Err(e) = self.ensure_root().await {
            tracing::error!("Error creating uploads directory: {:?}", e);
        }

        let stored_name = timestamped_name(filename);
        let path = self.root.join(&stored_name);

        let mut file = fs::File::create(&path)
            .await
            .with_context(|| format!("creating {}", path.display()))?;

        let written = async {
            let size = tokio::io::copy(&mut reader, &mut file).await?;
            file.flush().await?;
            file.sync_all().await?;
            Ok::<u64, std::io::Error>(size)
        }
        .await;

        match written {
            Ok(size) => {
                tracing::info!("💾 File saved successfully: {} ({} bytes)", path.display(), size);
                Ok(StoredFile {
                    filename: stored_name,
                    path,
                    size,
                })
            }
            Err(e) => {
                drop(file);
                if let Err(cleanup) = fs::remove_file(&path).await {
                    tracing::warn!("Failed to remove partial upload {}: {}", path.display(), cleanup);
                }
                Err(anyhow::Error::new(e).context(format!("writing {}", path.display())))
            }
        }
    }

    /// Reports state only; a missing directory is not writable until the first upload creates it
    async fn is_writable(&self) -> bool {
        fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir() && !m.permissions().readonly())
            .unwrap_or(false)
    }
}
