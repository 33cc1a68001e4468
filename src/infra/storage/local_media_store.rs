use std::path::PathBuf;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;
use crate::domain::ports::MediaStore;
use crate::error::AppError;

/// Content-addressed image storage on local disk. Identical uploads share one
/// file; paths are sharded by the first two byte pairs of the digest.
pub struct LocalMediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: &str) -> Self {
        Self { root, url_prefix: url_prefix.trim_end_matches('/').to_string() }
    }

    fn relative_path(hash: &str, extension: &str) -> String {
        format!("{}/{}/{}.{}", &hash[0..2], &hash[2..4], hash, extension)
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn save_image(&self, data: &[u8], extension: &str) -> Result<String, AppError> {
        let hash = hex::encode(Sha256::digest(data));
        let relative = Self::relative_path(&hash, extension);
        let target = self.root.join(&relative);

        if !fs::try_exists(&target).await? {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&target, data).await?;
            debug!("Stored image {} ({} bytes)", relative, data.len());
        }

        Ok(format!("{}/{}", self.url_prefix, relative))
    }
}
