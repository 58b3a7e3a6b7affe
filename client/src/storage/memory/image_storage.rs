use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;

use crate::storage::traits::ImageStorage;

pub const DEFAULT_DOWNLOAD_BASE: &str = "memory://deal_images";

/// Records uploads instead of sending them anywhere.
pub struct InMemoryImageStorage {
    download_base: String,
    uploads: Mutex<Vec<(String, PathBuf)>>,
    failing: AtomicBool,
}

impl InMemoryImageStorage {
    pub fn new() -> Self {
        Self::with_download_base(DEFAULT_DOWNLOAD_BASE)
    }

    pub fn with_download_base(download_base: impl Into<String>) -> Self {
        Self {
            download_base: download_base.into(),
            uploads: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every `(owner_key, local_file)` uploaded so far, oldest first.
    pub fn uploads(&self) -> Vec<(String, PathBuf)> {
        self.uploads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for InMemoryImageStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageStorage for InMemoryImageStorage {
    async fn upload_image(&self, owner_key: &str, local_file: &Path) -> Result<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("Image upload failed"));
        }

        debug!("Uploading {} as {}", local_file.display(), owner_key);
        self.uploads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((owner_key.to_string(), local_file.to_path_buf()));
        Ok(format!("{}/{}", self.download_base.trim_end_matches('/'), owner_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_returns_download_url_and_records() {
        let storage = InMemoryImageStorage::with_download_base("https://cdn.example.com/");

        let url = storage.upload_image("deal_u1_1", Path::new("/tmp/photo.jpg")).await.unwrap();

        assert_eq!(url, "https://cdn.example.com/deal_u1_1");
        assert_eq!(storage.uploads(), vec![("deal_u1_1".to_string(), PathBuf::from("/tmp/photo.jpg"))]);
    }

    #[tokio::test]
    async fn test_failing_upload() {
        let storage = InMemoryImageStorage::new();
        storage.set_failing(true);

        let error = storage.upload_image("key", Path::new("a.jpg")).await.unwrap_err();

        assert_eq!(error.to_string(), "Image upload failed");
        assert!(storage.uploads().is_empty());
    }
}
