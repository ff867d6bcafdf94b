//! Local file storage for uploaded recipe images.

use std::path::PathBuf;

use crate::{AppError, AppResult};

/// Metadata for a stored image.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// File name under the image directory.
    pub file_name: String,
    /// Public URL path the image is served from.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
}

/// Local filesystem storage for uploaded images.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage rooted at `base_path`, serving files
    /// under the `base_url` URL prefix.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            base_url: base_url.into(),
        }
    }

    /// Store image bytes under `file_name` and return its public URL.
    ///
    /// The file name must already be sanitized; callers generate it from
    /// an entity ID plus a whitelisted extension.
    pub async fn store(&self, file_name: &str, data: &[u8]) -> AppResult<StoredImage> {
        let path = self.base_path.join(file_name);

        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create image directory: {e}")))?;

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write image: {e}")))?;

        Ok(StoredImage {
            file_name: file_name.to_string(),
            url: self.public_url(file_name),
            size: data.len() as u64,
        })
    }

    /// Delete a stored image. Missing files are ignored.
    pub async fn delete(&self, file_name: &str) -> AppResult<()> {
        let path = self.base_path.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete image: {e}"))),
        }
    }

    /// Public URL path for a stored file name.
    #[must_use]
    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url() {
        let storage = LocalStorage::new("/tmp/images", "/images");
        assert_eq!(storage.public_url("cake.jpg"), "/images/cake.jpg");
    }

    #[test]
    fn test_public_url_trailing_slash() {
        let storage = LocalStorage::new("/tmp/images", "/images/");
        assert_eq!(storage.public_url("cake.jpg"), "/images/cake.jpg");
    }

    #[tokio::test]
    async fn test_store_and_delete() {
        let dir = std::env::temp_dir().join("recipehaven-storage-test");
        let storage = LocalStorage::new(&dir, "/images");

        let stored = storage.store("test.png", b"png-bytes").await.unwrap();
        assert_eq!(stored.url, "/images/test.png");
        assert_eq!(stored.size, 9);
        assert!(dir.join("test.png").exists());

        storage.delete("test.png").await.unwrap();
        assert!(!dir.join("test.png").exists());

        // Deleting again is not an error
        storage.delete("test.png").await.unwrap();
    }
}
