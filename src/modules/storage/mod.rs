//! Storage module for uploaded media
//!
//! Provides the [`ObjectStorage`] abstraction and its MinIO/S3-compatible
//! implementation. Tests use the in-memory store instead.

mod minio_client;
#[cfg(test)]
mod memory;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use minio_client::MinIOClient;
#[cfg(test)]
pub use memory::MemoryStorage;

/// Name-addressed blob store for images
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `data` under `key`, replacing any existing object
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    /// Fetch the object under `key`; missing objects yield [`AppError::NotFound`]
    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError>;

    /// Remove the object under `key`
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

/// Guess a content type from a stored filename
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("map-content-1.PNG"), "image/png");
        assert_eq!(content_type_for("a.b.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("avatar.jpg"), "image/jpeg");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }
}
