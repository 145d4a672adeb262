use axum::extract::multipart::Field;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::files::models::{File, FileKind};
use crate::shared::links::{file_extension, MediaLinks};

/// Extensions accepted for place and review images and avatars
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Extensions accepted for category map markers
pub const MARKER_EXTENSIONS: &[&str] = &["png"];

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadImageDto {
    /// png, jpg or jpeg image
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Response DTO for uploaded images
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: Uuid,
    pub kind: FileKind,
    pub original_name: String,
    pub filename: String,
    pub link: String,
    pub size: i64,
    pub mimetype: String,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl FileResponseDto {
    pub fn from_file(file: File, links: &MediaLinks) -> Self {
        Self {
            link: links.map_content(&file.filename),
            id: file.id,
            kind: file.kind,
            original_name: file.original_name,
            filename: file.filename,
            size: file.size,
            mimetype: file.mimetype,
            used: file.used,
            created_at: file.created_at,
        }
    }
}

/// Image reference embedded in place and review responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageDto {
    pub id: Uuid,
    pub filename: String,
    pub link: String,
}

impl ImageDto {
    pub fn new(id: Uuid, filename: &str, links: &MediaLinks) -> Self {
        Self {
            id,
            filename: filename.to_string(),
            link: links.map_content(filename),
        }
    }
}

/// A file part read from a multipart body
#[derive(Debug)]
pub struct UploadedFile {
    pub data: Vec<u8>,
    pub file_name: String,
}

impl UploadedFile {
    /// Read a multipart field completely
    pub async fn read(field: Field<'_>) -> Result<Self, AppError> {
        let file_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unnamed".to_string());

        let data = field.bytes().await.map_err(|e| {
            tracing::debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        Ok(Self {
            data: data.to_vec(),
            file_name,
        })
    }

    /// Check size and extension, returning the normalised extension
    pub fn validate_image(&self, allowed: &[&str], max_size: usize) -> Result<String, AppError> {
        if self.data.is_empty() {
            return Err(AppError::BadRequest("File is empty".to_string()));
        }

        if self.data.len() > max_size {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {} bytes ({} MB)",
                max_size,
                max_size / 1024 / 1024
            )));
        }

        match file_extension(&self.file_name) {
            Some(ext) if allowed.contains(&ext.as_str()) => Ok(ext),
            _ => Err(AppError::BadRequest(format!(
                "File type is not allowed. Allowed types: {}",
                allowed.join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, size: usize) -> UploadedFile {
        UploadedFile {
            data: vec![0u8; size],
            file_name: name.to_string(),
        }
    }

    #[test]
    fn test_validate_image_accepts_known_extensions() {
        assert_eq!(
            upload("Beach.JPG", 10).validate_image(IMAGE_EXTENSIONS, 100).unwrap(),
            "jpg"
        );
        assert_eq!(
            upload("marker.png", 10).validate_image(MARKER_EXTENSIONS, 100).unwrap(),
            "png"
        );
    }

    #[test]
    fn test_validate_image_rejects() {
        assert!(upload("marker.jpg", 10)
            .validate_image(MARKER_EXTENSIONS, 100)
            .is_err());
        assert!(upload("photo.gif", 10)
            .validate_image(IMAGE_EXTENSIONS, 100)
            .is_err());
        assert!(upload("photo.png", 101)
            .validate_image(IMAGE_EXTENSIONS, 100)
            .is_err());
        assert!(upload("photo.png", 0)
            .validate_image(IMAGE_EXTENSIONS, 100)
            .is_err());
    }

    #[test]
    fn test_file_kind_serialization() {
        assert_eq!(
            serde_json::to_value(FileKind::ImageReview).unwrap(),
            "IMAGE_REVIEW"
        );
    }
}
