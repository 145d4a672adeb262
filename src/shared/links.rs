//! Public link builders for stored media.
//!
//! Objects live in the bucket under a prefix; the API serves them back at
//! `{api_base_url}/{prefix}/{filename}`.

use chrono::Utc;
use uuid::Uuid;

use crate::shared::constants::{
    AVATARS_PREFIX, MAP_CONTENTS_PREFIX, MAP_MARKERS_PREFIX, PATH_NO_PICTURE,
};

#[derive(Debug, Clone)]
pub struct MediaLinks {
    api_base_url: String,
}

impl MediaLinks {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn map_content(&self, filename: &str) -> String {
        format!("{}/{}/{}", self.api_base_url, MAP_CONTENTS_PREFIX, filename)
    }

    pub fn map_marker(&self, filename: &str) -> String {
        format!("{}/{}/{}", self.api_base_url, MAP_MARKERS_PREFIX, filename)
    }

    /// Avatar link, or the no-picture placeholder when the user has none
    pub fn avatar(&self, filename: Option<&str>) -> String {
        match filename {
            Some(name) if !name.is_empty() => {
                format!("{}/{}/{}", self.api_base_url, AVATARS_PREFIX, name)
            }
            _ => format!("{}{}", self.api_base_url, PATH_NO_PICTURE),
        }
    }
}

/// Object key for a file stored under the given prefix
pub fn object_key(prefix: &str, filename: &str) -> String {
    format!("{}/{}", prefix, filename)
}

/// Unique storage name such as `map-content-{uuid}-{millis}.png`
pub fn stored_filename(stem: &str, extension: &str) -> String {
    format!(
        "{}-{}-{}.{}",
        stem,
        Uuid::new_v4(),
        Utc::now().timestamp_millis(),
        extension.to_ascii_lowercase()
    )
}

/// Lower-cased extension of an uploaded file name
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_trim_trailing_slash() {
        let links = MediaLinks::new("https://api.example.com/");
        assert_eq!(
            links.map_content("map-content-1.png"),
            "https://api.example.com/map-contents/map-content-1.png"
        );
        assert_eq!(
            links.map_marker("map-marker-01.png"),
            "https://api.example.com/map-markers/map-marker-01.png"
        );
    }

    #[test]
    fn test_stored_filename_shape() {
        let name = stored_filename("map-marker", "PNG");
        assert!(name.starts_with("map-marker-"));
        assert!(name.ends_with(".png"));
        assert_ne!(name, stored_filename("map-marker", "png"));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("Beach.JPG").as_deref(), Some("jpg"));
        assert_eq!(file_extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn test_avatar_falls_back_to_placeholder() {
        let links = MediaLinks::new("http://localhost:3000");
        assert_eq!(
            links.avatar(None),
            "http://localhost:3000/images/no-picture.webp"
        );
        assert_eq!(
            links.avatar(Some("")),
            "http://localhost:3000/images/no-picture.webp"
        );
        assert_eq!(
            links.avatar(Some("avatar-1.png")),
            "http://localhost:3000/avatars/avatar-1.png"
        );
    }
}
