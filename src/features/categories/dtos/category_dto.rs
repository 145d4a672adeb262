use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::PlaceCategory;
use crate::features::places::dtos::PlaceCardDto;
use crate::shared::links::MediaLinks;
use crate::shared::validation::validate_not_blank;

/// Text fields of the category form
#[derive(Debug, Clone, Default, Validate)]
pub struct CategoryFormDto {
    #[validate(
        length(max = 255, message = "Name must be at most 255 characters"),
        custom(function = "validate_not_blank", message = "Name is required")
    )]
    pub name: String,

    #[validate(custom(function = "validate_not_blank", message = "Description is required"))]
    pub description: String,
}

/// Multipart body for creating or updating a category (swagger only)
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct CategoryUploadDto {
    pub name: String,
    pub description: String,
    /// PNG marker; required on create, optional on update
    #[serde(rename = "mapMarker")]
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub map_marker: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CategoryListQuery {
    /// Attach each category's best rated place
    #[serde(rename = "with-popular-place")]
    pub with_popular_place: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub map_marker: String,
    pub map_marker_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popular_place: Option<PlaceCardDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryResponseDto {
    pub fn from_category(category: PlaceCategory, links: &MediaLinks) -> Self {
        Self {
            map_marker_link: links.map_marker(&category.map_marker),
            id: category.id,
            name: category.name,
            description: category.description,
            map_marker: category.map_marker,
            popular_place: None,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::test_links;

    #[test]
    fn test_form_validation() {
        let form = |name: &str, description: &str| CategoryFormDto {
            name: name.to_string(),
            description: description.to_string(),
        };

        assert!(form("Kuliner", "makanan dan minuman").validate().is_ok());
        assert!(form(" ", "makanan dan minuman").validate().is_err());
        assert!(form("Kuliner", "").validate().is_err());
        assert!(form(&"x".repeat(256), "panjang").validate().is_err());
    }

    #[test]
    fn test_response_omits_missing_popular_place() {
        let now = Utc::now();
        let dto = CategoryResponseDto::from_category(
            PlaceCategory {
                id: Uuid::new_v4(),
                name: "Alam".to_string(),
                description: "wisata alam".to_string(),
                map_marker: "map-marker-03.png".to_string(),
                created_at: now,
                updated_at: now,
            },
            &test_links(),
        );

        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("popular_place").is_none());
        assert_eq!(
            json["map_marker_link"],
            "http://localhost:3000/map-markers/map-marker-03.png"
        );
    }
}
