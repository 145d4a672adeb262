use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::files::dtos::ImageDto;
use crate::features::users::dtos::UserBriefDto;
use crate::shared::types::deserialize_limit;
use crate::shared::validation::validate_not_blank;

/// Request DTO for writing or editing a review
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReviewRequestDto {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(custom(function = "validate_not_blank", message = "Content is required"))]
    pub content: String,

    /// Ids of the caller's uploaded images; foreign ids are ignored
    #[serde(default)]
    pub image_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PlaceIdQuery {
    #[serde(rename = "placeId")]
    pub place_id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReviewListQuery {
    #[serde(rename = "placeId")]
    pub place_id: Option<Uuid>,
    /// `rating_desc`, `rating_asc` or `rating_1` .. `rating_5`
    pub filter: Option<String>,
    /// Non-numeric values fall back to the default limit
    #[serde(default, deserialize_with = "deserialize_limit")]
    pub limit: Option<i64>,
}

/// Ordering or exact-rating filter for review lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewListFilter {
    RatingDesc,
    RatingAsc,
    Rating(i32),
}

impl ReviewListFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "rating_desc" => Some(Self::RatingDesc),
            "rating_asc" => Some(Self::RatingAsc),
            other => other
                .strip_prefix("rating_")
                .and_then(|n| n.parse::<i32>().ok())
                .filter(|n| (1..=5).contains(n))
                .map(Self::Rating),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewDto {
    pub id: Uuid,
    pub place_id: Uuid,
    pub rating: i32,
    pub content: String,
    pub images: Vec<ImageDto>,
    pub user: UserBriefDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewedPlaceDto {
    pub id: Uuid,
    pub name: String,
    pub cover_link: Option<String>,
}

/// Entry of the caller's own review history
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MyReviewDto {
    pub id: Uuid,
    pub rating: i32,
    pub content: String,
    pub image_ids: Vec<Uuid>,
    pub place: ReviewedPlaceDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parse() {
        assert_eq!(
            ReviewListFilter::parse("rating_desc"),
            Some(ReviewListFilter::RatingDesc)
        );
        assert_eq!(
            ReviewListFilter::parse("rating_3"),
            Some(ReviewListFilter::Rating(3))
        );
        assert_eq!(ReviewListFilter::parse("rating_6"), None);
        assert_eq!(ReviewListFilter::parse("rating_0"), None);
        assert_eq!(ReviewListFilter::parse("newest"), None);
    }

    #[test]
    fn test_request_validation() {
        let dto = |rating: i32, content: &str| ReviewRequestDto {
            rating,
            content: content.to_string(),
            image_ids: vec![],
        };

        assert!(dto(5, "Tempatnya bersih").validate().is_ok());
        assert!(dto(0, "Tempatnya bersih").validate().is_err());
        assert!(dto(6, "Tempatnya bersih").validate().is_err());
        assert!(dto(3, "  ").validate().is_err());
    }

    #[test]
    fn test_image_ids_default_to_empty() {
        let dto: ReviewRequestDto = serde_json::from_value(serde_json::json!({
            "rating": 4,
            "content": "Enak"
        }))
        .unwrap();
        assert!(dto.image_ids.is_empty());
    }
}
