use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::files::dtos::ImageDto;
use crate::features::places::models::{OpeningHoursDay, PlaceCardRow, PlaceStatus};
use crate::features::users::dtos::UserBriefDto;
use crate::shared::links::MediaLinks;
use crate::shared::types::deserialize_limit;
use crate::shared::validation::{validate_hashtags, validate_not_blank};

/// Request DTO for creating or editing a place
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PlaceRequestDto {
    #[validate(
        length(max = 255, message = "Name must be at most 255 characters"),
        custom(function = "validate_not_blank", message = "Name is required")
    )]
    pub name: String,

    #[validate(custom(function = "validate_not_blank", message = "Description is required"))]
    pub description: String,

    pub category_id: Uuid,

    pub latitude: f64,

    /// Values past ±180 are wrapped once
    pub longitude: f64,

    #[validate(custom(function = "validate_not_blank", message = "Address is required"))]
    pub address: String,

    /// At least four of the caller's uploaded images
    pub map_image_ids: Vec<Uuid>,

    /// Must be one of `map_image_ids`
    pub map_image_cover_id: Uuid,

    /// Exactly seven entries, Sunday first
    pub opening_hours: Vec<OpeningHoursDay>,

    #[validate(url(message = "Invalid website URL"))]
    pub website: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Phone must be 1-50 characters"))]
    pub phone: String,

    #[schema(value_type = f64)]
    pub price: Decimal,

    #[serde(default)]
    #[validate(custom(
        function = "validate_hashtags",
        message = "Hashtags must be at most 100 characters"
    ))]
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryBriefDto {
    pub id: Uuid,
    pub name: String,
    pub map_marker_link: String,
}

/// Place summary used by every listing and search
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaceCardDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: PlaceStatus,
    pub name: String,
    pub description: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub rating: f64,
    pub views: i64,
    pub like: i64,
    pub dislike: i64,
    pub saved: i64,
    pub category: CategoryBriefDto,
    pub cover: Option<ImageDto>,
    pub ar_cover: Option<ImageDto>,
    /// Present on proximity searches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlaceCardDto {
    pub fn from_row(row: PlaceCardRow, links: &MediaLinks, distance_meters: Option<f64>) -> Self {
        let image = |id: Option<Uuid>, filename: &Option<String>| match (id, filename) {
            (Some(id), Some(filename)) => Some(ImageDto::new(id, filename, links)),
            _ => None,
        };

        Self {
            cover: image(row.cover_id, &row.cover_filename),
            ar_cover: image(row.ar_cover_id, &row.ar_cover_filename),
            category: CategoryBriefDto {
                id: row.category_id,
                map_marker_link: links.map_marker(&row.category_map_marker),
                name: row.category_name,
            },
            id: row.id,
            user_id: row.user_id,
            status: row.status,
            name: row.name,
            description: row.description,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            price: row.price,
            rating: row.rating,
            views: row.views,
            like: row.likes,
            dislike: row.dislikes,
            saved: row.saved,
            distance_meters,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Admin list entry: a place card plus its owner
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceListItemDto {
    #[serde(flatten)]
    pub place: PlaceCardDto,
    pub owner: UserBriefDto,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceDetailDto {
    pub id: Uuid,
    pub status: PlaceStatus,
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub opening_hours: Vec<OpeningHoursDay>,
    pub website: Option<String>,
    pub phone: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub rating: f64,
    pub views: i64,
    pub like: i64,
    pub dislike: i64,
    pub saved: i64,
    pub category: CategoryBriefDto,
    pub owner: UserBriefDto,
    pub images: Vec<ImageDto>,
    pub cover: Option<ImageDto>,
    pub ar_cover: Option<ImageDto>,
    pub hashtags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a place image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImageSource {
    Place,
    Review,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceImageDto {
    pub id: Uuid,
    pub filename: String,
    pub link: String,
    pub source: ImageSource,
    pub uploaded_by: UserBriefDto,
    pub created_at: DateTime<Utc>,
}

/// Sort orders accepted by the admin place list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceListFilter {
    RatingAsc,
    RatingDesc,
    LikeAsc,
    LikeDesc,
    DislikeAsc,
    DislikeDesc,
    SaveAsc,
    SaveDesc,
    ViewAsc,
    ViewDesc,
}

impl PlaceListFilter {
    /// Unknown values fall back to the default order
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "rating_asc" => Some(Self::RatingAsc),
            "rating_desc" => Some(Self::RatingDesc),
            "like_asc" => Some(Self::LikeAsc),
            "like_desc" => Some(Self::LikeDesc),
            "dislike_asc" => Some(Self::DislikeAsc),
            "dislike_desc" => Some(Self::DislikeDesc),
            "save_asc" => Some(Self::SaveAsc),
            "save_desc" => Some(Self::SaveDesc),
            "view_asc" => Some(Self::ViewAsc),
            "view_desc" => Some(Self::ViewDesc),
            _ => None,
        }
    }

    /// ORDER BY clause; only fixed column names ever reach the SQL
    pub fn order_by(filter: Option<Self>) -> &'static str {
        match filter {
            Some(Self::RatingAsc) => "p.rating ASC",
            Some(Self::RatingDesc) => "p.rating DESC",
            Some(Self::LikeAsc) => "p.likes ASC",
            Some(Self::LikeDesc) => "p.likes DESC",
            Some(Self::DislikeAsc) => "p.dislikes ASC",
            Some(Self::DislikeDesc) => "p.dislikes DESC",
            Some(Self::SaveAsc) => "p.saved ASC",
            Some(Self::SaveDesc) => "p.saved DESC",
            Some(Self::ViewAsc) => "p.views ASC",
            Some(Self::ViewDesc) => "p.views DESC",
            None => "p.updated_at DESC",
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PlaceListQuery {
    /// `rating_*`, `like_*`, `dislike_*`, `save_*` or `view_*` with `_asc`/`_desc`
    pub filter: Option<String>,
    /// Matches the place name
    pub keyword: Option<String>,
    /// Non-numeric values fall back to the default limit
    #[serde(default, deserialize_with = "deserialize_limit")]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceCountersDto {
    pub views: i64,
    pub like: i64,
    pub dislike: i64,
    pub saved: i64,
    pub rating: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::test_links;

    fn request() -> PlaceRequestDto {
        PlaceRequestDto {
            name: "Pantai Kuta".to_string(),
            description: "Pantai berpasir putih".to_string(),
            category_id: Uuid::new_v4(),
            latitude: -8.7184,
            longitude: 115.1686,
            address: "Kuta, Badung, Bali".to_string(),
            map_image_ids: vec![Uuid::new_v4(); 4],
            map_image_cover_id: Uuid::new_v4(),
            opening_hours: vec![],
            website: Some("https://kuta.example.com".to_string()),
            phone: "0361-000000".to_string(),
            price: Decimal::new(15000, 0),
            hashtags: vec![],
        }
    }

    #[test]
    fn test_place_request_validation() {
        assert!(request().validate().is_ok());

        let mut blank_name = request();
        blank_name.name = "   ".to_string();
        assert!(blank_name.validate().is_err());

        let mut bad_site = request();
        bad_site.website = Some("not a url".to_string());
        assert!(bad_site.validate().is_err());

        let mut no_site = request();
        no_site.website = None;
        assert!(no_site.validate().is_ok());

        let mut long_tag = request();
        long_tag.hashtags = vec!["pantai".to_string(), "p".repeat(101)];
        assert!(long_tag.validate().is_err());
    }

    #[test]
    fn test_list_filter_parse() {
        assert_eq!(
            PlaceListFilter::parse("save_desc"),
            Some(PlaceListFilter::SaveDesc)
        );
        assert_eq!(PlaceListFilter::parse("name_desc"), None);
        assert_eq!(PlaceListFilter::order_by(None), "p.updated_at DESC");
        assert_eq!(
            PlaceListFilter::order_by(PlaceListFilter::parse("view_asc")),
            "p.views ASC"
        );
    }

    #[test]
    fn test_card_builds_links() {
        let now = Utc::now();
        let row = PlaceCardRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: PlaceStatus::Published,
            name: "Kawah Putih".to_string(),
            description: "Danau kawah".to_string(),
            address: "Ciwidey".to_string(),
            latitude: -7.1662,
            longitude: 107.4021,
            price: Decimal::ZERO,
            rating: 4.5,
            views: 10,
            likes: 3,
            dislikes: 1,
            saved: 2,
            category_id: Uuid::new_v4(),
            category_name: "Alam".to_string(),
            category_map_marker: "map-marker-03.png".to_string(),
            cover_id: Some(Uuid::new_v4()),
            cover_filename: Some("map-content-a.png".to_string()),
            ar_cover_id: None,
            ar_cover_filename: None,
            created_at: now,
            updated_at: now,
        };

        let card = PlaceCardDto::from_row(row, &test_links(), Some(1200.0));
        assert_eq!(
            card.category.map_marker_link,
            "http://localhost:3000/map-markers/map-marker-03.png"
        );
        assert_eq!(
            card.cover.as_ref().map(|c| c.link.as_str()),
            Some("http://localhost:3000/map-contents/map-content-a.png")
        );
        assert!(card.ar_cover.is_none());
        assert_eq!((card.like, card.dislike), (3, 1));

        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["distance_meters"], 1200.0);
    }
}
