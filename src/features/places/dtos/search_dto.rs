use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::places::geo::Coordinate;

/// Caller position for proximity searches
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct CoordinateDto {
    pub latitude: f64,
    pub longitude: f64,
}

impl CoordinateDto {
    pub fn to_coordinate(self) -> Result<Coordinate, AppError> {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct KeywordQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct NearbyPlaceQuery {
    #[serde(rename = "placeId")]
    pub place_id: Option<Uuid>,
}
