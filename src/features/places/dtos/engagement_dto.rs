use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Counter value plus whether the caller contributed to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActionStateDto {
    pub count: i64,
    pub setted: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActionMetadataDto {
    pub like: ActionStateDto,
    pub dislike: ActionStateDto,
    pub saved: ActionStateDto,
}
