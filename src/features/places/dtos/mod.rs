mod engagement_dto;
mod place_dto;
mod search_dto;

pub use engagement_dto::*;
pub use place_dto::*;
pub use search_dto::*;
