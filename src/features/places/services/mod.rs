mod engagement_service;
pub mod hashtags;
mod place_lock;
mod place_service;
mod search_service;

pub use engagement_service::EngagementService;
pub use place_lock::lock_place;
pub use place_service::{delete_place_in_tx, PlaceService};
pub use search_service::SearchService;
