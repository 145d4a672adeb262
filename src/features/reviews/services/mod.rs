pub mod rating;
mod review_service;

pub use rating::recompute_rating;
pub use review_service::ReviewService;
