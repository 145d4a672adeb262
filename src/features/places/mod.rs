pub mod dtos;
pub mod geo;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{EngagementService, PlaceService, SearchService};
