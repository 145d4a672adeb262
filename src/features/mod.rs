pub mod auth;
pub mod categories;
pub mod files;
pub mod places;
pub mod reviews;
pub mod summary;
pub mod users;
