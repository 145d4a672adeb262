mod file_service;
pub mod image_processing;

pub use file_service::{mark_unused, mark_used, FileService};
