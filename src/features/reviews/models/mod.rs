mod review;

pub use review::{PlaceReview, ReviewRow, PLACE_REVIEW_COLUMNS, REVIEW_SELECT};
