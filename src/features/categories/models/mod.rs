mod category;

pub use category::PlaceCategory;
