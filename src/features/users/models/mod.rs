mod user;

pub use user::{User, UserBrief, UserRole};
