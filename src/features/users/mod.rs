//! User accounts.
//!
//! | Method | Endpoint | Access |
//! |--------|----------|--------|
//! | GET | `/api/users` | admin |
//! | POST | `/api/users/avatars` | any user |
//! | PATCH | `/api/users/info` | any user |
//! | PATCH | `/api/users/role?userId=` | super admin |
//! | DELETE | `/api/users/{id}` | super admin |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::UserService;
