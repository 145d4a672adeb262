pub mod auth_handler;

pub use auth_handler::{
    __path_google_callback, __path_google_mobile_callback, __path_google_redirect, __path_login,
    __path_logout, __path_my_session, google_callback, google_mobile_callback, google_redirect,
    login, logout, my_session,
};
