//! Middleware: JWT authentication and CORS.

pub mod auth;
pub mod cors;

pub use auth::{require_auth, AdminUser, OptionalAuthUser};
pub use cors::cors_layer;
