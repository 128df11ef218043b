//! Database module
//!
//! PostgreSQL connection handling.

pub mod connection;

pub use connection::{connect, mask_database_url, run_migrations};
