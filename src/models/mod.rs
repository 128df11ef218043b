//! Data models
//!
//! Entities mapped to the PostgreSQL tables plus the insert/update payloads
//! handed to the store.

pub mod auth;
pub mod car;
pub mod driver;
pub mod maintenance;
pub mod trip;
pub mod user;

use thiserror::Error;

/// Raised when a stored status or role string is not a known variant.
#[derive(Debug, Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    pub fn new(kind: &'static str, value: String) -> Self {
        Self { kind, value }
    }
}
