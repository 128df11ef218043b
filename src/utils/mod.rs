//! Shared utilities: error type, validation helpers and extractors.

pub mod errors;
pub mod extract;
pub mod validation;
