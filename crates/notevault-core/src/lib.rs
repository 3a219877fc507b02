//! # notevault-core
//!
//! Core types for the notevault backend: domain models, request/response
//! DTOs, the error taxonomy, and the stateless access/refresh token service.

pub mod error;
pub mod models;
pub mod token;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use token::{TokenPair, TokenService};
