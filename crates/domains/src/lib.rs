//! # domains
//!
//! The central domain types and port definitions for Yatube: entities,
//! the error taxonomy and the traits adapters implement.

pub mod error;
pub mod models;
pub mod ports;
pub mod validation;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
