//! # storage-adapters
//!
//! Implementations of the `domains` repository ports.
//!
//! - [`MemoryStore`]: always compiled; in-process maps with the same
//!   referential rules as the database.
//! - [`PgStore`]: Postgres via sqlx, behind the `db-postgres` feature.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;

#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
