//! # auth-adapters
//!
//! Implementations of the identity ports.
//!
//! - [`Argon2Hasher`]: PHC-string password hashing.
//! - [`JwtTokenService`]: HS256 access/refresh tokens (feature `auth-jwt`).

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2Hasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::{JwtConfig, JwtTokenService};
