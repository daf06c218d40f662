//! # api-adapters
//!
//! HTTP surfaces for Yatube: the JSON API under `/api/v1` and the rendered
//! HTML pages. Handlers only translate between HTTP and the `services`
//! crate; authorization lives in the services.
//!
//! The axum router is gated behind the `web-axum` feature.

pub mod dto;
pub mod metrics;
pub mod templates;

#[cfg(feature = "web-axum")]
mod api;
#[cfg(feature = "web-axum")]
pub mod csrf;
#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod router;
#[cfg(feature = "web-axum")]
pub mod session;
#[cfg(feature = "web-axum")]
pub mod state;
#[cfg(feature = "web-axum")]
mod web;

pub use metrics::{Event, Metrics};

#[cfg(feature = "web-axum")]
pub use router::build_router;
#[cfg(feature = "web-axum")]
pub use session::SESSION_COOKIE;
#[cfg(feature = "web-axum")]
pub use state::{AppState, CookiePolicy};
