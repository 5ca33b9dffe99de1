//! Request middleware
//!
//! Cross-cutting behaviour applied around every route, installed with
//! `axum::middleware::from_fn`.

mod logging;

pub use logging::log_requests;
