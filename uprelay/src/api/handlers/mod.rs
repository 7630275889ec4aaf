//! HTTP request handlers.
//!
//! - [`uploads`]: the upload relay endpoint, plus its CORS preflight and
//!   method-not-allowed fallbacks
//!
//! Handlers return [`crate::errors::Error`] which automatically converts to
//! appropriate HTTP status codes and JSON error responses.

pub mod uploads;
