//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for the relay endpoint
//! - **[`models`]**: Request/response data structures for API communication
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`; the
//! generated document is served at `/api-docs/openapi.json`.

pub mod handlers;
pub mod models;
