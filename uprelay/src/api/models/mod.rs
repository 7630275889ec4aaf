//! API request and response data models.
//!
//! These models define the public API contract: camelCase JSON on the wire,
//! with validation separated from deserialization so that missing fields
//! produce the documented error messages instead of serde rejections.

pub mod uploads;
