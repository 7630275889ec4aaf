//! Upload request/response models and field validation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::Error;

/// Body of an upload request.
///
/// All fields default to empty strings so that missing JSON keys reach
/// [`validate`](UploadRequest::validate) instead of failing deserialization;
/// the validation error message covers both "absent" and "empty".
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadRequest {
    /// Brand namespace the file is stored under. Lowercase letters, digits
    /// and hyphens only.
    pub brand_name: String,
    /// File name within the brand namespace, relayed as-is.
    pub file_name: String,
    /// Base64-encoded file content, relayed verbatim to the store without
    /// decoding or size inspection.
    pub file_content: String,
}

impl UploadRequest {
    /// Presence checks first, then the brand name format check. Matches the
    /// documented error precedence: a request with an empty brand name and a
    /// malformed file name reports missing fields, not format.
    pub fn validate(&self) -> Result<(), Error> {
        if self.brand_name.is_empty() || self.file_name.is_empty() || self.file_content.is_empty() {
            return Err(Error::missing_fields());
        }
        if !is_valid_brand_name(&self.brand_name) {
            return Err(Error::invalid_brand_name());
        }
        Ok(())
    }
}

/// Brand names are restricted to `[a-z0-9-]+` so they embed safely in both
/// the store path and the public URL.
fn is_valid_brand_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Successful upload response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Always `true`; failures are reported through the error body instead.
    pub success: bool,
    /// Public URL where the uploaded file is served.
    pub url: String,
    pub message: String,
}
