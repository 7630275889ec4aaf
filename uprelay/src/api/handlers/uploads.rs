//! Upload relay endpoint.
//!
//! One POST performs the full relay: validate the body, read the object's
//! current version from the remote store, then write the new content. The
//! existence check is advisory (last write wins between concurrent uploads
//! of the same path), the write is authoritative.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use crate::api::models::uploads::{UploadRequest, UploadResponse};
use crate::errors::{Error, Result};
use crate::store::ObjectPath;
use crate::AppState;

/// Relay a file to the remote store and return its public URL.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "uploads",
    request_body = UploadRequest,
    responses(
        (status = 200, description = "File uploaded", body = UploadResponse),
        (status = 400, description = "Missing fields or invalid brand name"),
        (status = 500, description = "Store credentials missing or upstream write failed"),
    )
)]
#[tracing::instrument(skip_all, fields(brand = %request.brand_name, file = %request.file_name))]
pub async fn upload(State(state): State<AppState>, Json(request): Json<UploadRequest>) -> Result<Json<UploadResponse>> {
    request.validate()?;
    state.store.ensure_configured()?;

    let path = ObjectPath::new(&request.brand_name, &request.file_name);

    // Fresh per upload; a marker from an earlier request could be stale.
    let marker = state.store.current_version(&path).await;

    let message = format!("Upload {} for {}", request.file_name, request.brand_name);
    state.store.put(&path, &message, &request.file_content, marker.as_ref()).await?;

    let url = path.public_url(&state.config.public_base_url)?;
    info!(%path, overwrote = marker.is_some(), "upload complete");

    Ok(Json(UploadResponse {
        success: true,
        url: url.to_string(),
        message: "File uploaded successfully".to_string(),
    }))
}

/// Plain OPTIONS requests (no `Access-Control-Request-Method` header) fall
/// through the CORS layer to this handler; true preflights are answered by
/// the layer itself.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Fallback for the upload route's unsupported methods.
pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}
