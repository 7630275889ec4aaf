//! OpenAPI document for the relay API, served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::api::models::uploads::{UploadRequest, UploadResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "uprelay",
        description = "Relays base64-encoded file uploads into a remote object store and returns the public URL."
    ),
    paths(crate::api::handlers::uploads::upload),
    components(schemas(UploadRequest, UploadResponse)),
    tags(
        (name = "uploads", description = "File upload relay")
    )
)]
pub struct ApiDoc;
