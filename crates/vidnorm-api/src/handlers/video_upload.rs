use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use std::sync::Arc;

use vidnorm_core::models::IngestionResult;
use vidnorm_core::AppError;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/videos",
    tag = "videos",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video ingested and normalized", body = IngestionResult),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage or transcoding failure", body = ErrorResponse),
        (status = 503, description = "Transcoding tool unavailable", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<IngestionResult>, HttpAppError> {
    let (filename, data) = read_file_part(multipart).await?;

    tracing::info!(filename = %filename, size_bytes = data.len(), "Video upload received");

    let receipt = state.pipeline.ingest(data, &filename).await?;

    Ok(Json(IngestionResult::succeeded(
        receipt.video_id,
        "Video ingested. The original and normalized assets are ready for feedback processing.",
    )))
}

/// Pull the `file` part out of the multipart body.
async fn read_file_part(mut multipart: Multipart) -> Result<(String, Bytes), HttpAppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        HttpAppError(AppError::InvalidInput(format!(
            "Malformed multipart body: {}",
            e
        )))
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(str::to_owned).ok_or_else(|| {
            HttpAppError(AppError::InvalidInput(
                "File part is missing a filename".to_string(),
            ))
        })?;

        let data = field.bytes().await.map_err(|e| {
            HttpAppError(AppError::InvalidInput(format!(
                "Failed to read upload: {}",
                e
            )))
        })?;

        return Ok((filename, data));
    }

    Err(HttpAppError(AppError::InvalidInput(
        "Missing multipart field 'file'".to_string(),
    )))
}
