use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::usecases::u501_compress_file::{CompressErrorResponse, CompressRequest};
use std::sync::Arc;

use crate::usecases::u501_compress_file::{naming, CompressExecutor};

/// POST /api/compress
///
/// Успех: сжатые байты как вложение. Любая ошибка сворачивается в 500 с
/// `{ "error": ..., "message"?: ... }`, вид ошибки остаётся в логах.
pub async fn compress(
    State(executor): State<Arc<CompressExecutor>>,
    Json(request): Json<CompressRequest>,
) -> Response {
    match executor
        .compress(&request.file_name, &request.content)
        .await
    {
        Ok(file) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file.file_name),
                ),
            ],
            file.bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(
                kind = e.kind(),
                file_name = %naming::sanitize_file_name(&request.file_name),
                "Failed to compress file: {}",
                e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CompressErrorResponse::new(e.user_message())),
            )
                .into_response()
        }
    }
}
