use axum::{
    routing::{get, post},
    Router,
};
use contracts::usecases::u501_compress_file::COMPRESS_API_PATH;
use std::sync::Arc;

use crate::handlers;
use crate::usecases::u501_compress_file::CompressExecutor;

/// Конфигурация всех роутов приложения
pub fn configure_routes(executor: Arc<CompressExecutor>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // UseCase u501: Compress File
        // ========================================
        .route(COMPRESS_API_PATH, post(handlers::u501_compress_file::compress))
        .route("/compress", post(handlers::u501_compress_file::compress))
        .with_state(executor)
}
