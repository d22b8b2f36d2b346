use contracts::usecases::u501_compress_file::{CompressErrorResponse, DEFAULT_ERROR_MESSAGE};
use thiserror::Error;

/// Ошибки клиентской части конвейера сжатия
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Запрос не дошёл до сервера или ответ не прочитан
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// Сервер ответил не-2xx
    #[error("server rejected the file ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to read file: {0}")]
    Encoding(String),

    #[error("failed to prepare download: {0}")]
    Artifact(String),
}

impl ClientError {
    /// Build `Rejected` from a non-2xx response body
    pub fn rejected(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<CompressErrorResponse>(body)
            .map(|response| response.status_message())
            .unwrap_or_else(|_| DEFAULT_ERROR_MESSAGE.to_string());
        Self::Rejected { status, message }
    }

    /// Текст для строки статуса
    pub fn status_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::NetworkFailure(_) => DEFAULT_ERROR_MESSAGE.to_string(),
            Self::Encoding(_) | Self::Artifact(_) => self.to_string(),
        }
    }
}
