use contracts::shared::data_url::TranscodeError;
use std::path::PathBuf;
use thiserror::Error;

/// Ошибки сжатия одного файла
#[derive(Debug, Error)]
pub enum CompressError {
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] TranscodeError),

    #[error("staging directory {} is unavailable: {source}", path.display())]
    StagingUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    /// Никогда не возвращается вызывающему, только логируется
    #[error("cleanup of {} failed: {source}", path.display())]
    CleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompressError {
    /// Короткое имя вида ошибки для логов
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedPayload(_) => "MalformedPayload",
            Self::StagingUnavailable { .. } => "StagingUnavailable",
            Self::Io { .. } => "IOError",
            Self::CompressionFailed(_) => "CompressionFailed",
            Self::CleanupFailed { .. } => "CleanupFailed",
        }
    }

    /// Текст, который можно показать пользователю (диагностика компрессора)
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::CompressionFailed(diagnostic) => Some(diagnostic.clone()),
            _ => None,
        }
    }
}
