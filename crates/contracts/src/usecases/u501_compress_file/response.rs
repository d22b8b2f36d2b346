use serde::{Deserialize, Serialize};

use super::DEFAULT_ERROR_MESSAGE;

/// Тело ответа при ошибке сжатия.
///
/// Успешный ответ - это бинарное тело со сжатым файлом, отдельного DTO нет.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompressErrorResponse {
    #[serde(default)]
    pub error: String,

    /// Диагностика внешнего компрессора, если она есть
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CompressErrorResponse {
    pub fn new(message: Option<String>) -> Self {
        Self {
            error: DEFAULT_ERROR_MESSAGE.to_string(),
            message,
        }
    }

    /// Text shown to the user: `message`, then `error`, then the default.
    pub fn status_message(&self) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .or_else(|| Some(self.error.trim()).filter(|e| !e.is_empty()))
            .unwrap_or(DEFAULT_ERROR_MESSAGE)
            .to_string()
    }
}
