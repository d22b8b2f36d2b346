use serde::{Deserialize, Serialize};

/// Запрос на сжатие одного файла
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompressRequest {
    /// Исходное имя файла
    #[serde(rename = "fileName")]
    pub file_name: String,

    /// Содержимое файла в виде data URL (`data:<mime>;base64,<payload>`)
    pub content: String,
}
