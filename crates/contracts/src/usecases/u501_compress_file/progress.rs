use serde::{Deserialize, Serialize};

/// Состояние обработки файла на стороне клиента
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingState {
    /// Ожидание выбора файла или запуска сжатия
    #[default]
    Idle,
    /// Файл подготавливается к отправке
    Uploading,
    /// Файл отправлен, ждём ответа сервера
    Processing,
    /// Сжатие завершено, результат доступен для скачивания
    Completed,
    /// Сжатие не удалось
    Error,
}

impl ProcessingState {
    /// Идёт ли сейчас конвейер сжатия
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Uploading | Self::Processing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Uploading => "uploading",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}
