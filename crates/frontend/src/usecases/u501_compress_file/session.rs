//! Состояние сессии сжатия одного файла.
//!
//! Все переходы проходят через методы [`Session`]; событие, недопустимое
//! в текущем состоянии, отклоняется с [`TransitionError`] и ничего не меняет.

use contracts::shared::data_url::DEFAULT_MIME_TYPE;
use contracts::usecases::u501_compress_file::ProcessingState;
use thiserror::Error;

pub const UPLOADING_MESSAGE: &str = "Uploading file...";
pub const COMPRESSING_MESSAGE: &str = "Compressing file...";
pub const SUCCESS_MESSAGE: &str = "Compression completed successfully!";

/// Префикс имени скачиваемого файла
pub const DOWNLOAD_PREFIX: &str = "compressed_";

/// Выбранный пользователем файл. Содержимое читается из браузера
/// только после начала загрузки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }

    /// MIME для data URL; пустой тип браузера заменяется на octet-stream
    pub fn effective_mime_type(&self) -> &str {
        if self.mime_type.trim().is_empty() {
            DEFAULT_MIME_TYPE
        } else {
            &self.mime_type
        }
    }

    /// Размер в мегабайтах, например `0.00 MB`
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size as f64 / 1024.0 / 1024.0)
    }

    pub fn download_name(&self) -> String {
        format!("{}{}", DOWNLOAD_PREFIX, self.name)
    }
}

/// Результат сжатия, готовый к скачиванию
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedArtifact {
    /// Object URL; должен быть освобождён при сбросе
    pub handle: String,
    pub size: usize,
    pub download_name: String,
}

/// Элементы управления, которые видит пользователь
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    ChooseFile,
    CompressFile,
    Cancel,
    DownloadCompressedFile,
    CompressAnotherFile,
}

impl Control {
    pub fn label(self) -> &'static str {
        match self {
            Self::ChooseFile => "Choose File",
            Self::CompressFile => "Compress File",
            Self::Cancel => "Cancel",
            Self::DownloadCompressedFile => "Download Compressed File",
            Self::CompressAnotherFile => "Compress Another File",
        }
    }

    /// Stable `data-testid` marker of the control
    pub fn test_id(self) -> &'static str {
        match self {
            Self::ChooseFile => "choose-file",
            Self::CompressFile => "compress-file",
            Self::Cancel => "cancel",
            Self::DownloadCompressedFile => "download-compressed-file",
            Self::CompressAnotherFile => "compress-another-file",
        }
    }
}

/// Иконка рядом со статусом
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Default,
    Loader,
    CheckCircle,
    Error,
}

impl StatusIcon {
    pub fn test_id(self) -> &'static str {
        match self {
            Self::Default => "default-status-icon",
            Self::Loader => "loader-icon",
            Self::CheckCircle => "check-circle-icon",
            Self::Error => "error-icon",
        }
    }

    pub fn icon_name(self) -> &'static str {
        match self {
            Self::Default => "file",
            Self::Loader => "loader",
            Self::CheckCircle => "check-circle",
            Self::Error => "alert-circle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {event} while {}", .state.as_str())]
pub struct TransitionError {
    pub state: ProcessingState,
    pub event: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    state: ProcessingState,
    file: Option<SelectedFile>,
    status: Option<String>,
    artifact: Option<CompressedArtifact>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn artifact(&self) -> Option<&CompressedArtifact> {
        self.artifact.as_ref()
    }

    fn reject(&self, event: &'static str) -> TransitionError {
        TransitionError {
            state: self.state,
            event,
        }
    }

    /// Выбор или замена файла; только в idle
    pub fn select_file(&mut self, file: SelectedFile) -> Result<(), TransitionError> {
        if self.state != ProcessingState::Idle {
            return Err(self.reject("select a file"));
        }
        self.file = Some(file);
        self.status = None;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), TransitionError> {
        if self.state != ProcessingState::Idle || self.file.is_none() {
            return Err(self.reject("cancel"));
        }
        self.file = None;
        self.status = None;
        Ok(())
    }

    /// idle (file set) -> uploading. Возвращает файл для конвейера.
    pub fn begin_upload(&mut self) -> Result<SelectedFile, TransitionError> {
        let file = match (&self.state, &self.file) {
            (ProcessingState::Idle, Some(file)) => file.clone(),
            _ => return Err(self.reject("compress")),
        };
        self.state = ProcessingState::Uploading;
        self.status = Some(UPLOADING_MESSAGE.to_string());
        Ok(file)
    }

    pub fn mark_processing(&mut self) -> Result<(), TransitionError> {
        if self.state != ProcessingState::Uploading {
            return Err(self.reject("start processing"));
        }
        self.state = ProcessingState::Processing;
        self.status = Some(COMPRESSING_MESSAGE.to_string());
        Ok(())
    }

    pub fn complete(&mut self, artifact: CompressedArtifact) -> Result<(), TransitionError> {
        if self.state != ProcessingState::Processing {
            return Err(self.reject("complete"));
        }
        self.state = ProcessingState::Completed;
        self.status = Some(SUCCESS_MESSAGE.to_string());
        self.artifact = Some(artifact);
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        if !self.state.is_busy() {
            return Err(self.reject("fail"));
        }
        self.state = ProcessingState::Error;
        self.status = Some(message.into());
        Ok(())
    }

    /// completed | error -> idle без файла. Возвращает артефакт, который
    /// вызывающий обязан освободить.
    pub fn reset(&mut self) -> Result<Option<CompressedArtifact>, TransitionError> {
        if !matches!(
            self.state,
            ProcessingState::Completed | ProcessingState::Error
        ) {
            return Err(self.reject("reset"));
        }
        let artifact = self.artifact.take();
        self.state = ProcessingState::Idle;
        self.file = None;
        self.status = None;
        Ok(artifact)
    }

    /// Видимые элементы управления для текущего состояния
    pub fn controls(&self) -> Vec<Control> {
        match (self.state, self.file.is_some()) {
            (ProcessingState::Idle, false) => vec![Control::ChooseFile],
            (ProcessingState::Idle, true) => vec![Control::CompressFile, Control::Cancel],
            (ProcessingState::Uploading | ProcessingState::Processing, _) => vec![],
            (ProcessingState::Completed, _) => vec![
                Control::DownloadCompressedFile,
                Control::CompressAnotherFile,
            ],
            (ProcessingState::Error, _) => vec![Control::CompressAnotherFile],
        }
    }

    pub fn has_control(&self, control: Control) -> bool {
        self.controls().contains(&control)
    }

    pub fn status_icon(&self) -> StatusIcon {
        match self.state {
            ProcessingState::Idle => StatusIcon::Default,
            ProcessingState::Uploading | ProcessingState::Processing => StatusIcon::Loader,
            ProcessingState::Completed => StatusIcon::CheckCircle,
            ProcessingState::Error => StatusIcon::Error,
        }
    }
}
