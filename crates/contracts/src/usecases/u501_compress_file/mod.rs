pub mod progress;
pub mod request;
pub mod response;

pub use progress::ProcessingState;
pub use request::CompressRequest;
pub use response::CompressErrorResponse;

use crate::usecases::common::UseCaseMetadata;

/// Путь API сжатия файла
pub const COMPRESS_API_PATH: &str = "/api/compress";

/// Сообщение по умолчанию, когда сервер не прислал подробностей
pub const DEFAULT_ERROR_MESSAGE: &str = "Failed to compress file";

pub struct CompressFile;

impl UseCaseMetadata for CompressFile {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "compress_file"
    }

    fn display_name() -> &'static str {
        "File Compressor"
    }

    fn description() -> &'static str {
        "Upload a file to compress it"
    }
}
