pub mod compressor;
pub mod error;
pub mod executor;
pub mod naming;
pub mod staging;

pub use compressor::{ExternalCompressor, ProcessCompressor};
pub use error::CompressError;
pub use executor::{CompressExecutor, CompressedFile};
pub use staging::StagingArea;
