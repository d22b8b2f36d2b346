pub mod api;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod view;

pub use error::ClientError;
pub use session::{SelectedFile, Session};
pub use view::CompressFileView;
