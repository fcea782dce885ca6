pub mod archive;
pub mod filesystem;
pub mod hasher;
pub mod output;
pub mod progress;
pub(crate) mod rar_archive;
pub(crate) mod sevenz_archive;
pub(crate) mod zip_archive;

pub use archive::ArchiveFormat;
pub use filesystem::FileSystemAdapter;
pub use hasher::Md5Hasher;
pub use output::{ConsoleOutputAdapter, JsonOutputAdapter};
pub use progress::ProgressBarAdapter;
