pub mod platform_hint;
pub mod scanner;

pub use platform_hint::suggest;
pub use scanner::RomScanService;
