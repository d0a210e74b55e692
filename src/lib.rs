pub mod config;
pub mod download;
pub mod error;

// Re-export commonly used types for easier access in tests
pub use config::ConfigManager;
pub use download::{
    Downloader, IpFamily, Transfer, TransferId, TransferOptions, TransferPhase, TransferStatus,
    TransportConfig,
};
pub use error::DownloadError;
