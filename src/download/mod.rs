pub mod engine;
pub mod manager;
pub mod metadata;
pub mod mime;
pub mod progress;
pub mod status;
pub mod transport;

pub use engine::{Transfer, TransferId, TransferPhase, TransferState, TransferWorker};
pub use manager::Downloader;
pub use metadata::RemoteMetadata;
pub use progress::{
    calculate_progress, calculate_speed, eta_string, format_duration, format_eta, format_speed,
    gen_id, human_size,
};
pub use status::TransferStatus;
pub use transport::{IpFamily, TransportConfig};

use std::collections::HashMap;
use std::path::PathBuf;

/// Per-transfer settings, fixed once the transfer starts.
#[derive(Debug, Clone, Default)]
pub struct TransferOptions {
    /// Fixed chunk size in bytes; `None` writes chunks as the transport yields them.
    pub chunk_size: Option<usize>,
    /// Directory the file is written to, created on demand. Defaults to the
    /// working directory.
    pub download_dir: Option<PathBuf>,
    pub headers: HashMap<String, String>,
    /// Send a desktop browser user agent instead of the crate's own.
    pub fake_user_agent: bool,
    pub transport: TransportConfig,
}

impl TransferOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_fake_user_agent(mut self, enabled: bool) -> Self {
        self.fake_user_agent = enabled;
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}
