use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use super::engine::{TransferId, TransferPhase, TransferState};
use super::progress::human_size;

/// Immutable snapshot of a transfer, safe to hand to other tasks or serialise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferStatus {
    pub id: TransferId,
    pub url: String,
    pub resolved_url: Option<String>,
    pub filename: String,
    pub file_type: Option<String>,
    pub total_size: u64,
    pub total_size_str: String,
    pub downloaded: u64,
    pub downloaded_str: String,
    pub progress: u8,
    pub speed: String,
    pub eta: String,
    pub complete: bool,
    pub error: Option<String>,
    pub destination_path: Option<PathBuf>,
    pub started_at: Option<DateTime<Utc>>,
    pub chunks: u64,
    pub phase: TransferPhase,
}

impl TransferStatus {
    pub fn from_state(id: &TransferId, state: &TransferState) -> Self {
        Self {
            id: id.clone(),
            url: state.url.to_string(),
            resolved_url: state.resolved_url.as_ref().map(|u| u.to_string()),
            filename: state.filename.clone(),
            file_type: state.file_type.clone(),
            total_size: state.total_size,
            total_size_str: human_size(state.total_size),
            downloaded: state.downloaded,
            downloaded_str: human_size(state.downloaded),
            progress: state.progress,
            speed: state.speed.clone(),
            eta: state.eta.clone(),
            complete: state.is_complete(),
            error: state.error.as_ref().map(|e| e.to_string()),
            destination_path: state.destination_path.clone(),
            started_at: state.started_at,
            chunks: state.chunks,
            phase: state.phase,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn is_cancelled(&self) -> bool {
        self.phase == TransferPhase::Cancelled
    }
}
