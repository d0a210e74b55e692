use chrono::{DateTime, Utc};
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::metadata::{self, RemoteMetadata};
use super::progress::{
    ETA_UNKNOWN, calculate_progress, calculate_speed, eta_string, format_speed, gen_id,
};
use super::{TransferOptions, TransferStatus};
use crate::error::{DownloadError, Result};

const TRANSFER_ID_LEN: usize = 10;

/// Opaque handle identifying one transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(String);

impl TransferId {
    pub fn generate() -> Self {
        Self(gen_id(TRANSFER_ID_LEN))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TransferId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TransferId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferPhase {
    Pending,
    Resolving,
    Downloading,
    Complete,
    Failed,
    Cancelled,
}

impl TransferPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TransferPhase::Complete | TransferPhase::Failed | TransferPhase::Cancelled
        )
    }
}

impl fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferPhase::Pending => write!(f, "pending"),
            TransferPhase::Resolving => write!(f, "resolving"),
            TransferPhase::Downloading => write!(f, "downloading"),
            TransferPhase::Complete => write!(f, "complete"),
            TransferPhase::Failed => write!(f, "failed"),
            TransferPhase::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Live state of a transfer.
///
/// Only the transfer's own task mutates it; every `record_*` method refuses to
/// touch a state that already reached a terminal phase and reports whether it
/// changed anything.
#[derive(Debug, Clone)]
pub struct TransferState {
    pub url: Url,
    pub resolved_url: Option<Url>,
    pub filename: String,
    pub file_type: Option<String>,
    pub total_size: u64,
    pub downloaded: u64,
    pub progress: u8,
    pub speed: String,
    pub eta: String,
    pub destination_path: Option<PathBuf>,
    pub started_at: Option<DateTime<Utc>>,
    /// Number of chunk writes, one per status update.
    pub chunks: u64,
    pub phase: TransferPhase,
    pub error: Option<Arc<DownloadError>>,
}

impl TransferState {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            resolved_url: None,
            filename: "Unknown".to_string(),
            file_type: None,
            total_size: 0,
            downloaded: 0,
            progress: 0,
            speed: format_speed(0.0),
            eta: ETA_UNKNOWN.to_string(),
            destination_path: None,
            started_at: None,
            chunks: 0,
            phase: TransferPhase::Pending,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn is_complete(&self) -> bool {
        self.phase == TransferPhase::Complete
    }

    pub fn record_phase(&mut self, phase: TransferPhase) -> bool {
        if self.is_terminal() || phase.is_terminal() || self.phase == phase {
            return false;
        }
        self.phase = phase;
        true
    }

    pub fn record_metadata(&mut self, metadata: &RemoteMetadata) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.filename = metadata.filename.clone();
        self.total_size = metadata.size;
        self.file_type = metadata.mime_type.clone();
        self.resolved_url = Some(metadata.resolved_url.clone());
        true
    }

    pub fn record_destination(&mut self, path: PathBuf) -> bool {
        if self.is_terminal() || self.destination_path.is_some() {
            return false;
        }
        self.destination_path = Some(path);
        true
    }

    /// Apply one chunk's worth of progress. `downloaded` never moves backwards.
    pub fn record_progress(&mut self, downloaded: u64, elapsed: std::time::Duration) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.downloaded = self.downloaded.max(downloaded);
        self.speed = format_speed(calculate_speed(self.downloaded, elapsed));
        self.progress = calculate_progress(self.downloaded, self.total_size);
        self.eta = eta_string(elapsed, self.downloaded, self.total_size);
        self.chunks += 1;
        true
    }

    pub fn record_completion(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        // Servers that omit Content-Length only reveal the size once the body ends.
        if self.total_size == 0 {
            self.total_size = self.downloaded;
            self.progress = calculate_progress(self.downloaded, self.total_size);
        }
        self.phase = TransferPhase::Complete;
        true
    }

    pub fn record_failure(&mut self, error: Arc<DownloadError>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.phase = if error.is_cancelled() {
            TransferPhase::Cancelled
        } else {
            TransferPhase::Failed
        };
        self.error = Some(error);
        true
    }
}

/// Caller-side handle on a running or finished transfer.
///
/// Cloning is cheap; every clone observes the same state.
#[derive(Debug, Clone)]
pub struct Transfer {
    id: TransferId,
    state: watch::Receiver<TransferState>,
    cancel_token: CancellationToken,
}

impl Transfer {
    pub fn id(&self) -> &TransferId {
        &self.id
    }

    /// Point-in-time copy of the transfer's state. Never blocks on the transfer task.
    pub fn status(&self) -> TransferStatus {
        TransferStatus::from_state(&self.id, &self.state.borrow())
    }

    pub fn is_terminal(&self) -> bool {
        self.state.borrow().is_terminal()
    }

    pub fn error(&self) -> Option<Arc<DownloadError>> {
        self.state.borrow().error.clone()
    }

    /// Request cooperative cancellation.
    ///
    /// The task stops at its next read, write or chunk boundary. Returns `true`
    /// for an already finished transfer without touching it.
    pub fn cancel(&self) -> bool {
        if self.is_terminal() {
            return true;
        }
        debug!(id = %self.id, "Cancellation requested");
        self.cancel_token.cancel();
        true
    }

    /// Wait until the transfer reaches a terminal phase.
    pub async fn wait(&self) -> TransferStatus {
        let mut state = self.state.clone();
        if state.wait_for(TransferState::is_terminal).await.is_err() {
            // The worker records `Aborted` when it is dropped, so a closed
            // channel without a terminal state should not happen.
            warn!(id = %self.id, "Transfer task gone before reaching a terminal state");
        }
        self.status()
    }
}

/// The transfer's background routine and sole writer of its state.
pub struct TransferWorker {
    id: TransferId,
    url: Url,
    options: TransferOptions,
    client: Client,
    state: watch::Sender<TransferState>,
    cancel_token: CancellationToken,
}

impl TransferWorker {
    pub fn new(
        id: TransferId,
        url: Url,
        options: TransferOptions,
        client: Client,
    ) -> (Self, Transfer) {
        let (state_tx, state_rx) = watch::channel(TransferState::new(url.clone()));
        let cancel_token = CancellationToken::new();

        let handle = Transfer {
            id: id.clone(),
            state: state_rx,
            cancel_token: cancel_token.clone(),
        };

        let worker = Self {
            id,
            url,
            options,
            client,
            state: state_tx,
            cancel_token,
        };

        (worker, handle)
    }

    /// Drive the transfer to exactly one terminal outcome.
    ///
    /// The HTTP session, response and file are owned by this call and
    /// released when it returns.
    pub async fn run(self) {
        info!(id = %self.id, url = %self.url, "Starting transfer");

        match self.execute().await {
            Ok(()) => {
                if self.mark_complete() {
                    let state = self.state.borrow();
                    info!(
                        id = %self.id,
                        bytes = state.downloaded,
                        path = ?state.destination_path,
                        "Transfer complete"
                    );
                }
            }
            Err(e) => {
                self.fail_with(e);
            }
        }
    }

    async fn execute(&self) -> Result<()> {
        self.state
            .send_if_modified(|s| s.record_phase(TransferPhase::Resolving));

        let metadata = self
            .cancellable(metadata::resolve(&self.client, &self.url))
            .await?;
        self.state.send_if_modified(|s| s.record_metadata(&metadata));

        let body_url = metadata.resolved_url.clone();
        let response = self
            .cancellable(async {
                self.client
                    .get(body_url.clone())
                    .send()
                    .await
                    .map_err(|e| DownloadError::network(body_url.as_str(), e))
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpStatus {
                url: response.url().to_string(),
                status: status.as_u16(),
            });
        }

        let started = Instant::now();
        self.state.send_if_modified(|s| {
            s.started_at = Some(Utc::now());
            s.record_phase(TransferPhase::Downloading)
        });

        let destination = self.prepare_destination(&metadata.filename).await?;

        let stream_url = body_url.to_string();
        let stream = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| DownloadError::network(stream_url.as_str(), e)));

        self.write_body(stream, &destination, started).await
    }

    /// Resolve the destination path, creating the download directory if needed.
    async fn prepare_destination(&self, filename: &str) -> Result<PathBuf> {
        self.ensure_active()?;

        let destination = match &self.options.download_dir {
            Some(dir) => {
                let is_dir = tokio::fs::metadata(dir)
                    .await
                    .map(|m| m.is_dir())
                    .unwrap_or(false);
                if !is_dir {
                    debug!(id = %self.id, dir = ?dir, "Creating download directory");
                    tokio::fs::create_dir_all(dir)
                        .await
                        .map_err(|source| DownloadError::CreateDir {
                            path: dir.clone(),
                            source,
                        })?;
                }
                dir.join(filename)
            }
            None => PathBuf::from(filename),
        };

        self.state
            .send_if_modified(|s| s.record_destination(destination.clone()));
        Ok(destination)
    }

    /// Stream the body into `destination`, truncating any existing file.
    ///
    /// With a configured chunk size the stream is re-cut into chunks of exactly
    /// that size (the last one may be shorter); otherwise chunks are written as
    /// the transport delivers them. A failure leaves the partial file in place.
    pub async fn write_body<S, B>(&self, stream: S, destination: &Path, started: Instant) -> Result<()>
    where
        S: Stream<Item = Result<B>>,
        B: AsRef<[u8]>,
    {
        self.ensure_active()?;
        let mut stream = std::pin::pin!(stream);

        let mut file = File::create(destination)
            .await
            .map_err(|e| DownloadError::io(destination, e))?;

        let mut downloaded = 0u64;
        let mut pending: Vec<u8> = Vec::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => return Err(DownloadError::Cancelled),
                next = stream.next() => next,
            };

            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk?;
            let bytes = chunk.as_ref();

            match self.options.chunk_size {
                Some(size) => {
                    pending.extend_from_slice(bytes);
                    let mut offset = 0;
                    while pending.len() - offset >= size {
                        let piece = &pending[offset..offset + size];
                        self.write_chunk(&mut file, destination, piece, &mut downloaded, started)
                            .await?;
                        offset += size;
                    }
                    pending.drain(..offset);
                }
                None => {
                    self.write_chunk(&mut file, destination, bytes, &mut downloaded, started)
                        .await?;
                }
            }
        }

        if !pending.is_empty() {
            self.write_chunk(&mut file, destination, &pending, &mut downloaded, started)
                .await?;
        }

        self.ensure_active()?;
        file.flush()
            .await
            .map_err(|e| DownloadError::io(destination, e))?;

        Ok(())
    }

    async fn write_chunk(
        &self,
        file: &mut File,
        destination: &Path,
        chunk: &[u8],
        downloaded: &mut u64,
        started: Instant,
    ) -> Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.ensure_active()?;

        file.write_all(chunk)
            .await
            .map_err(|e| DownloadError::io(destination, e))?;

        *downloaded += chunk.len() as u64;
        self.update_status(*downloaded, started);
        Ok(())
    }

    fn update_status(&self, downloaded: u64, started: Instant) {
        let elapsed = started.elapsed();
        self.state
            .send_if_modified(|s| s.record_progress(downloaded, elapsed));
    }

    /// Terminal failure. Records `error` unless the transfer already finished
    /// and returns whichever error ended up recorded.
    pub fn fail_with(&self, error: DownloadError) -> Arc<DownloadError> {
        let error = Arc::new(error);
        let mut recorded = Arc::clone(&error);

        let modified = self.state.send_if_modified(|s| {
            if s.record_failure(Arc::clone(&error)) {
                return true;
            }
            if let Some(existing) = &s.error {
                recorded = Arc::clone(existing);
            }
            false
        });

        if modified {
            if recorded.is_cancelled() {
                info!(id = %self.id, "Transfer cancelled");
            } else {
                warn!(id = %self.id, error = %recorded, "Transfer failed");
            }
        }

        recorded
    }

    fn mark_complete(&self) -> bool {
        self.state.send_if_modified(TransferState::record_completion)
    }

    fn ensure_active(&self) -> Result<()> {
        if self.cancel_token.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }
        Ok(())
    }

    async fn cancellable<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => Err(DownloadError::Cancelled),
            result = future => result,
        }
    }
}

impl Drop for TransferWorker {
    // Covers a routine that panicked or whose task was dropped mid-flight.
    fn drop(&mut self) {
        if !self.state.borrow().is_terminal() {
            self.fail_with(DownloadError::Aborted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_worker(options: TransferOptions) -> (TransferWorker, Transfer) {
        let url = Url::parse("http://127.0.0.1:9/file.bin").unwrap();
        TransferWorker::new(TransferId::generate(), url, options, Client::new())
    }

    fn chunks(sizes: &[usize]) -> Vec<Result<Vec<u8>>> {
        let mut value = 0u8;
        sizes
            .iter()
            .map(|&len| {
                let chunk: Vec<u8> = (0..len)
                    .map(|_| {
                        value = value.wrapping_add(1);
                        value
                    })
                    .collect();
                Ok(chunk)
            })
            .collect()
    }

    fn concat(items: &[Result<Vec<u8>>]) -> Vec<u8> {
        items
            .iter()
            .flat_map(|c| c.as_ref().unwrap().iter().copied())
            .collect()
    }

    #[test]
    fn test_transfer_id_shape() {
        let id = TransferId::generate();
        assert_eq!(id.as_str().len(), TRANSFER_ID_LEN);
        assert_ne!(id, TransferId::generate());
        assert_eq!(TransferId::from("ABC").to_string(), "ABC");
    }

    #[test]
    fn test_progress_is_monotonic_and_bounded() {
        let mut state = TransferState::new(Url::parse("http://x/f").unwrap());
        state.total_size = 1000;

        let mut last = 0;
        for (i, downloaded) in [100u64, 350, 200, 999, 1000, 1200].into_iter().enumerate() {
            assert!(state.record_progress(downloaded, Duration::from_millis(100 * (i as u64 + 1))));
            assert!(state.downloaded >= last);
            assert!(state.progress <= 100);
            last = state.downloaded;
        }
        assert_eq!(state.downloaded, 1200);
        assert_eq!(state.progress, 100);
        assert_eq!(state.chunks, 6);
    }

    #[test]
    fn test_unknown_total_keeps_progress_at_zero() {
        let mut state = TransferState::new(Url::parse("http://x/f").unwrap());
        for downloaded in [10u64, 20, 30] {
            state.record_progress(downloaded, Duration::from_secs(1));
            assert_eq!(state.progress, 0);
            assert_eq!(state.eta, ETA_UNKNOWN);
        }

        assert!(state.record_completion());
        assert_eq!(state.total_size, 30);
        assert_eq!(state.progress, 100);
    }

    #[test]
    fn test_terminal_state_is_frozen() {
        let mut state = TransferState::new(Url::parse("http://x/f").unwrap());
        state.record_progress(10, Duration::from_secs(1));
        assert!(state.record_completion());

        let snapshot = (state.downloaded, state.chunks, state.phase);
        assert!(!state.record_completion());
        assert!(!state.record_failure(Arc::new(DownloadError::Cancelled)));
        assert!(!state.record_progress(50, Duration::from_secs(2)));
        assert!(!state.record_phase(TransferPhase::Downloading));
        assert_eq!((state.downloaded, state.chunks, state.phase), snapshot);
        assert!(state.error.is_none());
    }

    #[test]
    fn test_failure_recorded_once() {
        let mut state = TransferState::new(Url::parse("http://x/f").unwrap());
        assert!(state.record_failure(Arc::new(DownloadError::Cancelled)));
        assert_eq!(state.phase, TransferPhase::Cancelled);

        assert!(!state.record_failure(Arc::new(DownloadError::InvalidChunkSize)));
        assert!(!state.record_completion());
        assert!(state.error.as_ref().unwrap().is_cancelled());
    }

    #[test]
    fn test_destination_set_once() {
        let mut state = TransferState::new(Url::parse("http://x/f").unwrap());
        assert!(state.record_destination(PathBuf::from("a.bin")));
        assert!(!state.record_destination(PathBuf::from("b.bin")));
        assert_eq!(state.destination_path, Some(PathBuf::from("a.bin")));
    }

    #[tokio::test]
    async fn test_write_body_fixed_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.bin");
        let items = chunks(&[3000, 5000, 100]);
        let expected = concat(&items);

        let (worker, transfer) = test_worker(TransferOptions::new().with_chunk_size(1024));
        worker
            .write_body(stream::iter(items), &path, Instant::now())
            .await
            .unwrap();

        let status = transfer.status();
        assert_eq!(status.downloaded, 8100);
        // 7 full chunks of 1024 bytes and a 932 byte tail
        assert_eq!(status.chunks, 8);
        assert_eq!(std::fs::read(&path).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_write_body_natural_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.bin");
        let items = chunks(&[10, 0, 20, 30]);
        let expected = concat(&items);

        let (worker, transfer) = test_worker(TransferOptions::new());
        worker
            .write_body(stream::iter(items), &path, Instant::now())
            .await
            .unwrap();

        let status = transfer.status();
        assert_eq!(status.downloaded, 60);
        // The empty chunk is not counted.
        assert_eq!(status.chunks, 3);
        assert_eq!(std::fs::read(&path).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_write_body_stream_error_keeps_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.bin");
        let items: Vec<Result<Vec<u8>>> = vec![
            Ok(vec![1u8; 64]),
            Err(DownloadError::HttpStatus {
                url: "http://x".to_string(),
                status: 500,
            }),
            Ok(vec![2u8; 64]),
        ];

        let (worker, transfer) = test_worker(TransferOptions::new());
        let result = worker
            .write_body(stream::iter(items), &path, Instant::now())
            .await;

        assert!(matches!(result, Err(DownloadError::HttpStatus { status: 500, .. })));
        assert_eq!(transfer.status().downloaded, 64);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_write_body_stops_when_cancelled() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.bin");

        let (worker, transfer) = test_worker(TransferOptions::new());
        assert!(transfer.cancel());

        let result = worker
            .write_body(stream::iter(chunks(&[16, 16])), &path, Instant::now())
            .await;
        assert!(matches!(result, Err(DownloadError::Cancelled)));
        assert_eq!(transfer.status().downloaded, 0);
    }

    #[tokio::test]
    async fn test_write_body_pending_stream_observes_cancellation() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.bin");

        let (worker, transfer) = test_worker(TransferOptions::new());
        let first = stream::iter(chunks(&[32]));
        let stalled = first.chain(stream::pending());

        let cancel_handle = transfer.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel_handle.cancel();
        });

        let result = worker
            .write_body(Box::pin(stalled), &path, Instant::now())
            .await;
        assert!(matches!(result, Err(DownloadError::Cancelled)));
        assert_eq!(transfer.status().downloaded, 32);
    }

    #[tokio::test]
    async fn test_fail_with_is_idempotent() {
        let (worker, transfer) = test_worker(TransferOptions::new());

        let first = worker.fail_with(DownloadError::Cancelled);
        assert!(first.is_cancelled());

        let second = worker.fail_with(DownloadError::InvalidChunkSize);
        assert!(second.is_cancelled(), "first recorded error must be kept");

        let status = transfer.status();
        assert_eq!(status.phase, TransferPhase::Cancelled);
        assert_eq!(status.error.as_deref(), Some("download cancelled"));
        assert!(!status.complete);
        assert!(transfer.cancel(), "cancelling a finished transfer succeeds");
    }

    #[tokio::test]
    async fn test_dropped_worker_ends_failed() {
        let (worker, transfer) = test_worker(TransferOptions::new());
        drop(worker);

        let status = tokio::time::timeout(Duration::from_secs(1), transfer.wait())
            .await
            .unwrap();
        assert!(status.is_terminal());
        assert_eq!(status.phase, TransferPhase::Failed);
        assert_eq!(status.error.as_deref(), Some("transfer task ended unexpectedly"));
        assert!(matches!(transfer.error().as_deref(), Some(DownloadError::Aborted)));
    }

    #[tokio::test]
    async fn test_panicking_worker_ends_failed() {
        let (worker, transfer) = test_worker(TransferOptions::new().with_chunk_size(4));

        let task = tokio::spawn(async move {
            worker.update_status(1, Instant::now());
            worker.state.send_modify(|_| panic!("worker blew up"));
        });
        assert!(task.await.unwrap_err().is_panic());

        let status = tokio::time::timeout(Duration::from_secs(1), transfer.wait())
            .await
            .unwrap();
        assert_eq!(status.phase, TransferPhase::Failed);
        assert_eq!(status.downloaded, 1);
        assert!(transfer.cancel(), "finished transfers report a successful cancel");
    }

    #[tokio::test]
    async fn test_huge_content_length_does_not_stall_progress() {
        let (worker, transfer) = test_worker(TransferOptions::new());
        worker.state.send_modify(|s| s.total_size = u64::MAX);

        let started = Instant::now() - Duration::from_secs(2);
        worker.update_status(1, started);

        let status = transfer.status();
        assert_eq!(status.downloaded, 1);
        assert_eq!(status.eta, ETA_UNKNOWN);
        assert_eq!(status.progress, 0);
        assert!(!status.is_terminal());
    }

    #[tokio::test]
    async fn test_wait_returns_after_terminal() {
        let (worker, transfer) = test_worker(TransferOptions::new());

        let waiter = tokio::spawn({
            let transfer = transfer.clone();
            async move { transfer.wait().await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(worker.mark_complete());

        let status = waiter.await.unwrap();
        assert!(status.complete);
        assert_eq!(status.phase, TransferPhase::Complete);
    }
}
