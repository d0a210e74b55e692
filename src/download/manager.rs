use dashmap::DashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span};
use url::Url;

use super::engine::{Transfer, TransferId, TransferWorker};
use super::transport::build_client;
use super::{TransferOptions, TransferStatus};
use crate::error::{DownloadError, Result};

struct TransferEntry {
    transfer: Transfer,
    task: Option<JoinHandle<()>>,
}

/// Registry of transfers keyed by their handle.
///
/// Entries stay queryable after they finish until [`Downloader::remove`] or
/// [`Downloader::prune`] drops them. Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct Downloader {
    transfers: Arc<DashMap<TransferId, TransferEntry>>,
}

impl Downloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start downloading `url` in the background and return its handle immediately.
    ///
    /// Setup problems (malformed URL, bad options or headers, HTTP client
    /// construction) are returned here and nothing is registered. Everything
    /// after that is reported through the transfer's status. Must be called
    /// from within a tokio runtime.
    pub fn start(&self, url: &str, options: TransferOptions) -> Result<TransferId> {
        let url = parse_url(url)?;
        if options.chunk_size == Some(0) {
            return Err(DownloadError::InvalidChunkSize);
        }

        let client = build_client(&options.transport, &options.headers, options.fake_user_agent)?;

        let mut id = TransferId::generate();
        while self.transfers.contains_key(&id) {
            id = TransferId::generate();
        }

        let (worker, transfer) = TransferWorker::new(id.clone(), url, options, client);
        let span = info_span!("transfer", id = %id);
        let task = tokio::spawn(worker.run().instrument(span));

        self.transfers.insert(
            id.clone(),
            TransferEntry {
                transfer,
                task: Some(task),
            },
        );

        debug!(id = %id, "Registered transfer");
        Ok(id)
    }

    /// Cancel a transfer. Unknown handles yield `false`; finished transfers
    /// yield `true` and are left untouched.
    pub fn cancel(&self, id: &TransferId) -> bool {
        match self.transfer(id) {
            Some(transfer) => transfer.cancel(),
            None => false,
        }
    }

    pub fn status(&self, id: &TransferId) -> Option<TransferStatus> {
        self.transfers.get(id).map(|entry| entry.transfer.status())
    }

    pub fn statuses(&self) -> Vec<TransferStatus> {
        let mut statuses: Vec<TransferStatus> = self
            .transfers
            .iter()
            .map(|entry| entry.transfer.status())
            .collect();
        statuses.sort_by(|a, b| a.id.cmp(&b.id));
        statuses
    }

    pub fn transfer(&self, id: &TransferId) -> Option<Transfer> {
        self.transfers.get(id).map(|entry| entry.transfer.clone())
    }

    /// Wait for a transfer to finish and return its final status.
    pub async fn wait(&self, id: &TransferId) -> Option<TransferStatus> {
        // Clone the handle out so no map shard stays locked across the await.
        let transfer = self.transfer(id)?;
        Some(transfer.wait().await)
    }

    /// Drop a transfer from the registry, cancelling it first if it is still running.
    pub fn remove(&self, id: &TransferId) -> bool {
        match self.transfers.remove(id) {
            Some((_, entry)) => {
                entry.transfer.cancel();
                debug!(id = %id, "Removed transfer");
                true
            }
            None => false,
        }
    }

    /// Drop every finished transfer and return how many were removed.
    pub fn prune(&self) -> usize {
        let before = self.transfers.len();
        self.transfers.retain(|_, entry| {
            let finished = entry.task.as_ref().is_none_or(JoinHandle::is_finished);
            !(finished && entry.transfer.is_terminal())
        });
        before.saturating_sub(self.transfers.len())
    }

    /// Cancel every running transfer and wait for their tasks to exit.
    pub async fn shutdown(&self) {
        let mut tasks = Vec::new();
        for mut entry in self.transfers.iter_mut() {
            entry.transfer.cancel();
            if let Some(task) = entry.task.take() {
                tasks.push(task);
            }
        }

        for task in tasks {
            let _ = task.await;
        }
    }

    pub fn ids(&self) -> Vec<TransferId> {
        let mut ids: Vec<TransferId> = self.transfers.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }
}

fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|_| DownloadError::InvalidUrl {
        url: url.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(DownloadError::InvalidUrl {
            url: url.to_string(),
        }),
    }
}
