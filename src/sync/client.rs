use super::codec::{decode_document, encode_document};
use super::config::SyncConfig;
use super::transport::{ContentStore, WriteRequest};
use crate::domain::timestamp::format_timestamp;
use crate::domain::AppData;
use crate::error::SyncError;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved {
        synced_at: DateTime<Utc>,
        /// New version marker of the remote file, when the store reported one
        revision: Option<String>,
    },
    /// Token, owner or repo missing; nothing was sent
    NotConfigured,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fetched(AppData),
    /// Token, owner or repo missing; nothing was sent
    NotConfigured,
}

/// Commit message for a save at `now`
pub fn commit_message(now: DateTime<Utc>) -> String {
    format!("Sync App Data - {}", format_timestamp(&now))
}

/// Save/fetch protocol on top of a [`ContentStore`]
#[derive(Debug, Clone)]
pub struct SyncClient<S> {
    store: S,
}

impl<S: ContentStore> SyncClient<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Upload the full document, overwriting whatever the remote holds
    pub async fn save(
        &self,
        config: &SyncConfig,
        data: &AppData,
        now: DateTime<Utc>,
    ) -> Result<SaveOutcome, SyncError> {
        if !config.is_configured() {
            debug!("save skipped, sync not configured");
            return Ok(SaveOutcome::NotConfigured);
        }

        // Any read failure just means no marker; the write is authoritative
        let sha = match self.store.read(config).await {
            Ok(Some(file)) => Some(file.sha),
            Ok(None) => {
                debug!(path = config.file_path(), "remote file missing, creating it");
                None
            }
            Err(e) => {
                warn!(error = %e, "could not read remote version marker, writing without it");
                None
            }
        };

        let request = WriteRequest {
            message: commit_message(now),
            content: encode_document(data)?,
            sha,
        };
        let receipt = self.store.write(config, &request).await?;

        info!(
            owner = %config.owner,
            repo = %config.repo,
            path = config.file_path(),
            tasks = data.tasks.len(),
            commit = receipt.commit_sha.as_deref().unwrap_or("-"),
            "document saved to remote"
        );
        Ok(SaveOutcome::Saved {
            synced_at: now,
            revision: receipt.content_sha,
        })
    }

    /// Download and decode the remote document
    pub async fn fetch(&self, config: &SyncConfig) -> Result<FetchOutcome, SyncError> {
        if !config.is_configured() {
            debug!("fetch skipped, sync not configured");
            return Ok(FetchOutcome::NotConfigured);
        }

        let file = self.store.read(config).await?.ok_or(SyncError::NotFound)?;
        let data = decode_document(&file.content)?;

        info!(
            owner = %config.owner,
            repo = %config.repo,
            path = config.file_path(),
            tasks = data.tasks.len(),
            "document fetched from remote"
        );
        Ok(FetchOutcome::Fetched(data))
    }
}
