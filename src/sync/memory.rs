//! In-memory content store for tests. Enforces the version marker the way the
//! real API does: overwriting an existing file needs its current sha.

use super::config::SyncConfig;
use super::transport::{ContentStore, RemoteFile, WriteReceipt, WriteRequest};
use crate::error::SyncError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct StoredFile {
    sha: String,
    content: String,
}

#[derive(Debug, Default)]
pub struct MemoryContentStore {
    file: Mutex<Option<StoredFile>>,
    revisions: AtomicUsize,
    reads: AtomicUsize,
    writes: AtomicUsize,
    read_failure: Mutex<Option<u16>>,
    write_failure: Mutex<Option<u16>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with raw base64 content
    pub fn with_content(content: &str) -> Self {
        let store = Self::new();
        store.revisions.store(1, Ordering::SeqCst);
        *store.file.lock().unwrap() = Some(StoredFile {
            sha: "sha-1".to_string(),
            content: content.to_string(),
        });
        store
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn revisions(&self) -> usize {
        self.revisions.load(Ordering::SeqCst)
    }

    pub fn current_sha(&self) -> Option<String> {
        self.file.lock().unwrap().as_ref().map(|f| f.sha.clone())
    }

    /// Raw stored content with line wrapping removed
    pub fn content(&self) -> Option<String> {
        self.file
            .lock()
            .unwrap()
            .as_ref()
            .map(|f| f.content.chars().filter(|c| !c.is_ascii_whitespace()).collect())
    }

    pub fn fail_reads_with(&self, status: u16) {
        *self.read_failure.lock().unwrap() = Some(status);
    }

    pub fn fail_writes_with(&self, status: u16) {
        *self.write_failure.lock().unwrap() = Some(status);
    }
}

/// Wrap base64 at 60 columns like the real API
fn wrap(content: &str) -> String {
    content
        .as_bytes()
        .chunks(60)
        .map(|chunk| format!("{}\n", String::from_utf8_lossy(chunk)))
        .collect()
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn read(&self, _config: &SyncConfig) -> Result<Option<RemoteFile>, SyncError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.read_failure.lock().unwrap() {
            return Err(SyncError::Rejected {
                status,
                message: "injected read failure".to_string(),
            });
        }
        Ok(self.file.lock().unwrap().as_ref().map(|f| RemoteFile {
            sha: f.sha.clone(),
            content: wrap(&f.content),
        }))
    }

    async fn write(&self, _config: &SyncConfig, request: &WriteRequest) -> Result<WriteReceipt, SyncError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.write_failure.lock().unwrap() {
            return Err(SyncError::Rejected {
                status,
                message: "injected write failure".to_string(),
            });
        }

        let mut file = self.file.lock().unwrap();
        if let Some(existing) = file.as_ref() {
            if request.sha.as_deref() != Some(existing.sha.as_str()) {
                return Err(SyncError::Rejected {
                    status: 409,
                    message: format!("data.json does not match {}", request.sha.as_deref().unwrap_or("<none>")),
                });
            }
        }

        let revision = self.revisions.fetch_add(1, Ordering::SeqCst) + 1;
        let sha = format!("sha-{}", revision);
        *file = Some(StoredFile {
            sha: sha.clone(),
            content: request.content.clone(),
        });
        Ok(WriteReceipt {
            content_sha: Some(sha),
            commit_sha: Some(format!("commit-{}", revision)),
        })
    }
}
