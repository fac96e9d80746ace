pub mod client;
pub mod codec;
pub mod config;
#[cfg(test)]
pub mod memory;
pub mod transport;

pub use client::{FetchOutcome, SaveOutcome, SyncClient};
pub use config::{SyncConfig, SyncConfigPatch};
pub use transport::{ContentStore, HttpContentStore};
