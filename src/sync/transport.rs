use super::config::SyncConfig;
use crate::error::SyncError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Current state of the remote file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteFile {
    /// Version marker required to overwrite the file
    pub sha: String,
    /// Base64 content, possibly line-wrapped
    #[serde(default)]
    pub content: String,
}

/// Body of a create-or-update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteRequest {
    pub message: String,
    pub content: String,
    /// Omitted when creating the file for the first time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// What the store reports back after a write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReceipt {
    pub content_sha: Option<String>,
    pub commit_sha: Option<String>,
}

/// A file store with get/put semantics, addressed by a [`SyncConfig`]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// `Ok(None)` when the file does not exist
    async fn read(&self, config: &SyncConfig) -> Result<Option<RemoteFile>, SyncError>;

    async fn write(&self, config: &SyncConfig, request: &WriteRequest) -> Result<WriteReceipt, SyncError>;
}

#[derive(Debug, Deserialize)]
struct ShaRef {
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: Option<ShaRef>,
    commit: Option<ShaRef>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

/// GitHub-style content API over HTTPS
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    client: Client,
}

impl HttpContentStore {
    pub fn new() -> Result<Self, SyncError> {
        let client = Client::builder()
            .user_agent(concat!("pulse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    fn request(&self, method: reqwest::Method, config: &SyncConfig) -> reqwest::RequestBuilder {
        self.client
            .request(method, config.contents_url())
            .header("Authorization", format!("token {}", config.token.trim()))
            .header("Accept", "application/vnd.github+json")
    }

    async fn rejection(response: reqwest::Response) -> SyncError {
        let status = response.status();
        let message = match response.json::<ApiError>().await {
            Ok(ApiError { message: Some(m) }) => m,
            _ => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        SyncError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn read(&self, config: &SyncConfig) -> Result<Option<RemoteFile>, SyncError> {
        let response = self.request(reqwest::Method::GET, config).send().await?;
        let status = response.status();
        debug!(%status, path = config.file_path(), "remote read");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::rejection(response).await);
        }

        let file = response
            .json::<RemoteFile>()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))?;
        Ok(Some(file))
    }

    async fn write(&self, config: &SyncConfig, request: &WriteRequest) -> Result<WriteReceipt, SyncError> {
        let response = self
            .request(reqwest::Method::PUT, config)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        debug!(%status, path = config.file_path(), with_sha = request.sha.is_some(), "remote write");

        if !status.is_success() {
            return Err(Self::rejection(response).await);
        }

        // The write is accepted at this point; an unreadable body only loses the receipt
        let receipt = match response.json::<PutResponse>().await {
            Ok(body) => WriteReceipt {
                content_sha: body.content.and_then(|c| c.sha),
                commit_sha: body.commit.and_then(|c| c.sha),
            },
            Err(_) => WriteReceipt::default(),
        };
        Ok(receipt)
    }
}
