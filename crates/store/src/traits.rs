//! DocumentStore trait definition and shared error types.

use serde_json::Value;

/// Path of the root document (every top-level record).
pub const ROOT_PATH: &str = "";

/// Errors that can occur while talking to the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("datastore returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid JSON from datastore: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("datastore unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Read/patch access to a tree of JSON documents addressed by slash paths.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the document at `path`. A path with nothing stored reads as `null`.
    async fn fetch_document(&self, path: &str) -> Result<Value, StoreError>;

    /// Merge the top-level members of `fields` into the document at `path`.
    async fn patch_document(&self, path: &str, fields: &Value) -> Result<(), StoreError>;

    /// Human-readable name for this backend (e.g., "http", "memory").
    fn backend_name(&self) -> &str;
}
