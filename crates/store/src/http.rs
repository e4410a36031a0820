//! REST document store client.
//!
//! Documents live at `<root>/<path>.json`; the root document itself is
//! `<root>/.json`. Only HTTP 200 counts as success.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use slotkeeper_core::config::DatastoreConfig;

use crate::traits::{DocumentStore, StoreError};

/// Talks to the document store over HTTP.
#[derive(Debug)]
pub struct HttpDocumentStore {
    /// Root URL without trailing slash.
    base_url: String,
    /// Sent as the `auth` query parameter when set.
    auth_token: Option<String>,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl HttpDocumentStore {
    /// Create a client for the store rooted at `base_url`.
    ///
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(
        base_url: &str,
        auth_token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, StoreError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "datastore URL must be http(s): {base_url}"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            auth_token,
            client: builder.build()?,
        })
    }

    pub fn from_config(config: &DatastoreConfig) -> Result<Self, StoreError> {
        Self::new(&config.url, config.auth_token.clone(), config.timeout())
    }

    /// URL of the document at `path`.
    pub fn document_url(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        if path.is_empty() {
            format!("{}/.json", self.base_url)
        } else {
            format!("{}/{}.json", self.base_url, path)
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.request(method, self.document_url(path));
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token.as_str())]),
            None => request,
        }
    }

    async fn expect_ok(&self, path: &str, response: reqwest::Response) -> Result<String, StoreError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        if status != StatusCode::OK {
            tracing::warn!(path, %status, body = %body, "datastore returned non-200 status");
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn fetch_document(&self, path: &str) -> Result<Value, StoreError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        let body = self.expect_ok(path, response).await?;
        tracing::debug!(path, bytes = body.len(), "datastore document fetched");
        Ok(serde_json::from_str(&body)?)
    }

    async fn patch_document(&self, path: &str, fields: &Value) -> Result<(), StoreError> {
        let response = self
            .request(reqwest::Method::PATCH, path)
            .json(fields)
            .send()
            .await?;
        self.expect_ok(path, response).await?;
        tracing::debug!(path, "datastore document patched");
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(url: &str) -> HttpDocumentStore {
        HttpDocumentStore::new(url, None, None).unwrap()
    }

    #[test]
    fn document_urls() {
        let s = store("https://example-rtdb.firebaseio.com/");
        assert_eq!(s.document_url("settings"), "https://example-rtdb.firebaseio.com/settings.json");
        assert_eq!(s.document_url(""), "https://example-rtdb.firebaseio.com/.json");
        assert_eq!(s.document_url("/cred1"), "https://example-rtdb.firebaseio.com/cred1.json");
    }

    #[test]
    fn trailing_slash_is_optional() {
        let a = store("http://localhost:9000");
        let b = store("http://localhost:9000///");
        assert_eq!(a.document_url("settings"), b.document_url("settings"));
    }

    #[test]
    fn rejects_non_http_url() {
        let result = HttpDocumentStore::new("ftp://example.com", None, None);
        match result.unwrap_err() {
            StoreError::Config(msg) => assert!(msg.contains("ftp://example.com")),
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn from_config_keeps_token() {
        let config = DatastoreConfig {
            url: "https://example.com/".to_string(),
            auth_token: Some("token".to_string()),
            timeout_secs: 3,
        };
        let s = HttpDocumentStore::from_config(&config).unwrap();
        assert_eq!(s.auth_token.as_deref(), Some("token"));
        assert_eq!(s.backend_name(), "http");
    }
}
