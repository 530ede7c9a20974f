//! Remote store client for the local capture backend.
//!
//! Every operation is exactly one HTTP exchange. There are no retries: the
//! polling loop is the only retry mechanism this client has.

use std::future::Future;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Deserialize;

use crate::config::{normalize_backend_url, ClientConfig};
use crate::error::{Error, Result};
use crate::models::{ClipboardEntry, EntryId, EntryPayload, FlagKind, FlagUpdate};

/// Operations the sync core needs from the backend.
pub trait RemoteStore: Send + Sync {
    /// Fetch the complete entry set.
    fn list_entries(&self) -> impl Future<Output = Result<Vec<ClipboardEntry>>> + Send;

    /// Toggle or force one flag on one entry.
    fn set_flag(
        &self,
        id: EntryId,
        kind: FlagKind,
        update: FlagUpdate,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove one entry.
    fn delete_entry(&self, id: EntryId) -> impl Future<Output = Result<()>> + Send;

    /// Pause or resume server-side capture.
    fn set_monitoring(&self, enabled: bool) -> impl Future<Output = Result<()>> + Send;
}

/// reqwest-backed `RemoteStore`.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpStore {
    /// Builds a client for an explicit base URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_backend_url(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                Error::InvalidConfig(format!("failed to construct HTTP client: {error}"))
            })?;
        Ok(Self { base_url, client })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.backend_url, config.request_timeout())
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Wipe every entry on the backend, favourites included.
    ///
    /// Bulk-clear never uses this; it deletes a confirmed id list instead.
    pub async fn clear_all(&self) -> Result<()> {
        self.send(Method::DELETE, "/clear", None).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%method, %url, "backend request");

        let mut request = self
            .client
            .request(method, &url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|error| Error::UnreachableBackend(format!("{url}: {error}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::BackendRejected {
                status: status.as_u16(),
                message: parse_api_error(status, &body),
            });
        }

        Ok(response)
    }
}

impl RemoteStore for HttpStore {
    async fn list_entries(&self) -> Result<Vec<ClipboardEntry>> {
        let response = self.send(Method::GET, "/history", None).await?;
        let body = response.text().await?;
        parse_history(&body)
    }

    async fn set_flag(&self, id: EntryId, kind: FlagKind, update: FlagUpdate) -> Result<()> {
        let path = format!("/{}/{id}", kind.path_segment());
        let body = match update {
            FlagUpdate::Toggle => None,
            FlagUpdate::Set(status) => Some(serde_json::json!({ "status": status })),
        };
        self.send(Method::POST, &path, body).await?;
        Ok(())
    }

    async fn delete_entry(&self, id: EntryId) -> Result<()> {
        self.send(Method::DELETE, &format!("/delete/{id}"), None)
            .await?;
        Ok(())
    }

    async fn set_monitoring(&self, enabled: bool) -> Result<()> {
        let path = if enabled { "/resume" } else { "/pause" };
        self.send(Method::POST, path, None).await?;
        Ok(())
    }
}

/// Decode a `GET /history` body into entries.
pub fn parse_history(body: &str) -> Result<Vec<ClipboardEntry>> {
    let payload = serde_json::from_str::<Vec<EntryPayload>>(body).map_err(|error| {
        Error::MalformedResponse(format!("invalid history payload: {error}"))
    })?;
    payload.into_iter().map(ClipboardEntry::try_from).collect()
}

const ERROR_EXCERPT_CHARS: usize = 180;

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return message.trim().to_string();
        }
    }

    let trimmed = body.trim().chars().take(ERROR_EXCERPT_CHARS).collect::<String>();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed
    }
}
