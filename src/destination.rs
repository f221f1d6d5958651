//! Destination Memory Server API client.
//!
//! Single blocking calls with fixed timeouts; no internal retry. The
//! destination upserts by identifier, so replaying a failed run is safe.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::transform::{MemoryWrite, SessionDocument};

/// Request timeout for migration writes. Longer than the diagnostic budget
/// because payloads can be large and the destination may be under batch load.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Request timeout for diagnostic probes.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Destination health endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// Reported status ("healthy" when all is well).
    #[serde(default)]
    pub status: Option<String>,
    /// Server version.
    #[serde(default)]
    pub version: Option<String>,
    /// Whether the server can reach its own Redis backend.
    #[serde(default)]
    pub redis_connected: Option<bool>,
}

impl HealthResponse {
    /// Whether the server reports itself healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.as_deref() == Some("healthy")
    }
}

/// Long-term memory search query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    /// Query text.
    pub text: String,
    /// Maximum results.
    pub limit: usize,
    /// Optional namespace equality filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<NamespaceFilter>,
}

/// Namespace equality filter.
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceFilter {
    /// Exact namespace to match.
    pub eq: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Serialize)]
struct MemoriesBody<'a> {
    memories: &'a [MemoryWrite],
}

/// HTTP client for the destination Memory Server.
pub struct MemoryApiClient {
    client: Client,
    base_url: String,
}

impl MemoryApiClient {
    /// Creates a client with the migration write timeout.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, WRITE_TIMEOUT)
    }

    /// Creates a client with the shorter diagnostic probe timeout.
    #[must_use]
    pub fn for_diagnostics(base_url: &str) -> Self {
        Self::with_timeout(base_url, PROBE_TIMEOUT)
    }

    fn with_timeout(base_url: &str, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The base URL this client targets.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Writes one long-term memory batch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteRejected`] on a non-2xx response, or
    /// [`Error::Http`] on a transport failure. `source_key` only labels the
    /// failure for later manual replay.
    pub async fn write_memories(&self, source_key: &str, memories: &[MemoryWrite]) -> Result<()> {
        let url = format!("{}/v1/long-term-memory", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&MemoriesBody { memories })
            .send()
            .await?;
        Self::check_status(source_key, response).await
    }

    /// Writes one working-memory session.
    ///
    /// `source_key` is the record's original source key, carried verbatim
    /// into any failure so manual replay can target the exact record.
    ///
    /// # Errors
    ///
    /// Same contract as [`MemoryApiClient::write_memories`].
    pub async fn write_session(
        &self,
        source_key: &str,
        session_id: &str,
        document: &SessionDocument,
    ) -> Result<()> {
        let url = format!("{}/v1/working-memory/{session_id}", self.base_url);
        let response = self.client.put(&url).json(document).send().await?;
        Self::check_status(source_key, response).await
    }

    /// Reads back a working-memory session (diagnostics only).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx response.
    pub async fn read_session(&self, session_id: &str) -> Result<SessionDocument> {
        let url = format!("{}/v1/working-memory/{session_id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::WriteRejected {
                key: format!("session:{session_id}"),
                status,
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Checks destination health.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DestinationConnection`] when the endpoint is
    /// unreachable or answers non-2xx.
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/v1/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::DestinationConnection(format!("Health check failed: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::DestinationConnection(format!(
                "Health check returned HTTP {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    /// Searches long-term memories, returning the result count (diagnostics
    /// only).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-2xx response.
    pub async fn search(&self, query: &SearchQuery) -> Result<usize> {
        let url = format!("{}/v1/long-term-memory/search", self.base_url);
        let response = self.client.post(&url).json(query).send().await?;
        if !response.status().is_success() {
            return Err(Error::DestinationConnection(format!(
                "Search returned HTTP {}",
                response.status()
            )));
        }
        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.results.len())
    }

    async fn check_status(source_key: &str, response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(Error::WriteRejected {
            key: source_key.to_string(),
            status,
            body,
        })
    }
}
