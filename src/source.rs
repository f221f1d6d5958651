//! Source store enumeration.
//!
//! The source is a Redis instance holding two record families: flat hashes
//! under `memory:*` and serialized session documents under `session:*`.
//! Enumeration uses the SCAN cursor protocol and never materializes the
//! keyspace in one call.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{Error, Result};

/// Key prefix for long-term memory hash records.
pub const MEMORY_PREFIX: &str = "memory:";
/// Key prefix for working-memory session blobs.
pub const SESSION_PREFIX: &str = "session:";

/// Timeout for a single store round trip.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Scan cursor state.
///
/// The SCAN protocol reuses cursor `0` both as the starting value and as the
/// completion signal. This enum keeps the two states distinct so a fresh scan
/// can never be mistaken for a finished one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCursor {
    /// No SCAN call issued yet.
    NotStarted,
    /// Mid-scan, holding the store's continuation token.
    InProgress(u64),
    /// The store signaled completion.
    Done,
}

impl ScanCursor {
    /// The cursor value to send on the wire for the next SCAN call.
    ///
    /// Callers check [`ScanCursor::is_done`] before issuing another call;
    /// `Done` maps back to 0 only so the method stays total.
    #[must_use]
    pub fn wire(&self) -> u64 {
        match self {
            ScanCursor::NotStarted => 0,
            ScanCursor::InProgress(c) => *c,
            ScanCursor::Done => 0,
        }
    }

    /// Interprets the cursor value returned by the store.
    #[must_use]
    pub fn advance(returned: u64) -> Self {
        if returned == 0 {
            ScanCursor::Done
        } else {
            ScanCursor::InProgress(returned)
        }
    }

    /// Whether the scan is complete.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, ScanCursor::Done)
    }
}

/// A flat memory record: key plus string-to-string field map.
#[derive(Debug, Clone)]
pub struct HashRecord {
    /// Source key, including the `memory:` prefix.
    pub key: String,
    /// Raw field map as stored.
    pub fields: HashMap<String, String>,
}

/// A session record: key plus one serialized document.
#[derive(Debug, Clone)]
pub struct BlobRecord {
    /// Source key, including the `session:` prefix.
    pub key: String,
    /// Raw serialized document as stored.
    pub raw: String,
}

/// Trait for the source store protocol.
///
/// Implement this to enumerate records from a new source. The production
/// implementation is [`RedisSource`]; tests supply in-memory fakes.
#[async_trait]
pub trait SourceStore: Send {
    /// Fetch one page of keys matching `pattern`.
    ///
    /// `count` is a hint; the store may return fewer or more keys per page.
    async fn scan_page(
        &mut self,
        pattern: &str,
        cursor: ScanCursor,
        count: usize,
    ) -> Result<(ScanCursor, Vec<String>)>;

    /// Fetch the full field map for a hash key.
    ///
    /// Returns `None` when the key no longer exists (deleted between list
    /// and fetch).
    async fn fetch_hash(&mut self, key: &str) -> Result<Option<HashMap<String, String>>>;

    /// Fetch the raw value for a string key.
    ///
    /// Returns `None` when the key no longer exists.
    async fn fetch_blob(&mut self, key: &str) -> Result<Option<String>>;
}

/// Source store backed by a Redis connection.
pub struct RedisSource {
    conn: ConnectionManager,
}

impl RedisSource {
    /// Connect to the source Redis instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceConnection`] if the URL is invalid or the
    /// store is unreachable.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::SourceConnection(format!("Invalid Redis URL: {e}")))?;
        let conn = timeout(STORE_TIMEOUT, client.get_connection_manager())
            .await
            .map_err(|_| Error::SourceConnection("Connection to source timed out".to_string()))?
            .map_err(|e| Error::SourceConnection(format!("Cannot connect to source: {e}")))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl SourceStore for RedisSource {
    async fn scan_page(
        &mut self,
        pattern: &str,
        cursor: ScanCursor,
        count: usize,
    ) -> Result<(ScanCursor, Vec<String>)> {
        let (next, keys): (u64, Vec<String>) = timeout(
            STORE_TIMEOUT,
            redis::cmd("SCAN")
                .arg(cursor.wire())
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(count)
                .query_async(&mut self.conn),
        )
        .await
        .map_err(|_| Error::Scan(format!("SCAN {pattern} timed out")))??;

        Ok((ScanCursor::advance(next), keys))
    }

    async fn fetch_hash(&mut self, key: &str) -> Result<Option<HashMap<String, String>>> {
        let fields: HashMap<String, String> = timeout(
            STORE_TIMEOUT,
            redis::cmd("HGETALL").arg(key).query_async(&mut self.conn),
        )
        .await
        .map_err(|_| Error::Scan(format!("HGETALL {key} timed out")))??;

        // An empty map means the key vanished between list and fetch.
        if fields.is_empty() {
            Ok(None)
        } else {
            Ok(Some(fields))
        }
    }

    async fn fetch_blob(&mut self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = timeout(
            STORE_TIMEOUT,
            redis::cmd("GET").arg(key).query_async(&mut self.conn),
        )
        .await
        .map_err(|_| Error::Scan(format!("GET {key} timed out")))??;

        Ok(value)
    }
}

/// Enumerate all hash records under `prefix`.
///
/// Drains the scan cursor to completion, fetching each listed key's field
/// map. Keys deleted between list and fetch are skipped. Produces each
/// surviving key exactly once, in store enumeration order.
///
/// # Errors
///
/// Returns an error if a SCAN or fetch round trip fails.
pub async fn scan_hash_records<S: SourceStore>(
    store: &mut S,
    prefix: &str,
    page_size: usize,
) -> Result<Vec<HashRecord>> {
    let pattern = format!("{prefix}*");
    let mut records = Vec::new();
    let mut cursor = ScanCursor::NotStarted;

    while !cursor.is_done() {
        let (next, keys) = store.scan_page(&pattern, cursor, page_size).await?;
        debug!("SCAN {} returned {} keys", pattern, keys.len());

        for key in keys {
            if let Some(fields) = store.fetch_hash(&key).await? {
                records.push(HashRecord { key, fields });
            }
        }

        cursor = next;
    }

    Ok(records)
}

/// Enumerate all blob records under `prefix`.
///
/// Same contract as [`scan_hash_records`], fetching raw string values.
///
/// # Errors
///
/// Returns an error if a SCAN or fetch round trip fails.
pub async fn scan_blob_records<S: SourceStore>(
    store: &mut S,
    prefix: &str,
    page_size: usize,
) -> Result<Vec<BlobRecord>> {
    let pattern = format!("{prefix}*");
    let mut records = Vec::new();
    let mut cursor = ScanCursor::NotStarted;

    while !cursor.is_done() {
        let (next, keys) = store.scan_page(&pattern, cursor, page_size).await?;
        debug!("SCAN {} returned {} keys", pattern, keys.len());

        for key in keys {
            if let Some(raw) = store.fetch_blob(&key).await? {
                records.push(BlobRecord { key, raw });
            }
        }

        cursor = next;
    }

    Ok(records)
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
