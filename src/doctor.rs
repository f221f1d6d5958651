//! Connectivity diagnostics against the destination Memory Server.
//!
//! Exercises the same API surface the migration uses, each check isolated
//! so one failure never stops the rest.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::destination::{MemoryApiClient, NamespaceFilter, SearchQuery};
use crate::transform::{MemoryWrite, Message, SessionDocument};

/// Latency budget the performance probe passes under, per call on average.
pub const LATENCY_BUDGET_MS: f64 = 100.0;

const LATENCY_PROBES: usize = 10;

/// Outcome of one diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Check name.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Human-readable detail or failure message.
    pub detail: String,
    /// Wall-clock time the check took.
    pub elapsed: Duration,
}

impl CheckOutcome {
    fn from_result(name: &str, started: Instant, result: Result<(bool, String), String>) -> Self {
        let (passed, detail) = match result {
            Ok((passed, detail)) => (passed, detail),
            Err(message) => (false, message),
        };
        Self {
            name: name.to_string(),
            passed,
            detail,
            elapsed: started.elapsed(),
        }
    }
}

/// Runs all diagnostic checks in order, collecting every outcome.
pub async fn run_checks(client: &MemoryApiClient) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();

    let started = Instant::now();
    outcomes.push(CheckOutcome::from_result(
        "API Health",
        started,
        check_health(client).await,
    ));

    let started = Instant::now();
    outcomes.push(CheckOutcome::from_result(
        "Create Memory",
        started,
        check_create_memory(client).await,
    ));

    let started = Instant::now();
    outcomes.push(CheckOutcome::from_result(
        "Search Memory",
        started,
        check_search(client).await,
    ));

    let started = Instant::now();
    outcomes.push(CheckOutcome::from_result(
        "Working Memory",
        started,
        check_working_memory(client).await,
    ));

    let started = Instant::now();
    outcomes.push(CheckOutcome::from_result(
        "Performance",
        started,
        check_latency(client).await,
    ));

    outcomes
}

async fn check_health(client: &MemoryApiClient) -> Result<(bool, String), String> {
    let health = client
        .health()
        .await
        .map_err(|e| format!("Health check failed: {e}"))?;
    let detail = format!(
        "API {} - Redis: {}",
        health.version.as_deref().unwrap_or("unknown"),
        health
            .redis_connected
            .map_or("unknown".to_string(), |c| c.to_string())
    );
    Ok((health.is_healthy(), detail))
}

async fn check_create_memory(client: &MemoryApiClient) -> Result<(bool, String), String> {
    let id = format!("test_memory_{}", unix_timestamp());
    let memory = MemoryWrite {
        id: Some(id.clone()),
        text: "Connection test memory from client".to_string(),
        memory_type: "semantic".to_string(),
        namespace: Some("test".to_string()),
        topics: vec!["connection".to_string(), "test".to_string()],
        entities: vec!["Memory Central".to_string()],
    };
    client
        .write_memories(&id, std::slice::from_ref(&memory))
        .await
        .map_err(|e| format!("Create failed: {e}"))?;
    Ok((true, format!("Created memory ID: {id}")))
}

async fn check_search(client: &MemoryApiClient) -> Result<(bool, String), String> {
    let query = SearchQuery {
        text: "connection test".to_string(),
        limit: 5,
        namespace: Some(NamespaceFilter {
            eq: "test".to_string(),
        }),
    };
    let count = client
        .search(&query)
        .await
        .map_err(|e| format!("Search failed: {e}"))?;
    Ok((
        true,
        format!("Found {count} memories matching 'connection test'"),
    ))
}

async fn check_working_memory(client: &MemoryApiClient) -> Result<(bool, String), String> {
    let session_id = format!("test_session_{}", unix_timestamp());
    let document = SessionDocument {
        messages: vec![
            Message {
                role: "user".to_string(),
                content: "Test message".to_string(),
            },
            Message {
                role: "assistant".to_string(),
                content: "Test response".to_string(),
            },
        ],
        context: Some("Connection test context".to_string()),
        memories: None,
        extra: serde_json::Map::new(),
    };

    let probe_key = format!("session:{session_id}");
    client
        .write_session(&probe_key, &session_id, &document)
        .await
        .map_err(|e| format!("Working memory write failed: {e}"))?;
    client
        .read_session(&session_id)
        .await
        .map_err(|e| format!("Working memory read-back failed: {e}"))?;

    Ok((true, format!("Session {session_id} created and retrieved")))
}

async fn check_latency(client: &MemoryApiClient) -> Result<(bool, String), String> {
    let mut latencies_ms = Vec::with_capacity(LATENCY_PROBES);

    for i in 0..LATENCY_PROBES {
        let started = Instant::now();
        client
            .health()
            .await
            .map_err(|e| format!("Performance probe {i} failed: {e}"))?;
        let ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!("Health probe {} took {:.1}ms", i, ms);
        latencies_ms.push(ms);
    }

    let avg = latencies_ms.iter().sum::<f64>() / latencies_ms.len() as f64;
    let min = latencies_ms.iter().copied().fold(f64::INFINITY, f64::min);
    let max = latencies_ms
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    Ok((
        avg < LATENCY_BUDGET_MS,
        format!("Avg: {avg:.1}ms, Min: {min:.1}ms, Max: {max:.1}ms"),
    ))
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_ok_result() {
        let outcome = CheckOutcome::from_result(
            "API Health",
            Instant::now(),
            Ok((true, "healthy".to_string())),
        );
        assert!(outcome.passed);
        assert_eq!(outcome.name, "API Health");
        assert_eq!(outcome.detail, "healthy");
    }

    #[test]
    fn test_outcome_from_failed_probe() {
        let outcome = CheckOutcome::from_result(
            "Performance",
            Instant::now(),
            Ok((false, "Avg: 250.0ms".to_string())),
        );
        assert!(!outcome.passed);
    }

    #[test]
    fn test_outcome_from_error() {
        let outcome = CheckOutcome::from_result(
            "Create Memory",
            Instant::now(),
            Err("Create failed: connection refused".to_string()),
        );
        assert!(!outcome.passed);
        assert!(outcome.detail.contains("connection refused"));
    }
}
