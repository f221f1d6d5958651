//! Tests for source store enumeration.

use super::*;

/// In-memory fake store with a configurable page size, including pages
/// smaller than requested (the SCAN contract allows either).
struct FakeStore {
    hashes: Vec<(String, HashMap<String, String>)>,
    blobs: Vec<(String, String)>,
    /// Keys listed by SCAN but already deleted at fetch time.
    ghost_keys: Vec<String>,
    page_size: usize,
}

impl FakeStore {
    fn new(page_size: usize) -> Self {
        Self {
            hashes: Vec::new(),
            blobs: Vec::new(),
            ghost_keys: Vec::new(),
            page_size,
        }
    }

    fn with_memories(mut self, n: usize) -> Self {
        for i in 0..n {
            let mut fields = HashMap::new();
            fields.insert("text".to_string(), format!("memory {i}"));
            self.hashes.push((format!("memory:{i}"), fields));
        }
        self
    }

    fn with_sessions(mut self, n: usize) -> Self {
        for i in 0..n {
            self.blobs
                .push((format!("session:{i}"), r#"{"messages":[]}"#.to_string()));
        }
        self
    }

    fn keys_matching(&self, pattern: &str) -> Vec<String> {
        let prefix = pattern.trim_end_matches('*');
        self.hashes
            .iter()
            .map(|(k, _)| k.clone())
            .chain(self.blobs.iter().map(|(k, _)| k.clone()))
            .chain(self.ghost_keys.iter().cloned())
            .filter(|k| k.starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl SourceStore for FakeStore {
    async fn scan_page(
        &mut self,
        pattern: &str,
        cursor: ScanCursor,
        _count: usize,
    ) -> Result<(ScanCursor, Vec<String>)> {
        let all = self.keys_matching(pattern);
        let start = match cursor {
            ScanCursor::NotStarted => 0,
            ScanCursor::InProgress(c) => c as usize,
            ScanCursor::Done => panic!("scan_page called after Done"),
        };
        let end = (start + self.page_size).min(all.len());
        let keys = all[start..end].to_vec();
        let next = if end >= all.len() {
            ScanCursor::Done
        } else {
            ScanCursor::InProgress(end as u64)
        };
        Ok((next, keys))
    }

    async fn fetch_hash(&mut self, key: &str) -> Result<Option<HashMap<String, String>>> {
        Ok(self
            .hashes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, f)| f.clone()))
    }

    async fn fetch_blob(&mut self, key: &str) -> Result<Option<String>> {
        Ok(self
            .blobs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()))
    }
}

#[test]
fn test_cursor_fresh_scan_is_not_done() {
    let cursor = ScanCursor::NotStarted;
    assert!(!cursor.is_done());
    assert_eq!(cursor.wire(), 0);
}

#[test]
fn test_cursor_zero_means_done_only_after_round_trip() {
    assert_eq!(ScanCursor::advance(0), ScanCursor::Done);
    assert_eq!(ScanCursor::advance(42), ScanCursor::InProgress(42));
    assert!(ScanCursor::advance(0).is_done());
    assert!(!ScanCursor::advance(42).is_done());
}

#[test]
fn test_cursor_in_progress_wire_value() {
    assert_eq!(ScanCursor::InProgress(17).wire(), 17);
}

#[tokio::test]
async fn test_scan_hash_records_exhaustive_page_size_1() {
    let mut store = FakeStore::new(1).with_memories(5).with_sessions(3);
    let records = scan_hash_records(&mut store, MEMORY_PREFIX, 100)
        .await
        .unwrap();
    assert_eq!(records.len(), 5);
}

#[tokio::test]
async fn test_scan_hash_records_exhaustive_page_size_7() {
    let mut store = FakeStore::new(7).with_memories(20);
    let records = scan_hash_records(&mut store, MEMORY_PREFIX, 100)
        .await
        .unwrap();
    assert_eq!(records.len(), 20);
}

#[tokio::test]
async fn test_scan_hash_records_exhaustive_page_larger_than_total() {
    let mut store = FakeStore::new(1000).with_memories(4);
    let records = scan_hash_records(&mut store, MEMORY_PREFIX, 100)
        .await
        .unwrap();
    assert_eq!(records.len(), 4);
}

#[tokio::test]
async fn test_scan_blob_records_exhaustive() {
    for page_size in [1, 7, 1000] {
        let mut store = FakeStore::new(page_size).with_memories(5).with_sessions(9);
        let records = scan_blob_records(&mut store, SESSION_PREFIX, 100)
            .await
            .unwrap();
        assert_eq!(records.len(), 9, "page_size={page_size}");
    }
}

#[tokio::test]
async fn test_scan_separates_record_families() {
    let mut store = FakeStore::new(3).with_memories(6).with_sessions(4);
    let memories = scan_hash_records(&mut store, MEMORY_PREFIX, 100)
        .await
        .unwrap();
    let sessions = scan_blob_records(&mut store, SESSION_PREFIX, 100)
        .await
        .unwrap();
    assert_eq!(memories.len(), 6);
    assert_eq!(sessions.len(), 4);
    assert!(memories.iter().all(|r| r.key.starts_with("memory:")));
    assert!(sessions.iter().all(|r| r.key.starts_with("session:")));
}

#[tokio::test]
async fn test_scan_skips_key_deleted_between_list_and_fetch() {
    let mut store = FakeStore::new(100).with_memories(2);
    store.ghost_keys.push("memory:deleted".to_string());

    let records = scan_hash_records(&mut store, MEMORY_PREFIX, 100)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_scan_preserves_enumeration_order() {
    let mut store = FakeStore::new(2).with_memories(5);
    let records = scan_hash_records(&mut store, MEMORY_PREFIX, 100)
        .await
        .unwrap();
    let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["memory:0", "memory:1", "memory:2", "memory:3", "memory:4"]
    );
}
