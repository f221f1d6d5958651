//! Record transformation into destination write payloads.
//!
//! Pure functions, no I/O. A malformed field is a transformation error
//! carrying the source key; operator data is never silently dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::source::{BlobRecord, HashRecord};

/// Memory type applied when the source record carries none.
pub const DEFAULT_MEMORY_TYPE: &str = "semantic";

/// A long-term memory write payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryWrite {
    /// Identifier carried over from the source when present. The destination
    /// upserts by id, which is what makes replay idempotent.
    pub id: Option<String>,
    /// Memory text.
    pub text: String,
    /// Memory kind tag (semantic, episodic, message).
    pub memory_type: String,
    /// Namespace. Absent in the source stays an explicit null on the wire,
    /// never a default string.
    pub namespace: Option<String>,
    /// Ordered topic labels.
    #[serde(default)]
    pub topics: Vec<String>,
    /// Ordered entity labels.
    #[serde(default)]
    pub entities: Vec<String>,
}

/// One conversation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Speaker role (user, assistant, system).
    pub role: String,
    /// Message text.
    pub content: String,
}

/// A working-memory session write payload.
///
/// The parsed source document is forwarded largely as-is; fields this tool
/// does not interpret survive via the flattened `extra` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDocument {
    /// Ordered conversation messages.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Free-text session context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Memories embedded in the session, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memories: Option<Vec<MemoryWrite>>,
    /// Fields forwarded without interpretation.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Transform a hash record into a long-term memory write.
///
/// Text, memory type and namespace are copied verbatim; topics and entities
/// are parsed from their serialized sequence form.
///
/// # Errors
///
/// Returns [`Error::Transform`] when a serialized sequence field contains
/// invalid syntax.
pub fn memory_write(record: &HashRecord) -> Result<MemoryWrite> {
    Ok(MemoryWrite {
        id: record.fields.get("id").cloned(),
        text: record.fields.get("text").cloned().unwrap_or_default(),
        memory_type: record
            .fields
            .get("memory_type")
            .cloned()
            .unwrap_or_else(|| DEFAULT_MEMORY_TYPE.to_string()),
        namespace: record.fields.get("namespace").cloned(),
        topics: parse_sequence_field(record, "topics")?,
        entities: parse_sequence_field(record, "entities")?,
    })
}

/// Transform a blob record into a session write.
///
/// The session identifier is the trailing `:`-segment of the source key.
///
/// # Errors
///
/// Returns [`Error::Transform`] when the serialized document is invalid.
pub fn session_write(record: &BlobRecord) -> Result<(String, SessionDocument)> {
    let id = session_id_from_key(&record.key);
    let document: SessionDocument =
        serde_json::from_str(&record.raw).map_err(|e| Error::Transform {
            key: record.key.clone(),
            reason: format!("invalid session document: {e}"),
        })?;
    Ok((id, document))
}

/// Extracts the session identifier from a source key.
#[must_use]
pub fn session_id_from_key(key: &str) -> String {
    key.rsplit(':').next().unwrap_or(key).to_string()
}

/// Parses a serialized string-sequence field.
///
/// A missing field is an empty sequence; present-but-malformed content is a
/// transformation error, not an empty sequence.
fn parse_sequence_field(record: &HashRecord, field: &str) -> Result<Vec<String>> {
    match record.fields.get(field) {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| Error::Transform {
            key: record.key.clone(),
            reason: format!("invalid {field} sequence {raw:?}: {e}"),
        }),
    }
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
