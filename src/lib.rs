//! # Memory Central Migration Tool
//!
//! `memcentral-migrate` is a CLI tool and library for moving agent-memory
//! data from a local Redis memory store into a centralized Memory Server
//! over its HTTP API.
//!
//! The pipeline enumerates two record families from the source without ever
//! materializing the full keyspace (cursor-based SCAN), transforms each
//! record into the destination's write payload, and replays them against the
//! server's upsert-by-id endpoints. One record's failure is counted and
//! skipped; it never aborts the run, and a re-run after a partial failure
//! creates no duplicates.
//!
//! ## Quick Start
//!
//! ```bash
//! # Preview what would be migrated
//! memcentral-migrate --source redis://localhost:16379 \
//!     --target http://memory.internal:8000 --dry-run
//!
//! # Migrate for real (prompts for confirmation)
//! memcentral-migrate --source redis://localhost:16379 \
//!     --target http://memory.internal:8000
//!
//! # Diagnose connectivity to the server
//! memcentral-migrate check --target http://memory.internal:8000
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod destination;
pub mod doctor;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod report;
pub mod source;
pub mod transform;

pub use config::{MigrationConfig, MigrationOptions};
pub use destination::MemoryApiClient;
pub use error::{Error, Result};
pub use pipeline::{MigrationStats, Pipeline};
pub use source::{RedisSource, ScanCursor, SourceStore};
pub use transform::{MemoryWrite, SessionDocument};
