//! Migration pipeline orchestration.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::MigrationConfig;
use crate::destination::MemoryApiClient;
use crate::error::Result;
use crate::source::{
    scan_blob_records, scan_hash_records, SourceStore, MEMORY_PREFIX, SESSION_PREFIX,
};
use crate::transform;

/// Migration statistics.
///
/// Single-owner: only the pipeline mutates it, exactly once per record,
/// and it is read once at the end for reporting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationStats {
    /// Memory records successfully written.
    pub memories_migrated: u64,
    /// Session records successfully written.
    pub sessions_migrated: u64,
    /// Records that failed to transform or write.
    pub errors: u64,
}

impl MigrationStats {
    /// Total records successfully migrated.
    #[must_use]
    pub fn total_migrated(&self) -> u64 {
        self.memories_migrated + self.sessions_migrated
    }

    /// Whether the run completed without per-record errors.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

/// Migration pipeline.
pub struct Pipeline {
    config: MigrationConfig,
    cancel: Arc<AtomicBool>,
}

impl Pipeline {
    /// Create a new migration pipeline.
    #[must_use]
    pub fn new(config: MigrationConfig) -> Self {
        Self {
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for requesting cancellation from another task (for example a
    /// Ctrl-C handler). Setting it stops dispatching new records after the
    /// in-flight write completes; partial statistics are still reported.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Run the migration.
    ///
    /// Enumerates all memory records, then all session records, then
    /// transforms and writes each in order. A single record's failure is
    /// logged and counted, never fatal. Setup-time connectivity failures
    /// (source unreachable, destination health check failing on a non-dry
    /// run) abort before any record is processed.
    ///
    /// # Errors
    ///
    /// Returns an error only for setup-time failures.
    pub async fn run<S: SourceStore>(
        &self,
        store: &mut S,
        client: &MemoryApiClient,
    ) -> Result<MigrationStats> {
        let mut stats = MigrationStats::default();
        let page_size = self.config.options.page_size;
        let dry_run = self.config.options.dry_run;

        info!("Starting memory migration");

        if dry_run {
            info!("Dry run mode - not writing to destination");
        } else {
            // Surface an unreachable destination before touching any record.
            let health = client.health().await?;
            if !health.is_healthy() {
                warn!(
                    "Destination reports status {:?}, proceeding anyway",
                    health.status
                );
            }
        }

        info!("Exporting memories from source");
        let memories = scan_hash_records(store, MEMORY_PREFIX, page_size).await?;

        info!("Exporting sessions from source");
        let sessions = scan_blob_records(store, SESSION_PREFIX, page_size).await?;

        info!(
            "Importing {} memories and {} sessions",
            memories.len(),
            sessions.len()
        );
        let progress = create_progress_bar((memories.len() + sessions.len()) as u64);

        for record in &memories {
            if self.cancelled() {
                warn!("Cancellation requested, stopping dispatch");
                break;
            }
            match transform::memory_write(record) {
                Ok(write) => {
                    if dry_run {
                        stats.memories_migrated += 1;
                    } else {
                        match client
                            .write_memories(&record.key, std::slice::from_ref(&write))
                            .await
                        {
                            Ok(()) => stats.memories_migrated += 1,
                            Err(e) => {
                                stats.errors += 1;
                                warn!("Error migrating memory {}: {}", record.key, e);
                            }
                        }
                    }
                }
                Err(e) => {
                    stats.errors += 1;
                    warn!("Error migrating memory {}: {}", record.key, e);
                }
            }
            progress.inc(1);
        }

        for record in &sessions {
            if self.cancelled() {
                warn!("Cancellation requested, stopping dispatch");
                break;
            }
            match transform::session_write(record) {
                Ok((session_id, document)) => {
                    if dry_run {
                        stats.sessions_migrated += 1;
                    } else {
                        match client
                            .write_session(&record.key, &session_id, &document)
                            .await
                        {
                            Ok(()) => stats.sessions_migrated += 1,
                            Err(e) => {
                                stats.errors += 1;
                                warn!("Error migrating session {}: {}", record.key, e);
                            }
                        }
                    }
                }
                Err(e) => {
                    stats.errors += 1;
                    warn!("Error migrating session {}: {}", record.key, e);
                }
            }
            progress.inc(1);
        }

        progress.finish_with_message("Migration complete");

        info!(
            "Migration complete: {} memories, {} sessions, {} errors",
            stats.memories_migrated, stats.sessions_migrated, stats.errors
        );

        Ok(stats)
    }
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = if total > 0 {
        ProgressBar::new(total)
    } else {
        ProgressBar::new_spinner()
    };

    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_total() {
        let stats = MigrationStats {
            memories_migrated: 7,
            sessions_migrated: 3,
            errors: 2,
        };
        assert_eq!(stats.total_migrated(), 10);
        assert!(!stats.is_clean());
    }

    #[test]
    fn test_stats_default_is_clean() {
        assert!(MigrationStats::default().is_clean());
        assert_eq!(MigrationStats::default().total_migrated(), 0);
    }
}
