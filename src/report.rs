//! Console reporting for migration results and diagnostics.
//!
//! Rendering is split from printing so core logic and tests never touch
//! global console state: `render_*` produce plain strings, the `Reporter`
//! owns the terminal and writes them.

use console::{style, Style, Term};

use crate::doctor::CheckOutcome;
use crate::pipeline::MigrationStats;

/// Renders the final migration summary table as plain text.
#[must_use]
pub fn render_summary(stats: &MigrationStats) -> String {
    let mut out = String::from("┌──────────────────────┬──────────┐\n");
    for (metric, count) in [
        ("Memories Migrated", stats.memories_migrated),
        ("Sessions Migrated", stats.sessions_migrated),
        ("Errors", stats.errors),
    ] {
        out.push_str(&format!("│ {metric:<20} │ {count:>8} │\n"));
    }
    out.push_str("├──────────────────────┼──────────┤\n");
    out.push_str(&format!(
        "│ {:<20} │ {:>8} │\n",
        "Total Items",
        stats.total_migrated()
    ));
    out.push_str("└──────────────────────┴──────────┘");
    out
}

/// Renders diagnostic check outcomes as plain text rows.
#[must_use]
pub fn render_checks(outcomes: &[CheckOutcome]) -> String {
    let mut rows = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let status = if outcome.passed { "PASS" } else { "FAIL" };
        rows.push(format!(
            "  {:<20} {:<6} {} ({:.2}s)",
            outcome.name,
            status,
            outcome.detail,
            outcome.elapsed.as_secs_f64()
        ));
    }
    rows.join("\n")
}

/// Console reporter for the CLI.
pub struct Reporter {
    term: Term,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter {
    /// Creates a reporter writing to stdout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    /// Prints the migration summary table and closing status line.
    pub fn print_summary(&self, stats: &MigrationStats) {
        let cyan = Style::new().cyan().bold();

        self.write_line("");
        self.write_line(&cyan.apply_to("Migration Results").to_string());
        self.write_line(&render_summary(stats));
        self.write_line("");

        if stats.is_clean() {
            self.write_line(&format!(
                "{} Migration completed successfully!",
                style("✅").green().bold()
            ));
        } else {
            self.write_line(&format!(
                "{} Migration completed with {} error(s). Please review logs.",
                style("⚠").yellow().bold(),
                stats.errors
            ));
        }
    }

    /// Prints diagnostic check outcomes and a pass/fail tally.
    pub fn print_checks(&self, outcomes: &[CheckOutcome]) {
        let bold = Style::new().bold();

        self.write_line("");
        self.write_line(&bold.apply_to("Connection Test Results").to_string());
        self.write_line(&render_checks(outcomes));
        self.write_line("");

        let passed = outcomes.iter().filter(|o| o.passed).count();
        if passed == outcomes.len() {
            self.write_line(&format!(
                "{} All tests passed! ({passed}/{})",
                style("✅").green().bold(),
                outcomes.len()
            ));
        } else {
            self.write_line(&format!(
                "{} {passed}/{} tests passed",
                style("⚠").yellow().bold(),
                outcomes.len()
            ));
        }
    }

    fn write_line(&self, line: &str) {
        // A closed stdout is not worth failing a finished migration over.
        let _ = self.term.write_line(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_render_summary_counts() {
        let stats = MigrationStats {
            memories_migrated: 12,
            sessions_migrated: 4,
            errors: 1,
        };
        let out = render_summary(&stats);
        assert!(out.contains("Memories Migrated"));
        assert!(out.contains("12"));
        assert!(out.contains("Total Items"));
        assert!(out.contains("16"));
    }

    #[test]
    fn test_render_checks_status() {
        let outcomes = vec![
            CheckOutcome {
                name: "API Health".to_string(),
                passed: true,
                detail: "version 0.9.1".to_string(),
                elapsed: Duration::from_millis(20),
            },
            CheckOutcome {
                name: "Search Memory".to_string(),
                passed: false,
                detail: "HTTP 500".to_string(),
                elapsed: Duration::from_millis(5),
            },
        ];
        let out = render_checks(&outcomes);
        assert!(out.contains("API Health"));
        assert!(out.contains("PASS"));
        assert!(out.contains("FAIL"));
    }

    #[test]
    fn test_render_summary_is_complete_table() {
        let rendered = render_summary(&MigrationStats::default());
        assert!(rendered.starts_with('┌'));
        assert!(rendered.ends_with('┘'));
        assert_eq!(rendered.lines().count(), 7);
    }
}
