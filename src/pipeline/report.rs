//! Batch reporting

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::output::{SkippedEntry, WrittenTable};
use crate::types::ChannelKind;

/// Outcome of one written session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    /// Output index the session was written under
    pub index: usize,
    /// Source file name
    pub source: String,
    pub reference: ChannelKind,
    pub origin: f64,
    pub tables: Vec<WrittenTable>,
}

impl SessionReport {
    pub fn table(&self, kind: ChannelKind) -> Option<&WrittenTable> {
        self.tables.iter().find(|t| t.kind == kind)
    }
}

/// Outcome of a whole batch
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub elapsed: Duration,
    /// Session files found in the input directory
    pub discovered: usize,
    pub sessions: Vec<SessionReport>,
    pub skipped: Vec<SkippedEntry>,
    pub manifest: Option<PathBuf>,
}

impl BatchSummary {
    pub fn processed(&self) -> usize {
        self.sessions.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn tables_written(&self) -> usize {
        self.sessions.iter().map(|s| s.tables.len()).sum()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {} of {} session(s), skipped {}, wrote {} table(s) in {:.2}s",
            self.processed(),
            self.discovered,
            self.skipped_count(),
            self.tables_written(),
            self.elapsed.as_secs_f64()
        )
    }
}
