//! Batch manifest
//!
//! Records which source file each output index came from, so downstream
//! consumers can map `bag_<n>` back to a recording. Skipped sessions are listed
//! with the reason they were skipped.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::WrittenTable;
use crate::error::{AlignError, Result};
use crate::types::ChannelKind;

/// Manifest of one batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchManifest {
    /// When the batch finished
    pub generated_at: DateTime<Utc>,
    pub input_dir: String,
    pub prefix: String,
    pub interpolate: bool,
    /// Written sessions in index order
    pub sessions: Vec<ManifestEntry>,
    #[serde(default)]
    pub skipped: Vec<SkippedEntry>,
}

/// One written session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub index: usize,
    pub source: String,
    pub reference: ChannelKind,
    /// Absolute time subtracted from every channel, in seconds
    pub origin: f64,
    pub tables: BTreeMap<ChannelKind, TableSummary>,
}

/// Shape of one written table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: usize,
}

impl From<&WrittenTable> for TableSummary {
    fn from(table: &WrittenTable) -> Self {
        Self {
            rows: table.rows,
            columns: table.columns,
        }
    }
}

/// One session that produced no output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub source: String,
    pub error: String,
}

impl BatchManifest {
    pub fn new(input_dir: impl AsRef<Path>, prefix: impl Into<String>, interpolate: bool) -> Self {
        Self {
            generated_at: Utc::now(),
            input_dir: input_dir.as_ref().display().to_string(),
            prefix: prefix.into(),
            interpolate,
            sessions: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Source file of an output index
    pub fn source_of(&self, index: usize) -> Option<&str> {
        self.sessions
            .iter()
            .find(|entry| entry.index == index)
            .map(|entry| entry.source.as_str())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| AlignError::Serialization(e.to_string()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AlignError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
