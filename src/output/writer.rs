//! CSV table writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::TableLayout;
use crate::analysis::AlignedSession;
use crate::error::{AlignError, Result, ResultExt};
use crate::types::{AlignedTable, ChannelKind};

/// Record of one table written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenTable {
    pub kind: ChannelKind,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// Writes aligned tables into a [`TableLayout`]
#[derive(Debug, Clone)]
pub struct TableWriter {
    layout: TableLayout,
    write_header: bool,
}

impl TableWriter {
    pub fn new(layout: TableLayout, write_header: bool) -> Self {
        Self {
            layout,
            write_header,
        }
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Write every produced table of a session under `index`
    ///
    /// Channels without a table are skipped; nothing is written for them.
    pub fn write_session(&self, session: &AlignedSession, index: usize) -> Result<Vec<WrittenTable>> {
        let mut written = Vec::with_capacity(session.tables.len());
        for table in session.tables.values() {
            let path = self.layout.path_for(table.kind, index);
            written.push(self.write_table(table, &path)?);
        }

        tracing::info!(
            "{} -> index {}: wrote {} table(s), {} rows on {} axis",
            session.name,
            index,
            written.len(),
            session.rows(),
            session.reference
        );
        Ok(written)
    }

    /// Write one table to `path`, creating its directory if needed
    pub fn write_table(&self, table: &AlignedTable, path: &Path) -> Result<WrittenTable> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)
            .map_err(AlignError::from)
            .with_context(|| format!("Failed to create {:?}", path))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        if self.write_header {
            writer.write_record(table.kind.column_names(table.columns().saturating_sub(1)))?;
        }

        let mut record = Vec::with_capacity(table.columns());
        for row in table.data().rows() {
            record.clear();
            record.extend(row.iter().map(|v| v.to_string()));
            writer.write_record(&record)?;
        }

        let mut inner = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(e.error().kind(), e.to_string()))?;
        inner.flush()?;

        tracing::debug!("Wrote {} rows to {:?}", table.rows(), path);

        Ok(WrittenTable {
            kind: table.kind,
            path: path.to_path_buf(),
            rows: table.rows(),
            columns: table.columns(),
        })
    }
}
