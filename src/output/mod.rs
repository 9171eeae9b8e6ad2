//! Table output
//!
//! Aligned tables are written as comma-separated files partitioned by channel
//! kind and session index:
//!
//! ```text
//! <output>/joints/<prefix><index>.csv
//! <output>/sensor/<prefix><index>.csv
//! <output>/jacobian/<prefix><index>.csv
//! <output>/cartesian/<prefix><index>.csv
//! <output>/<prefix>manifest.json
//! ```

pub mod manifest;
pub mod reader;
pub mod writer;

pub use manifest::{BatchManifest, ManifestEntry, SkippedEntry, TableSummary};
pub use reader::read_table;
pub use writer::{TableWriter, WrittenTable};

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::ChannelKind;

/// Where the tables of a batch live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    root: PathBuf,
    prefix: String,
}

impl TableLayout {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Directory holding every table of one channel kind
    pub fn dir_for(&self, kind: ChannelKind) -> PathBuf {
        self.root.join(kind.output_dir())
    }

    /// File of the (channel kind, session index) pair
    pub fn path_for(&self, kind: ChannelKind, index: usize) -> PathBuf {
        self.dir_for(kind)
            .join(format!("{}{}.csv", self.prefix, index))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(format!("{}manifest.json", self.prefix))
    }

    /// Create the output root and one directory per channel kind
    ///
    /// Directories that already exist are left alone.
    pub fn ensure_dirs(&self) -> Result<()> {
        for kind in ChannelKind::all() {
            std::fs::create_dir_all(self.dir_for(*kind))?;
        }
        Ok(())
    }
}
