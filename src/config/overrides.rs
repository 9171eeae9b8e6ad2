//! Command-line overrides applied on top of a loaded configuration
//!
//! Every field is optional; only the values the user actually passed replace
//! the corresponding [`PipelineConfig`] entry.

use super::{PipelineConfig, TimeSource};
use std::path::PathBuf;

/// Values passed on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub prefix: Option<String>,
    pub start_index: Option<usize>,
    /// `--interpolate` can only switch resampling on
    pub interpolate: bool,
    pub jobs: Option<usize>,
    pub time_source: Option<TimeSource>,
    /// `--header` can only switch the header row on
    pub write_header: bool,
    /// `--no-manifest`
    pub skip_manifest: bool,
}

impl ConfigOverrides {
    /// Replace the fields of `config` that were overridden
    pub fn apply_to(&self, config: &mut PipelineConfig) {
        if let Some(ref dir) = self.input_dir {
            config.input_dir = dir.clone();
        }
        if let Some(ref dir) = self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(ref prefix) = self.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(index) = self.start_index {
            config.start_index = index;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if let Some(source) = self.time_source {
            config.time_source = source;
        }
        config.interpolate |= self.interpolate;
        config.write_header |= self.write_header;
        if self.skip_manifest {
            config.write_manifest = false;
        }
    }
}
