//! Batch driver
//!
//! Walks a directory of session files in sorted-filename order, extracts and
//! aligns each one, and writes the resulting tables. A session that fails with
//! a session-local error is logged and skipped without consuming an output
//! index; any other error aborts the batch.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::analysis::{AlignOptions, AlignedSession, Aligner};
use crate::bag::{RosbagOpener, SourceOpener};
use crate::config::PipelineConfig;
use crate::error::{AlignError, Result, ResultExt};
use crate::output::{
    BatchManifest, ManifestEntry, SkippedEntry, TableLayout, TableSummary, TableWriter,
};
use crate::session::Extractor;

use super::executor::run_ordered;
use super::report::{BatchSummary, SessionReport};

/// List session files in `dir` with the given extension, sorted by file name
pub fn discover_sessions(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| AlignError::Io(e).with_context(format!("{:?}", dir)))?;

    let mut sessions = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy() == extension);
        if matches {
            sessions.push(path);
        }
    }

    sessions.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(sessions)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Runs the extraction and alignment pipeline over a directory
pub struct BatchRunner<O: SourceOpener = RosbagOpener> {
    config: PipelineConfig,
    opener: O,
}

impl BatchRunner<RosbagOpener> {
    /// Create a runner reading ROS bag files
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_opener(config, RosbagOpener)
    }
}

impl<O: SourceOpener> BatchRunner<O> {
    /// Create a runner with a custom session opener
    pub fn with_opener(config: PipelineConfig, opener: O) -> Self {
        Self { config, opener }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract and align a single session file
    ///
    /// The file is opened, fully read and closed before alignment starts.
    pub fn process_session(&self, path: &Path) -> Result<AlignedSession> {
        tracing::info!("Processing {}", file_name(path));

        let session = {
            let mut source = self.opener.open(path)?;
            Extractor::from_config(&self.config).extract(source.as_mut())?
        };

        let aligner = Aligner::new(AlignOptions {
            interpolate: self.config.interpolate,
        });
        aligner.align(session)
    }

    /// Process every session in the input directory
    pub fn run(&self) -> Result<BatchSummary> {
        let started = Instant::now();
        let config = &self.config;
        config.validate()?;

        let paths = discover_sessions(&config.input_dir, &config.extension)?;
        if paths.is_empty() {
            tracing::warn!(
                "No .{} files found in {:?}",
                config.extension,
                config.input_dir
            );
        } else {
            tracing::info!(
                "Found {} session(s) in {:?}",
                paths.len(),
                config.input_dir
            );
        }

        let layout = TableLayout::new(&config.output_dir, &config.prefix);
        layout.ensure_dirs().context("Failed to create output directories")?;
        let writer = TableWriter::new(layout, config.write_header);

        let mut manifest = BatchManifest::new(&config.input_dir, &config.prefix, config.interpolate);
        let mut summary = BatchSummary {
            discovered: paths.len(),
            ..Default::default()
        };
        let mut next_index = config.start_index;

        let names: Vec<String> = paths.iter().map(|p| file_name(p)).collect();
        run_ordered(
            paths,
            config.jobs,
            |path| self.process_session(&path),
            |position, result| {
                let source = names[position].clone();
                match result {
                    Ok(aligned) => {
                        let tables = writer.write_session(&aligned, next_index)?;
                        manifest.sessions.push(ManifestEntry {
                            index: next_index,
                            source: source.clone(),
                            reference: aligned.reference,
                            origin: aligned.origin,
                            tables: tables.iter().map(|t| (t.kind, TableSummary::from(t))).collect(),
                        });
                        summary.sessions.push(SessionReport {
                            index: next_index,
                            source,
                            reference: aligned.reference,
                            origin: aligned.origin,
                            tables,
                        });
                        next_index += 1;
                        Ok(())
                    }
                    Err(err) if err.is_session_local() => {
                        tracing::error!("Skipping {}: {}", source, err);
                        let entry = SkippedEntry {
                            source,
                            error: err.to_string(),
                        };
                        manifest.skipped.push(entry.clone());
                        summary.skipped.push(entry);
                        Ok(())
                    }
                    Err(err) => Err(err.with_context(format!("Batch aborted at {}", source))),
                }
            },
        )?;

        if config.write_manifest {
            let path = writer.layout().manifest_path();
            manifest.generated_at = chrono::Utc::now();
            manifest.save(&path)?;
            tracing::debug!("Wrote manifest {:?}", path);
            summary.manifest = Some(path);
        }

        summary.elapsed = started.elapsed();
        Ok(summary)
    }
}
