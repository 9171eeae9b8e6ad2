//! dvrk-align - Main Entry Point
//!
//! Extracts joint state, wrench, Jacobian and Cartesian pose streams from a
//! folder of ROS bag recordings and writes them as time-aligned CSV tables.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use dvrk_align::{
    config::{ConfigOverrides, PipelineConfig, TimeSource},
    pipeline::BatchRunner,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Parse dVRK ROS bag recordings into aligned CSV tables
#[derive(Parser, Debug)]
#[command(name = "dvrk-align")]
#[command(version)]
#[command(about = "Parse dVRK ROS bag recordings into time-aligned CSV tables")]
struct Cli {
    /// Folder containing the bag files
    #[arg(short, long)]
    folder: Option<PathBuf>,

    /// Folder to write the parsed CSV tables to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Prefix for the output CSV names
    #[arg(long)]
    prefix: Option<String>,

    /// Index of the first written session
    #[arg(long)]
    index: Option<usize>,

    /// Resample every stream onto the force sensor's timestamps
    #[arg(long)]
    interpolate: bool,

    /// TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of sessions processed in parallel
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Timestamp source: `record` (bag record time) or `header` (message stamp)
    #[arg(long)]
    time_source: Option<TimeSource>,

    /// Write a column-name header row
    #[arg(long)]
    header: bool,

    /// Do not write the batch manifest
    #[arg(long)]
    no_manifest: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input_dir: self.folder.clone(),
            output_dir: self.output.clone(),
            prefix: self.prefix.clone(),
            start_index: self.index,
            interpolate: self.interpolate,
            jobs: self.jobs,
            time_source: self.time_source,
            write_header: self.header,
            skip_manifest: self.no_manifest,
        }
    }

    fn filter(&self) -> EnvFilter {
        match self.verbose {
            0 => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,dvrk_align=debug")),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The guard flushes the file writer on drop, keep it until exit
    let mut _log_guard = None;
    let file_layer = match cli.log_file {
        Some(ref path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {:?}", path))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            _log_guard = Some(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(cli.filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    let config = match cli.config {
        Some(ref path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    }
    .apply(&cli.overrides());
    config.validate()?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    tracing::info!(
        "Parsing {:?} into {:?} (interpolate: {}, jobs: {})",
        config.input_dir,
        config.output_dir,
        config.interpolate,
        config.jobs
    );

    let started = Instant::now();
    let summary = BatchRunner::new(config).run()?;

    tracing::info!("Parsing complete: {}", summary);
    for skipped in &summary.skipped {
        tracing::warn!("Skipped {}: {}", skipped.source, skipped.error);
    }
    if let Some(ref manifest) = summary.manifest {
        tracing::info!("Manifest written to {:?}", manifest);
    }
    tracing::info!("Elapsed time: {:.2}s", started.elapsed().as_secs_f64());

    Ok(())
}
