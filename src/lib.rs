//! # dvrk-align: ROS bag extraction and time alignment
//!
//! Parses recorded da Vinci Research Kit sessions (ROS bag files) into
//! time-aligned CSV tables. Each session carries independently timestamped
//! streams (joint state, force sensor wrench, Jacobian, Cartesian pose); the
//! pipeline rebases them onto a common origin, clamps the reference axis to
//! the span every stream covers and linearly resamples the other streams onto
//! it, so rows line up across tables.
//!
//! ## Architecture
//!
//! - **Bag**: message sources over ROS bag files and ROS1 payload decoding
//! - **Session**: extracts the configured topics into [`Channel`]s
//! - **Analysis**: origin rebasing, range clamping and per-column interpolation
//! - **Output**: CSV tables partitioned by channel kind, plus a batch manifest
//! - **Pipeline**: batch driver over a directory, optionally on a worker pool
//!
//! ## Configuration
//!
//! [`PipelineConfig`] holds every setting. It can be loaded from TOML, and
//! command-line flags are applied on top through [`config::ConfigOverrides`].
//!
//! ## Example
//!
//! ```no_run
//! use dvrk_align::{pipeline::BatchRunner, PipelineConfig};
//!
//! fn main() -> dvrk_align::Result<()> {
//!     let config = PipelineConfig {
//!         interpolate: true,
//!         ..Default::default()
//!     };
//!     let summary = BatchRunner::new(config).run()?;
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod bag;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use analysis::{AlignOptions, AlignedSession, Aligner};
pub use config::PipelineConfig;
pub use error::{AlignError, Result};
pub use output::{read_table, TableLayout};
pub use session::{Extractor, Session};
pub use types::{AlignedTable, Channel, ChannelKind};
