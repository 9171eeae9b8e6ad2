//! Batch pipeline
//!
//! Session files flow through three stages:
//!
//! ```text
//! [session file] ──► [Extractor] ──► [Aligner] ──► [TableWriter]
//!                     raw channels    aligned tables   <output>/<kind>/<prefix><n>.csv
//! ```
//!
//! # Design
//!
//! - **Sorted input** - sessions are processed in sorted-filename order.
//! - **Dense indices** - only written sessions consume an output index.
//! - **Isolation** - session-local errors skip the session, the batch continues.
//! - **Optional worker pool** - with `jobs > 1` extraction and alignment run on
//!   worker threads; results are written in input order, so output matches
//!   a serial run.

pub mod batch;
pub mod executor;
pub mod report;

pub use batch::{discover_sessions, BatchRunner};
pub use executor::run_ordered;
pub use report::{BatchSummary, SessionReport};
