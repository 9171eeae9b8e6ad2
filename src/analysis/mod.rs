//! Time alignment and resampling
//!
//! This module provides the core of the pipeline:
//! - [`interp`]: per-column piecewise-linear interpolation that refuses to extrapolate
//! - [`align`]: origin rebasing, reference selection, range clamping and resampling

pub mod align;
pub mod interp;

pub use align::{intersect_ranges, AlignOptions, AlignedSession, Aligner, TimeWindow};
pub use interp::{resample, LinearInterpolator};
