//! Piecewise-linear interpolation over sampled channels
//!
//! Interpolants never extrapolate: evaluating outside the sampled span is an
//! [`AlignError::OutOfRange`] error. Callers clamp their query axis first.

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{AlignError, Result};
use crate::types::Channel;

/// Linear interpolant over one value column
///
/// Knots must be sorted non-decreasing. Where consecutive knots share a
/// timestamp the left (earlier) sample wins.
#[derive(Debug, Clone, Copy)]
pub struct LinearInterpolator<'a> {
    xs: &'a [f64],
    ys: ArrayView1<'a, f64>,
}

impl<'a> LinearInterpolator<'a> {
    /// Fit an interpolant; returns `None` with fewer than two knots or
    /// mismatched lengths
    pub fn new(xs: &'a [f64], ys: ArrayView1<'a, f64>) -> Option<Self> {
        if xs.len() < 2 || xs.len() != ys.len() {
            return None;
        }
        Some(Self { xs, ys })
    }

    /// Sampled span as (min, max)
    pub fn domain(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    /// Evaluate at a single point
    pub fn evaluate(&self, x: f64) -> Result<f64> {
        let (min, max) = self.domain();
        if !(min..=max).contains(&x) {
            return Err(AlignError::OutOfRange { query: x, min, max });
        }

        // First knot at or after x
        let hi = self.xs.partition_point(|&t| t < x);
        if self.xs[hi] == x {
            return Ok(self.ys[hi]);
        }

        // xs[hi - 1] < x < xs[hi], so the segment has non-zero length
        let (x1, x2) = (self.xs[hi - 1], self.xs[hi]);
        let (y1, y2) = (self.ys[hi - 1], self.ys[hi]);
        let t = (x - x1) / (x2 - x1);
        Ok(y1 + t * (y2 - y1))
    }

    /// Evaluate at every query point
    pub fn evaluate_many(&self, query: &[f64]) -> Result<Array1<f64>> {
        query
            .iter()
            .map(|&x| self.evaluate(x))
            .collect::<Result<Vec<_>>>()
            .map(Array1::from)
    }
}

/// Resample every value column of `channel` onto `query`
///
/// Each column is interpolated independently over the channel's own
/// timestamps. The result has one row per query point.
pub fn resample(channel: &Channel, query: &[f64]) -> Result<Array2<f64>> {
    if channel.len() < 2 {
        return Err(AlignError::InsufficientSamples {
            channel: channel.kind.name().to_string(),
            count: channel.len(),
        });
    }

    let xs = channel.timestamp_slice();
    let values = channel.values();
    let mut out = Array2::zeros((query.len(), channel.width()));

    for (column, mut target) in values.columns().into_iter().zip(out.columns_mut()) {
        let interp = LinearInterpolator::new(xs, column).ok_or_else(|| {
            AlignError::InsufficientSamples {
                channel: channel.kind.name().to_string(),
                count: channel.len(),
            }
        })?;
        target.assign(&interp.evaluate_many(query)?);
    }

    Ok(out)
}
