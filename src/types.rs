//! Core data types for dvrk-align
//!
//! This module contains the fundamental data structures used throughout
//! the crate for representing extracted sensor streams and their aligned
//! tabular form.
//!
//! # Main Types
//!
//! - [`ChannelKind`] - The four stream kinds recorded per session
//! - [`Channel`] - An independently timestamped stream of fixed-width vectors
//! - [`ChannelBuilder`] - Streaming accumulator that materializes a [`Channel`]
//! - [`AlignedTable`] - A resampled channel: time column followed by values
//!
//! # Memory Layout
//!
//! Channels are stored columnar: one `Vec<f64>` of timestamps and one
//! row-major `Array2<f64>` of values (one row per sample). Aligned tables
//! are a single `Array2<f64>` whose first column is the shared time axis.

use ndarray::{concatenate, s, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{AlignError, Result};

/// Number of joints on a dVRK patient side manipulator
pub const PSM_JOINT_COUNT: usize = 6;

/// The kind of a recorded channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Joint position, velocity and effort
    JointState,
    /// Force/torque sensor reading
    Wrench,
    /// Manipulator Jacobian
    Jacobian,
    /// Cartesian tool-tip pose
    Cartesian,
}

impl ChannelKind {
    /// Get all channel kinds in output order
    pub fn all() -> &'static [ChannelKind] {
        &[
            ChannelKind::JointState,
            ChannelKind::Wrench,
            ChannelKind::Jacobian,
            ChannelKind::Cartesian,
        ]
    }

    /// Stable identifier used in logs and manifests
    pub fn name(&self) -> &'static str {
        match self {
            ChannelKind::JointState => "joint_state",
            ChannelKind::Wrench => "wrench",
            ChannelKind::Jacobian => "jacobian",
            ChannelKind::Cartesian => "cartesian",
        }
    }

    /// Output directory this kind is partitioned into
    pub fn output_dir(&self) -> &'static str {
        match self {
            ChannelKind::JointState => "joints",
            ChannelKind::Wrench => "sensor",
            ChannelKind::Jacobian => "jacobian",
            ChannelKind::Cartesian => "cartesian",
        }
    }

    /// Default value width for this kind
    pub fn default_width(&self) -> usize {
        match self {
            ChannelKind::JointState => 3 * PSM_JOINT_COUNT,
            ChannelKind::Wrench => 3,
            ChannelKind::Jacobian => PSM_JOINT_COUNT * PSM_JOINT_COUNT,
            ChannelKind::Cartesian => 3,
        }
    }

    /// Column names of a table of this kind, time column included
    pub fn column_names(&self, width: usize) -> Vec<String> {
        let mut names = Vec::with_capacity(width + 1);
        names.push("time".to_string());

        match self {
            ChannelKind::JointState if width % 3 == 0 => {
                let joints = width / 3;
                for field in ["position", "velocity", "effort"] {
                    names.extend((0..joints).map(|j| format!("{}_{}", field, j)));
                }
            }
            ChannelKind::Wrench if width == 3 => {
                names.extend(["force_x", "force_y", "force_z"].map(String::from));
            }
            ChannelKind::Cartesian if width == 3 => {
                names.extend(["x", "y", "z"].map(String::from));
            }
            ChannelKind::Jacobian if width > 0 && width % PSM_JOINT_COUNT == 0 => {
                let rows = width / PSM_JOINT_COUNT;
                for r in 0..rows {
                    names.extend((0..PSM_JOINT_COUNT).map(|c| format!("j_{}_{}", r, c)));
                }
            }
            _ => names.extend((0..width).map(|i| format!("value_{}", i))),
        }

        names
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An independently timestamped stream of fixed-width value vectors
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// What this channel carries
    pub kind: ChannelKind,
    /// Topic the channel was extracted from
    pub topic: String,
    /// Sample timestamps in seconds, non-decreasing
    timestamps: Vec<f64>,
    /// One row per sample
    values: Array2<f64>,
}

impl Channel {
    /// Create a channel from timestamps and a value matrix with one row per sample
    pub fn new(
        kind: ChannelKind,
        topic: impl Into<String>,
        timestamps: Vec<f64>,
        values: Array2<f64>,
    ) -> Result<Self> {
        let topic = topic.into();
        if timestamps.len() != values.nrows() {
            return Err(AlignError::WidthMismatch {
                channel: kind.name().to_string(),
                expected: timestamps.len(),
                found: values.nrows(),
            });
        }
        Ok(Self {
            kind,
            topic,
            timestamps,
            values,
        })
    }

    /// Create a channel with no samples
    pub fn empty(kind: ChannelKind, topic: impl Into<String>, width: usize) -> Self {
        Self {
            kind,
            topic: topic.into(),
            timestamps: Vec::new(),
            values: Array2::zeros((0, width)),
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the channel has no samples
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Number of values per sample
    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    /// Sample timestamps
    pub fn timestamps(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(self.timestamps.as_slice())
    }

    /// Sample timestamps as a contiguous slice
    pub fn timestamp_slice(&self) -> &[f64] {
        &self.timestamps
    }

    /// Sample values, one row per sample
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// First timestamp, if any
    pub fn first_timestamp(&self) -> Option<f64> {
        self.timestamps.first().copied()
    }

    /// Sampled time span as (start, end)
    pub fn time_range(&self) -> Option<(f64, f64)> {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(&start), Some(&end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Shift every timestamp so that `origin` becomes zero
    pub fn rebase(&mut self, origin: f64) {
        self.timestamps.iter_mut().for_each(|t| *t -= origin);
    }

    /// Keep only the samples whose timestamps fall in `[start, end]`
    ///
    /// Timestamps are sorted, so the retained samples form one contiguous run.
    pub fn retain_window(&mut self, start: f64, end: f64) {
        let lo = self.timestamps.partition_point(|&t| t < start);
        let hi = self.timestamps.partition_point(|&t| t <= end).max(lo);
        if lo == 0 && hi == self.len() {
            return;
        }
        self.timestamps = self.timestamps[lo..hi].to_vec();
        self.values = self.values.slice(s![lo..hi, ..]).to_owned();
    }
}

/// Streaming accumulator for a channel's samples
///
/// Samples are appended into flat buffers; [`ChannelBuilder::finish`]
/// materializes them into the columnar [`Channel`] representation.
#[derive(Debug)]
pub struct ChannelBuilder {
    kind: ChannelKind,
    topic: String,
    expected_width: Option<usize>,
    width: Option<usize>,
    timestamps: Vec<f64>,
    values: Vec<f64>,
}

impl ChannelBuilder {
    /// Create a builder; `expected_width` pins the width every sample must have
    pub fn new(kind: ChannelKind, topic: impl Into<String>, expected_width: Option<usize>) -> Self {
        Self {
            kind,
            topic: topic.into(),
            expected_width,
            width: expected_width,
            timestamps: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Reserve room for `additional` more samples
    pub fn reserve(&mut self, additional: usize) {
        self.timestamps.reserve(additional);
        if let Some(width) = self.width {
            self.values.reserve(additional * width);
        }
    }

    /// Number of samples pushed so far
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if no samples were pushed
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Append one sample
    ///
    /// The first sample fixes the width when none was configured.
    pub fn push(&mut self, timestamp: f64, values: &[f64]) -> Result<()> {
        match self.width {
            Some(width) if width != values.len() => {
                return Err(AlignError::WidthMismatch {
                    channel: self.kind.name().to_string(),
                    expected: width,
                    found: values.len(),
                });
            }
            Some(_) => {}
            None => self.width = Some(values.len()),
        }

        self.timestamps.push(timestamp);
        self.values.extend_from_slice(values);
        Ok(())
    }

    /// Materialize the accumulated samples
    pub fn finish(self) -> Result<Channel> {
        let width = self.width.or(self.expected_width).unwrap_or(0);
        let rows = self.timestamps.len();

        let sorted = self.timestamps.windows(2).all(|w| w[0] <= w[1]);
        let (timestamps, values) = if sorted {
            (self.timestamps, self.values)
        } else {
            tracing::debug!(
                "Channel '{}' on {} arrived out of order, sorting {} samples",
                self.kind,
                self.topic,
                rows
            );
            let mut order: Vec<usize> = (0..rows).collect();
            order.sort_by(|&a, &b| self.timestamps[a].total_cmp(&self.timestamps[b]));
            let timestamps = order.iter().map(|&i| self.timestamps[i]).collect();
            let values = order
                .iter()
                .flat_map(|&i| self.values[i * width..(i + 1) * width].iter().copied())
                .collect();
            (timestamps, values)
        };

        let found = values.len();
        let values = Array2::from_shape_vec((rows, width), values).map_err(|_| {
            AlignError::WidthMismatch {
                channel: self.kind.name().to_string(),
                expected: rows * width,
                found,
            }
        })?;

        Channel::new(self.kind, self.topic, timestamps, values)
    }
}

/// A channel resampled onto a session's reference axis
///
/// Column 0 is the time axis, the remaining columns are the channel values.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    /// Which channel this table holds
    pub kind: ChannelKind,
    data: Array2<f64>,
}

impl AlignedTable {
    /// Build a table by stacking the time axis in front of the values
    pub fn from_parts<'a>(
        kind: ChannelKind,
        time: ArrayView1<'a, f64>,
        values: ArrayView2<'a, f64>,
    ) -> Result<Self> {
        if time.len() != values.nrows() {
            return Err(AlignError::WidthMismatch {
                channel: kind.name().to_string(),
                expected: time.len(),
                found: values.nrows(),
            });
        }
        let time_column = time.insert_axis(Axis(1));
        let data = concatenate(Axis(1), &[time_column, values]).map_err(|e| {
            AlignError::Serialization(format!("Failed to stack {} table: {}", kind, e))
        })?;
        Ok(Self { kind, data })
    }

    /// Build a table from a channel's own timestamps and values
    pub fn from_channel(channel: &Channel) -> Result<Self> {
        Self::from_parts(channel.kind, channel.timestamps(), channel.values())
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns, time column included
    pub fn columns(&self) -> usize {
        self.data.ncols()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// The time column
    pub fn time(&self) -> ArrayView1<'_, f64> {
        self.data.column(0)
    }

    /// The value columns
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.data.slice(s![.., 1..])
    }

    /// The full matrix
    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }
}
