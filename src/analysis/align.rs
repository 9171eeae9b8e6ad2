//! Session alignment
//!
//! Rebases every channel of a session onto the joint-state origin, picks the
//! reference axis, clamps it to the span every donor channel covers and
//! resamples the donors onto it.
//!
//! Which channel is the reference depends on [`AlignOptions::interpolate`]:
//!
//! | interpolate | wrench samples | reference   | donors                          |
//! |-------------|----------------|-------------|---------------------------------|
//! | on          | yes            | wrench      | joint state, Jacobian, Cartesian|
//! | on          | no             | joint state | Jacobian, Cartesian             |
//! | off         | any            | joint state | Jacobian, Cartesian             |
//!
//! With the joint-state reference, a non-empty wrench channel is written at
//! its own rebased timestamps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::interp::resample;
use crate::error::{AlignError, Result, ResultExt};
use crate::session::Session;
use crate::types::{AlignedTable, Channel, ChannelKind};

/// Alignment settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignOptions {
    /// Resample onto the wrench axis when wrench samples exist
    pub interpolate: bool,
}

/// Closed time interval `[start, end]`; empty when `start > end`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Window spanned by a channel's samples
    pub fn of(channel: &Channel) -> Option<Self> {
        channel
            .time_range()
            .map(|(start, end)| Self::new(start, end))
    }

    /// Narrow this window to the part shared with `other`
    pub fn intersect(self, other: TimeWindow) -> TimeWindow {
        TimeWindow {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        }
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Intersect a sequence of windows, `None` for an empty sequence
pub fn intersect_ranges(windows: impl IntoIterator<Item = TimeWindow>) -> Option<TimeWindow> {
    windows.into_iter().reduce(TimeWindow::intersect)
}

/// A session with every produced channel on its output axis
#[derive(Debug, Clone)]
pub struct AlignedSession {
    /// Session name (file name)
    pub name: String,
    /// Absolute time subtracted from every channel
    pub origin: f64,
    /// Channel whose timestamps form the output axis
    pub reference: ChannelKind,
    /// Clamp window applied to the reference axis
    pub window: TimeWindow,
    /// Produced tables; absent channels have no entry
    pub tables: BTreeMap<ChannelKind, AlignedTable>,
}

impl AlignedSession {
    pub fn table(&self, kind: ChannelKind) -> Option<&AlignedTable> {
        self.tables.get(&kind)
    }

    /// Rows on the reference axis after clamping
    pub fn rows(&self) -> usize {
        self.table(self.reference).map_or(0, AlignedTable::rows)
    }
}

/// Aligns sessions onto a single reference axis
#[derive(Debug, Clone, Copy, Default)]
pub struct Aligner {
    options: AlignOptions,
}

impl Aligner {
    pub fn new(options: AlignOptions) -> Self {
        Self { options }
    }

    /// The channel whose timestamps become the output axis of `session`
    pub fn reference_kind(&self, session: &Session) -> ChannelKind {
        if self.options.interpolate && session.has_samples(ChannelKind::Wrench) {
            ChannelKind::Wrench
        } else {
            ChannelKind::JointState
        }
    }

    /// Channels resampled onto the given reference, in clamp order
    pub fn donors(reference: ChannelKind) -> &'static [ChannelKind] {
        match reference {
            ChannelKind::Wrench => &[
                ChannelKind::JointState,
                ChannelKind::Jacobian,
                ChannelKind::Cartesian,
            ],
            _ => &[ChannelKind::Jacobian, ChannelKind::Cartesian],
        }
    }

    /// Align one session
    ///
    /// Fails with [`AlignError::EmptyReference`] when the joint-state channel
    /// (or the chosen reference) has no samples and with
    /// [`AlignError::InsufficientSamples`] when a donor has a single sample.
    /// Donors that are disabled or recorded no messages are left out.
    pub fn align(&self, mut session: Session) -> Result<AlignedSession> {
        let origin = session.rebase()?;
        let reference_kind = self.reference_kind(&session);

        let mut reference = session
            .take(reference_kind)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AlignError::EmptyReference {
                channel: reference_kind.name().to_string(),
            })?;

        let mut donors = Vec::new();
        for &kind in Self::donors(reference_kind) {
            match session.take(kind) {
                None => {}
                Some(channel) if channel.is_empty() => {
                    tracing::debug!("{}: no {} samples, not produced", session.name, kind);
                }
                Some(channel) if channel.len() < 2 => {
                    return Err(AlignError::InsufficientSamples {
                        channel: kind.name().to_string(),
                        count: channel.len(),
                    });
                }
                Some(channel) => donors.push(channel),
            }
        }

        // Progressive clamp: each donor narrows the usable window
        let mut window = TimeWindow::of(&reference).ok_or_else(|| AlignError::EmptyReference {
            channel: reference_kind.name().to_string(),
        })?;
        for donor in &donors {
            if let Some(span) = TimeWindow::of(donor) {
                window = window.intersect(span);
                tracing::trace!(
                    "{}: after {} window is [{:.6}, {:.6}]",
                    session.name,
                    donor.kind,
                    window.start,
                    window.end
                );
            }
        }

        let before = reference.len();
        reference.retain_window(window.start, window.end);
        if reference.is_empty() {
            tracing::warn!(
                "{}: channel ranges do not overlap, {} axis clamped to zero rows",
                session.name,
                reference_kind
            );
        } else if reference.len() < before {
            tracing::debug!(
                "{}: clamped {} axis from {} to {} rows",
                session.name,
                reference_kind,
                before,
                reference.len()
            );
        }

        let mut tables = BTreeMap::new();
        for donor in &donors {
            let values = resample(donor, reference.timestamp_slice())
                .with_context(|| format!("{}: resampling {}", session.name, donor.kind))?;
            let table = AlignedTable::from_parts(donor.kind, reference.timestamps(), values.view())?;
            tables.insert(donor.kind, table);
        }
        tables.insert(reference_kind, AlignedTable::from_channel(&reference)?);

        // Whatever is left was not part of the clamp set and keeps its own axis
        for kind in ChannelKind::all() {
            if let Some(channel) = session.take(*kind) {
                if !channel.is_empty() {
                    tables.insert(*kind, AlignedTable::from_channel(&channel)?);
                }
            }
        }

        Ok(AlignedSession {
            name: session.name,
            origin,
            reference: reference_kind,
            window,
            tables,
        })
    }
}
