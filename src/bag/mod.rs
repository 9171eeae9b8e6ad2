//! Message sources for recorded sessions
//!
//! This module provides the seam between the extractor and the log
//! container. The extractor only needs to enumerate the messages recorded on
//! a set of topics together with their record time and serialized payload;
//! [`MessageSource`] captures exactly that, so sessions can come from ROS
//! bag files ([`RosbagSource`]) or from in-memory fixtures in tests.
//!
//! Payloads are ROS1-serialized; [`ros1`] decodes the message types the
//! pipeline consumes.

pub mod ros1;
pub mod rosbag_source;

pub use rosbag_source::{RosbagOpener, RosbagSource};

use crate::error::Result;
use std::path::Path;

/// Nanoseconds per second
pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// A single message as recorded in a session log
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    /// Topic the message was recorded on
    pub topic: String,
    /// Record time, whole seconds
    pub secs: u32,
    /// Record time, nanoseconds within the second
    pub nsecs: u32,
    /// Serialized message payload
    pub payload: Vec<u8>,
}

impl RawMessage {
    /// Create a message from a topic, record time and payload
    pub fn new(topic: impl Into<String>, secs: u32, nsecs: u32, payload: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            secs,
            nsecs,
            payload,
        }
    }

    /// Create a message from a record time in nanoseconds since the epoch
    pub fn from_nanos(topic: impl Into<String>, nanos: u64, payload: Vec<u8>) -> Self {
        Self::new(
            topic,
            (nanos / NANOS_PER_SEC) as u32,
            (nanos % NANOS_PER_SEC) as u32,
            payload,
        )
    }

    /// Record time in seconds
    pub fn record_time(&self) -> f64 {
        stamp_to_seconds(self.secs, self.nsecs)
    }
}

/// Combine a (seconds, nanoseconds) stamp into floating point seconds
pub fn stamp_to_seconds(secs: u32, nsecs: u32) -> f64 {
    secs as f64 + nsecs as f64 * 1e-9
}

/// Enumerates the messages of a recorded session
///
/// Implementations return messages in recording order. Messages on topics
/// that were not requested are never returned.
#[cfg_attr(test, mockall::automock)]
pub trait MessageSource {
    /// Human readable name of the session (usually the file name)
    fn describe(&self) -> String;

    /// Read every message recorded on one of `topics`
    fn read_messages(&mut self, topics: &[String]) -> Result<Vec<RawMessage>>;
}

/// Opens session files as message sources
///
/// Shared between worker threads, hence `Send + Sync`.
pub trait SourceOpener: Send + Sync {
    /// Open the session stored at `path`
    fn open(&self, path: &Path) -> Result<Box<dyn MessageSource>>;
}
