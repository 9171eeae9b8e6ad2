//! Error handling for dvrk-align
//!
//! This module defines the error taxonomy of the extraction and alignment
//! pipeline and a Result alias used throughout the crate.
//!
//! Errors fall into two groups. Session-local errors (unreadable bag,
//! empty reference channel, too few samples to interpolate, ...) are isolated
//! by the batch driver: the session is skipped and the batch continues.
//! Everything else (invalid configuration, output directory that cannot be
//! created) aborts the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for dvrk-align operations
#[derive(Error, Debug)]
pub enum AlignError {
    /// The session file could not be opened or its container is malformed
    #[error("Failed to read channels from {path:?}: {message}")]
    ChannelRead { path: PathBuf, message: String },

    /// The channel chosen as the output time axis has no samples
    #[error("Reference channel '{channel}' has no samples")]
    EmptyReference { channel: String },

    /// A donor channel cannot form a single interpolation segment
    #[error("Channel '{channel}' has {count} sample(s); at least 2 are required to interpolate")]
    InsufficientSamples { channel: String, count: usize },

    /// A message projected to a different width than the channel expects
    #[error("Channel '{channel}' expected {expected} values per sample, found {found}")]
    WidthMismatch {
        channel: String,
        expected: usize,
        found: usize,
    },

    /// A message payload could not be decoded
    #[error("Failed to decode message on '{topic}': {message}")]
    Decode { topic: String, message: String },

    /// An interpolant was evaluated outside its sampled span
    #[error("Query time {query} lies outside sample range [{min}, {max}]")]
    OutOfRange { query: f64, min: f64, max: f64 },

    /// Errors related to configuration loading or validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AlignError>,
    },
}

impl AlignError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AlignError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a decode error for a topic
    pub fn decode(topic: impl Into<String>, message: impl Into<String>) -> Self {
        AlignError::Decode {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Whether this error only invalidates the session it occurred in.
    ///
    /// The batch driver skips the session on these and keeps going.
    pub fn is_session_local(&self) -> bool {
        match self {
            AlignError::ChannelRead { .. }
            | AlignError::EmptyReference { .. }
            | AlignError::InsufficientSamples { .. }
            | AlignError::WidthMismatch { .. }
            | AlignError::Decode { .. }
            | AlignError::OutOfRange { .. } => true,
            AlignError::WithContext { source, .. } => source.is_session_local(),
            _ => false,
        }
    }
}

/// Result type alias for dvrk-align operations
pub type Result<T> = std::result::Result<T, AlignError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
