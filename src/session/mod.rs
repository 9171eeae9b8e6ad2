//! Recorded sessions
//!
//! A session is one log file. The [`Extractor`] reads the configured topics
//! from a [`MessageSource`](crate::bag::MessageSource) and produces a
//! [`Session`] holding one channel per enabled stream.

pub mod extractor;
pub mod types;

pub use extractor::Extractor;
pub use types::Session;
