//! Log extractor: turns a session's messages into channels

use std::collections::{BTreeMap, HashMap};

use crate::bag::{ros1, stamp_to_seconds, MessageSource};
use crate::config::{ChannelSet, PipelineConfig, TimeSource};
use crate::error::{Result, ResultExt};
use crate::types::{ChannelBuilder, ChannelKind};

use super::types::Session;

/// Extracts the configured channels from a message source
#[derive(Debug, Clone, Copy)]
pub struct Extractor<'a> {
    channels: &'a ChannelSet,
    time_source: TimeSource,
}

impl<'a> Extractor<'a> {
    /// Create an extractor for a channel set
    pub fn new(channels: &'a ChannelSet, time_source: TimeSource) -> Self {
        Self {
            channels,
            time_source,
        }
    }

    /// Create an extractor from a pipeline configuration
    pub fn from_config(config: &'a PipelineConfig) -> Self {
        Self::new(&config.channels, config.time_source)
    }

    /// Read every enabled channel of a session
    ///
    /// Enabled channels without any message on their topic are returned empty.
    pub fn extract(&self, source: &mut dyn MessageSource) -> Result<Session> {
        let name = source.describe();
        let topics = self.channels.topics();
        let messages = source.read_messages(&topics)?;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for message in &messages {
            *counts.entry(message.topic.as_str()).or_default() += 1;
        }

        let mut routes: HashMap<&str, ChannelKind> = HashMap::new();
        let mut builders: BTreeMap<ChannelKind, ChannelBuilder> = BTreeMap::new();
        for (kind, spec) in self.channels.enabled() {
            let mut builder = ChannelBuilder::new(kind, spec.topic.clone(), spec.width);
            builder.reserve(counts.get(spec.topic.as_str()).copied().unwrap_or(0));
            routes.insert(spec.topic.as_str(), kind);
            builders.insert(kind, builder);
        }

        for message in &messages {
            let Some(kind) = routes.get(message.topic.as_str()).copied() else {
                continue;
            };
            let Some(builder) = builders.get_mut(&kind) else {
                continue;
            };

            let sample = ros1::decode(kind, &message.topic, &message.payload)?;
            let timestamp = match (self.time_source, sample.stamp) {
                (TimeSource::Header, Some((secs, nsecs))) => stamp_to_seconds(secs, nsecs),
                _ => message.record_time(),
            };

            builder
                .push(timestamp, &sample.values)
                .with_context(|| format!("{}: sample {} on {}", name, builder.len(), message.topic))?;
        }

        let mut session = Session::new(name.clone());
        for (kind, builder) in builders {
            let channel = builder.finish()?;
            tracing::info!(
                "Processed {} {}: count: {}",
                name,
                kind.name(),
                channel.len()
            );
            session.insert(channel);
        }

        Ok(session)
    }
}
