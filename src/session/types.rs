//! Session data types

use std::collections::BTreeMap;

use crate::error::{AlignError, Result};
use crate::types::{Channel, ChannelKind};

/// One recorded log file and the channels extracted from it
#[derive(Debug, Clone)]
pub struct Session {
    /// Name of the session (file name)
    pub name: String,
    /// Extracted channels; disabled channels are absent, missing topics are empty
    channels: BTreeMap<ChannelKind, Channel>,
}

impl Session {
    /// Create a session with no channels
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: BTreeMap::new(),
        }
    }

    /// Add or replace a channel
    pub fn insert(&mut self, channel: Channel) {
        self.channels.insert(channel.kind, channel);
    }

    /// Add a channel, builder style
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.insert(channel);
        self
    }

    /// Get a channel
    pub fn channel(&self, kind: ChannelKind) -> Option<&Channel> {
        self.channels.get(&kind)
    }

    /// Remove a channel
    pub fn take(&mut self, kind: ChannelKind) -> Option<Channel> {
        self.channels.remove(&kind)
    }

    /// Check whether a channel was extracted and has at least one sample
    pub fn has_samples(&self, kind: ChannelKind) -> bool {
        self.channel(kind).is_some_and(|c| !c.is_empty())
    }

    /// Iterate over the channels in output order
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// Sample count of every extracted channel
    pub fn counts(&self) -> Vec<(ChannelKind, usize)> {
        self.channels.values().map(|c| (c.kind, c.len())).collect()
    }

    /// The session origin: first timestamp of the joint state channel
    pub fn origin(&self) -> Option<f64> {
        self.channel(ChannelKind::JointState)
            .and_then(|c| c.first_timestamp())
    }

    /// Rebase every channel onto the session origin
    ///
    /// Returns the origin that was subtracted. After this call the joint state
    /// channel starts at exactly zero.
    pub fn rebase(&mut self) -> Result<f64> {
        let origin = self.origin().ok_or_else(|| AlignError::EmptyReference {
            channel: ChannelKind::JointState.name().to_string(),
        })?;

        for channel in self.channels.values_mut() {
            channel.rebase(origin);
        }

        Ok(origin)
    }
}
