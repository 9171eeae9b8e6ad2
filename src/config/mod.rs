//! Configuration module for dvrk-align
//!
//! This module handles pipeline configuration including:
//! - Input/output locations and output naming (prefix, starting index)
//! - The set of channels to extract and the topic each is recorded on
//! - Alignment options (resampling direction, timestamp source)
//!
//! A [`PipelineConfig`] is an explicit record that is validated once before
//! the pipeline starts. It can be loaded from a TOML file where every key is
//! optional, and command-line flags are applied on top through
//! [`ConfigOverrides`].
//!
//! # Example
//!
//! ```toml
//! input_dir = "../data/"
//! output_dir = "./parsed_data/"
//! prefix = "bag_"
//! interpolate = true
//!
//! [channels.cartesian]
//! enabled = false
//! ```

pub mod overrides;

pub use overrides::ConfigOverrides;

use crate::error::{AlignError, Result};
use crate::types::ChannelKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default folder holding the session bags
pub const DEFAULT_INPUT_DIR: &str = "../data/";

/// Default folder the aligned tables are written to
pub const DEFAULT_OUTPUT_DIR: &str = "./parsed_data/";

/// Default prefix for output table names
pub const DEFAULT_PREFIX: &str = "bag_";

/// Default session file extension
pub const DEFAULT_EXTENSION: &str = "bag";

/// Joint state topic of the first patient side manipulator
pub const DEFAULT_JOINT_STATE_TOPIC: &str = "/dvrk/PSM1/state_joint_current";

/// ATI Nano/Mini force sensor topic
pub const DEFAULT_WRENCH_TOPIC: &str = "/atinetft/wrench";

/// Spatial Jacobian topic of the first patient side manipulator
pub const DEFAULT_JACOBIAN_TOPIC: &str = "/dvrk/PSM1/jacobian_spatial";

/// Cartesian pose topic of the first patient side manipulator
pub const DEFAULT_CARTESIAN_TOPIC: &str = "/dvrk/PSM1/position_cartesian_current";

// ==================== Time Source ====================

/// Which timestamp a sample is assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeSource {
    /// Time the message was written to the log
    #[default]
    Record,
    /// Stamp in the message header, record time for headerless messages
    Header,
}

impl std::str::FromStr for TimeSource {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "record" => Ok(TimeSource::Record),
            "header" => Ok(TimeSource::Header),
            other => Err(AlignError::Config(format!(
                "Unknown time source '{}', expected 'record' or 'header'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TimeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeSource::Record => write!(f, "record"),
            TimeSource::Header => write!(f, "header"),
        }
    }
}

// ==================== Channel Specs ====================

/// Where a channel is recorded and what shape its values have
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Whether the channel is extracted at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Topic the channel is recorded on
    #[serde(default)]
    pub topic: String,

    /// Expected number of values per sample (None = taken from the first message)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl ChannelSpec {
    /// Enabled channel on `topic`
    pub fn new(topic: impl Into<String>, width: Option<usize>) -> Self {
        Self {
            enabled: true,
            topic: topic.into(),
            width,
        }
    }

    /// Disabled channel
    pub fn disabled(topic: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(topic, None)
        }
    }
}

/// The channels extracted from every session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSet {
    #[serde(default = "default_joint_state")]
    pub joint_state: ChannelSpec,

    #[serde(default = "default_wrench")]
    pub wrench: ChannelSpec,

    #[serde(default = "default_jacobian")]
    pub jacobian: ChannelSpec,

    #[serde(default = "default_cartesian")]
    pub cartesian: ChannelSpec,
}

fn default_joint_state() -> ChannelSpec {
    ChannelSpec::new(
        DEFAULT_JOINT_STATE_TOPIC,
        Some(ChannelKind::JointState.default_width()),
    )
}

fn default_wrench() -> ChannelSpec {
    ChannelSpec::new(DEFAULT_WRENCH_TOPIC, Some(ChannelKind::Wrench.default_width()))
}

fn default_jacobian() -> ChannelSpec {
    ChannelSpec::new(
        DEFAULT_JACOBIAN_TOPIC,
        Some(ChannelKind::Jacobian.default_width()),
    )
}

fn default_cartesian() -> ChannelSpec {
    ChannelSpec::new(
        DEFAULT_CARTESIAN_TOPIC,
        Some(ChannelKind::Cartesian.default_width()),
    )
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self {
            joint_state: default_joint_state(),
            wrench: default_wrench(),
            jacobian: default_jacobian(),
            cartesian: default_cartesian(),
        }
    }
}

impl ChannelSet {
    /// Spec of a channel kind
    pub fn get(&self, kind: ChannelKind) -> &ChannelSpec {
        match kind {
            ChannelKind::JointState => &self.joint_state,
            ChannelKind::Wrench => &self.wrench,
            ChannelKind::Jacobian => &self.jacobian,
            ChannelKind::Cartesian => &self.cartesian,
        }
    }

    /// Mutable settings of a channel kind
    pub fn get_mut(&mut self, kind: ChannelKind) -> &mut ChannelSpec {
        match kind {
            ChannelKind::JointState => &mut self.joint_state,
            ChannelKind::Wrench => &mut self.wrench,
            ChannelKind::Jacobian => &mut self.jacobian,
            ChannelKind::Cartesian => &mut self.cartesian,
        }
    }

    /// Enabled channels in output order
    pub fn enabled(&self) -> impl Iterator<Item = (ChannelKind, &ChannelSpec)> {
        ChannelKind::all()
            .iter()
            .map(move |&kind| (kind, self.get(kind)))
            .filter(|(_, spec)| spec.enabled)
    }

    /// Topics of all enabled channels
    pub fn topics(&self) -> Vec<String> {
        self.enabled().map(|(_, spec)| spec.topic.clone()).collect()
    }
}

// ==================== Pipeline Config ====================

/// Complete configuration of one pipeline invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Folder holding the session files
    pub input_dir: PathBuf,

    /// Folder the aligned tables are written to
    pub output_dir: PathBuf,

    /// Prefix of every output table name
    pub prefix: String,

    /// Index assigned to the first written session
    pub start_index: usize,

    /// Resample onto the force sensor's time axis instead of the joint state's
    pub interpolate: bool,

    /// Extension of session files (without the dot)
    pub extension: String,

    /// Number of sessions processed concurrently
    pub jobs: usize,

    /// Timestamp assigned to each sample
    pub time_source: TimeSource,

    /// Write a column-name header row in every table
    pub write_header: bool,

    /// Write a JSON manifest mapping output indices to session files
    pub write_manifest: bool,

    /// Channels to extract
    pub channels: ChannelSet,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            prefix: DEFAULT_PREFIX.to_string(),
            start_index: 0,
            interpolate: false,
            extension: DEFAULT_EXTENSION.to_string(),
            jobs: 1,
            time_source: TimeSource::Record,
            write_header: false,
            write_manifest: true,
            channels: ChannelSet::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AlignError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        Self::from_toml(&content)
            .map_err(|e| e.with_context(format!("Failed to load config file {:?}", path)))
    }

    /// Parse a configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| AlignError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Serialize the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AlignError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Apply command-line overrides on top of this configuration
    pub fn apply(mut self, overrides: &ConfigOverrides) -> Self {
        overrides.apply_to(&mut self);
        self
    }

    /// Check the configuration for values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(AlignError::Config("jobs must be at least 1".to_string()));
        }

        if self.extension.trim().is_empty() {
            return Err(AlignError::Config(
                "session file extension must not be empty".to_string(),
            ));
        }

        if self.input_dir == self.output_dir {
            return Err(AlignError::Config(format!(
                "output directory {:?} must differ from the input directory",
                self.output_dir
            )));
        }

        if !self.channels.joint_state.enabled {
            return Err(AlignError::Config(
                "the joint_state channel defines the session origin and cannot be disabled"
                    .to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (kind, spec) in self.channels.enabled() {
            if spec.topic.trim().is_empty() {
                return Err(AlignError::Config(format!("{} topic must not be empty", kind)));
            }
            if spec.width == Some(0) {
                return Err(AlignError::Config(format!("{} width must be positive", kind)));
            }
            if !seen.insert(spec.topic.as_str()) {
                return Err(AlignError::Config(format!(
                    "topic '{}' is configured for more than one channel",
                    spec.topic
                )));
            }
        }

        Ok(())
    }
}
