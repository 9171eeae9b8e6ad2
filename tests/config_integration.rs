//! Configuration files and command-line overrides

use std::path::PathBuf;

use dvrk_align::config::{ConfigOverrides, PipelineConfig, TimeSource};
use dvrk_align::ChannelKind;

const CONFIG: &str = r#"
input_dir = "/recordings/trocar"
output_dir = "/parsed/trocar"
prefix = "trocar_"
start_index = 20
jobs = 2
time_source = "header"

[channels.wrench]
topic = "/ati/wrench"

[channels.cartesian]
enabled = false
topic = "/dvrk/PSM1/position_cartesian_current"
"#;

fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("dvrk-align.toml");
    std::fs::write(&path, content).unwrap();
    (tmp, path)
}

#[test]
fn test_load_config_file() {
    let (_tmp, path) = write_config(CONFIG);
    let config = PipelineConfig::load(&path).unwrap();

    assert_eq!(config.input_dir, PathBuf::from("/recordings/trocar"));
    assert_eq!(config.start_index, 20);
    assert_eq!(config.jobs, 2);
    assert_eq!(config.time_source, TimeSource::Header);
    assert_eq!(config.channels.wrench.topic, "/ati/wrench");
    // A channel table replaces the whole entry; width then comes from the data
    assert_eq!(config.channels.wrench.width, None);
    assert_eq!(config.channels.jacobian.width, Some(36));
    assert!(!config.interpolate);

    let enabled: Vec<ChannelKind> = config.channels.enabled().map(|(kind, _)| kind).collect();
    assert_eq!(
        enabled,
        vec![ChannelKind::JointState, ChannelKind::Wrench, ChannelKind::Jacobian]
    );
    config.validate().unwrap();
}

#[test]
fn test_flags_override_file() {
    let (_tmp, path) = write_config(CONFIG);
    let overrides = ConfigOverrides {
        output_dir: Some(PathBuf::from("/tmp/out")),
        start_index: Some(0),
        interpolate: true,
        time_source: Some(TimeSource::Record),
        ..Default::default()
    };

    let config = PipelineConfig::load(&path).unwrap().apply(&overrides);
    assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    assert_eq!(config.start_index, 0);
    assert!(config.interpolate);
    assert_eq!(config.time_source, TimeSource::Record);
    // Not overridden
    assert_eq!(config.prefix, "trocar_");
}

#[test]
fn test_missing_file_is_config_error() {
    let err = PipelineConfig::load("/nonexistent/dvrk-align.toml").unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}

#[test]
fn test_invalid_width_rejected() {
    let (_tmp, path) = write_config("[channels.jacobian]\ntopic = \"/jacobian\"\nwidth = 0\n");
    let config = PipelineConfig::load(&path).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("width must be positive"));
}

#[test]
fn test_printed_config_reloads() {
    let (_tmp, path) = write_config(CONFIG);
    let config = PipelineConfig::load(&path).unwrap();

    let printed = config.to_toml().unwrap();
    let (_tmp2, reprinted) = write_config(&printed);
    assert_eq!(PipelineConfig::load(&reprinted).unwrap(), config);
}
