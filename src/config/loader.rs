use anyhow::{Result, Context as AnyhowContext};
use std::fs;
use crate::config::Settings;

pub fn load_settings_from_yaml(file_path: &str) -> Result<Settings> {
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read settings file from {}", file_path))?;

    parse_settings(&yaml_content)
        .with_context(|| format!("Invalid settings in {}", file_path))
}

/// Parses without validating: callers apply their overrides first and then
/// call [`Settings::validate`] once.
pub fn parse_settings(yaml_content: &str) -> Result<Settings> {
    // serde_yaml rejects an empty document; treat it as "all defaults".
    if yaml_content.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_yaml::from_str(yaml_content).context("Failed to deserialize settings YAML")
}
