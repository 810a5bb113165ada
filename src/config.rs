use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default = "default_save_file")]
    pub save_file: String,
    /// Seconds between periodic check cycles.
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
    /// Per-probe timeout, seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout: u64,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_save_file() -> String {
    "monitor_settings.json".into()
}
fn default_check_interval() -> u64 {
    600
}
fn default_probe_timeout() -> u64 {
    3
}
fn default_api_port() -> u16 {
    3000
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            save_file: default_save_file(),
            check_interval: default_check_interval(),
            probe_timeout: default_probe_timeout(),
            api_port: default_api_port(),
        }
    }
}

impl MonitorConfig {
    /// A missing config file means all defaults; an unparseable one is a
    /// startup error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_every_field() {
        let config = MonitorConfig::default();
        assert_eq!(config.save_file, "monitor_settings.json");
        assert_eq!(config.check_interval, 600);
        assert_eq!(config.probe_timeout, 3);
    }

    #[test]
    fn partial_config_falls_back_to_field_defaults() {
        let config: MonitorConfig = serde_json::from_str(r#"{"check_interval": 60}"#).unwrap();
        assert_eq!(config.check_interval, 60);
        assert_eq!(config.probe_timeout, 3);
        assert_eq!(config.api_port, 3000);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = MonitorConfig::load("definitely-not-here.json").unwrap();
        assert_eq!(config.check_interval, 600);
    }
}
