//! Engine configuration
//!
//! Loaded from a YAML file; every field has a default so a missing or
//! partial file degrades gracefully.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration for the playback and capture engines
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RtConfig {
    /// Number of playback slots in the pool
    pub pool_size: usize,
    /// Scheduler sleep between passes, in microseconds
    pub poll_interval_us: u64,
    /// Scheduler sleep while globally paused, in microseconds
    pub paused_poll_interval_us: u64,
    /// Capacity of each capture buffer, in events
    pub capture_capacity: usize,
    /// Case-insensitive substring match for the output port (None = first
    /// available)
    pub output_port: Option<String>,
    /// Case-insensitive substring match for the input port (None = first
    /// available)
    pub input_port: Option<String>,
}

impl Default for RtConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            poll_interval_us: 10,
            paused_poll_interval_us: 100,
            capture_capacity: 1024,
            output_port: None,
            input_port: None,
        }
    }
}

/// Default config file location (`<config dir>/motif/motif.yaml`)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("motif")
        .join("motif.yaml")
}

/// Load engine configuration from a YAML file
///
/// If the file doesn't exist, returns the defaults. If it exists but is
/// invalid, logs a warning and returns the defaults.
pub fn load_config(path: &Path) -> RtConfig {
    if !path.exists() {
        log::info!("load_config: {:?} doesn't exist, using defaults", path);
        return RtConfig::default();
    }

    match try_load(path) {
        Ok(config) => {
            log::info!(
                "load_config: loaded from {:?} (pool_size={}, capture_capacity={})",
                path,
                config.pool_size,
                config.capture_capacity
            );
            config
        }
        Err(e) => {
            log::warn!("load_config: failed to load {:?}: {}, using defaults", path, e);
            RtConfig::default()
        }
    }
}

fn try_load(path: &Path) -> anyhow::Result<RtConfig> {
    let contents = std::fs::read_to_string(path)?;
    let config: RtConfig = serde_yaml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RtConfig::default();
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.poll_interval_us, 10);
        assert_eq!(config.paused_poll_interval_us, 100);
        assert_eq!(config.capture_capacity, 1024);
        assert!(config.output_port.is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: RtConfig = serde_yaml::from_str("pool_size: 4\noutput_port: \"through\"\n").unwrap();
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.output_port.as_deref(), Some("through"));
        assert_eq!(config.capture_capacity, 1024);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/motif.yaml"));
        assert_eq!(config.pool_size, 10);
    }
}
