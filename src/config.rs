// src/config.rs
//
// Player configuration
//
// Every retry bound, interval and threshold used by the playback core.
// Defaults match the behavior users already know from the web player.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings handed to the adaptive streaming engine on construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds of media the engine buffers ahead
    pub max_buffer_length: f64,
    /// Initial quality level, `None` lets the engine decide
    pub start_level: Option<u32>,
    pub enable_worker: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_buffer_length: 30.0,
            start_level: None,
            enable_worker: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub progress_save_interval_ms: u64,
    /// Share of the duration a session must cover before progress is saved
    pub min_watched_fraction: f64,

    pub seek_retry_interval_ms: u64,
    pub seek_max_retries: u32,
    /// Position within this many seconds of the target counts as applied
    pub seek_tolerance_seconds: f64,

    /// Forces the loading flag off if the engine never reports ready
    pub quality_change_timeout_ms: u64,
    pub max_reinit_attempts: u32,
    pub max_network_recoveries: u32,

    pub skip_countdown_ms: u64,
    /// Landing point after a skip, past the segment end
    pub skip_offset_seconds: f64,

    pub controls_hide_ms: u64,
    pub volume_popup_ms: u64,
    pub seek_step_seconds: f64,
    pub volume_step: f64,

    pub engine: EngineConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            progress_save_interval_ms: 5_000,
            min_watched_fraction: 0.05,
            seek_retry_interval_ms: 200,
            seek_max_retries: 5,
            seek_tolerance_seconds: 0.5,
            quality_change_timeout_ms: 10_000,
            max_reinit_attempts: 3,
            max_network_recoveries: 3,
            skip_countdown_ms: 5_000,
            skip_offset_seconds: 0.5,
            controls_hide_ms: 3_000,
            volume_popup_ms: 1_500,
            seek_step_seconds: 10.0,
            volume_step: 0.1,
            engine: EngineConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// Reads a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read player config {}", path.display()))?;
        let config: PlayerConfig = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse player config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.progress_save_interval_ms == 0 {
            bail!("progress_save_interval_ms must be greater than zero");
        }
        if self.seek_retry_interval_ms == 0 {
            bail!("seek_retry_interval_ms must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.min_watched_fraction) {
            bail!(
                "min_watched_fraction {} must be within 0..=1",
                self.min_watched_fraction
            );
        }
        if self.skip_offset_seconds < 0.0 || self.seek_tolerance_seconds <= 0.0 {
            bail!("skip offset and seek tolerance must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlayerConfig::load(&dir.path().join("player.json")).unwrap();
        assert_eq!(config, PlayerConfig::default());
    }

    #[test]
    fn test_partial_file_overrides_some_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.json");
        std::fs::write(&path, r#"{"skip_countdown_ms": 3000, "engine": {"max_buffer_length": 60}}"#)
            .unwrap();

        let config = PlayerConfig::load(&path).unwrap();
        assert_eq!(config.skip_countdown_ms, 3000);
        assert_eq!(config.engine.max_buffer_length, 60.0);
        assert_eq!(config.seek_max_retries, 5);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = PlayerConfig {
            progress_save_interval_ms: 0,
            ..PlayerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
