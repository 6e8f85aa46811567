//! Engine configuration
//!
//! Tuning knobs for the interactive engine, persisted as YAML. Loading is
//! forgiving: a missing or unparsable file falls back to defaults with a
//! warning, so a bad config can never keep the engine from starting.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::spectrum::{DEFAULT_ATTACK_RATE, DEFAULT_FFT_SIZE, DEFAULT_RELEASE_RATE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Waveform amplitude bins computed per asset
    pub waveform_bins: usize,
    /// Spectrum analyzer FFT size (power of two)
    pub spectrum_fft_size: usize,
    /// Pointer hit tolerance around drag handles, in pixels
    pub hit_tolerance_px: f32,
    /// Horizontal strip reserved for time labels, in pixels per side
    pub label_padding_px: f32,
    /// Preview drift below this is left uncorrected, in seconds
    pub drift_threshold_secs: f64,
    /// Per-tick approach rate of the visualizer color toward "playing"
    pub color_attack_rate: f32,
    /// Per-tick approach rate of the visualizer color toward "paused"
    pub color_release_rate: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            waveform_bins: 500,
            spectrum_fft_size: DEFAULT_FFT_SIZE,
            hit_tolerance_px: 6.0,
            label_padding_px: 32.0,
            drift_threshold_secs: 0.1,
            color_attack_rate: DEFAULT_ATTACK_RATE,
            color_release_rate: DEFAULT_RELEASE_RATE,
        }
    }
}

impl EngineConfig {
    /// FFT size guarded against hand-edited nonsense in the config file
    pub fn validated_fft_size(&self) -> usize {
        let size = self.spectrum_fft_size;
        if size.is_power_of_two() && (32..=32768).contains(&size) {
            size
        } else {
            log::warn!(
                "invalid spectrum_fft_size {}, falling back to {}",
                size,
                DEFAULT_FFT_SIZE
            );
            DEFAULT_FFT_SIZE
        }
    }

    /// Load configuration from a YAML file
    ///
    /// Missing or invalid files yield the default config.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("no config at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str::<Self>(&contents) {
                Ok(config) => {
                    log::info!("loaded engine config from {:?}", path);
                    config
                }
                Err(e) => {
                    log::warn!("failed to parse config: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("failed to read config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to a YAML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;
        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        log::info!("saved engine config to {:?}", path);
        Ok(())
    }
}

/// Default config file location: `<config dir>/coda/engine.yaml`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("coda")
        .join("engine.yaml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_nonexistent_returns_default() {
        let config = EngineConfig::load(Path::new("/nonexistent/path/engine.yaml"));
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");

        let config = EngineConfig {
            waveform_bins: 800,
            hit_tolerance_px: 10.0,
            ..EngineConfig::default()
        };

        config.save(&path).unwrap();
        let loaded = EngineConfig::load(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_yaml_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        std::fs::write(&path, "waveform_bins: [not a number").unwrap();

        assert_eq!(EngineConfig::load(&path), EngineConfig::default());
    }

    #[test]
    fn test_validated_fft_size_rejects_non_power_of_two() {
        let config = EngineConfig {
            spectrum_fft_size: 300,
            ..EngineConfig::default()
        };
        assert_eq!(config.validated_fft_size(), DEFAULT_FFT_SIZE);

        let config = EngineConfig {
            spectrum_fft_size: 512,
            ..EngineConfig::default()
        };
        assert_eq!(config.validated_fft_size(), 512);
    }

    #[test]
    fn test_default_path_ends_with_engine_yaml() {
        assert!(default_config_path().ends_with("coda/engine.yaml"));
    }
}
