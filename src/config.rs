use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Thresholds driving the defect detectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectorConfig {
    /// Consecutive repeated zero samples that make a digital silence.
    pub silence_threshold_samples: u32,
    /// Consecutive repeated non-zero samples that make a hold.
    pub hold_threshold_samples: u32,
    /// Seconds during which a second event of the same kind on the same
    /// channel is not reported.
    pub no_warning_duration: f32,
    /// A hold quieter than this level (dBFS) is not reported.
    pub hold_level_threshold_dbfs: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            silence_threshold_samples: 10,
            hold_threshold_samples: 5,
            no_warning_duration: 1.0,
            hold_level_threshold_dbfs: -50.0,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.silence_threshold_samples == 0 {
            return Err(ConfigError::Invalid {
                field: "silenceThresholdSamples",
                reason: "must be at least 1",
            });
        }
        if self.hold_threshold_samples == 0 {
            return Err(ConfigError::Invalid {
                field: "holdThresholdSamples",
                reason: "must be at least 1",
            });
        }
        if !self.no_warning_duration.is_finite() || self.no_warning_duration < 0.0 {
            return Err(ConfigError::Invalid {
                field: "noWarningDuration",
                reason: "must be a finite, non-negative number of seconds",
            });
        }
        if self.hold_level_threshold_dbfs.is_nan() {
            return Err(ConfigError::Invalid {
                field: "holdLevelThresholdDbfs",
                reason: "must be a number",
            });
        }
        Ok(())
    }

    /// Debounce window in frames for the given sample rate.
    pub fn debounce_frames(&self, sample_rate: u32) -> u64 {
        (sample_rate as f64 * self.no_warning_duration as f64).round() as u64
    }
}

/// Settings of the text reports written next to each analysed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    /// Markers before this position (seconds) are left out.
    pub start_position: f32,
    /// Markers within this many seconds of the end are left out.
    pub end_position: Option<f32>,
    /// Tab-separated table a row is appended to for every file.
    pub table_path: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            start_position: 0.0,
            end_position: None,
            table_path: PathBuf::from("results.txt"),
        }
    }
}

impl ReportConfig {
    pub fn is_partial(&self) -> bool {
        self.start_position > 0.0 || self.end_position.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorConfig,
    pub report: ReportConfig,
}

impl Config {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.detector.validate()?;
        Ok(config)
    }
}
