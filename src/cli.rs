use std::path::PathBuf;

use clap::Parser;
use wavcheck::{config::Config, error::ConfigError};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Detects digital silence, overmodulation and held samples in PCM WAV files"
)]
pub struct Cli {
    /// WAV files or directories to analyse
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// JSON configuration file; the flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Repeated zero samples that make a digital silence
    #[arg(long)]
    pub silence_samples: Option<u32>,

    /// Repeated non-zero samples that make a hold
    #[arg(long)]
    pub hold_samples: Option<u32>,

    /// Seconds without a new warning of the same kind on a channel
    #[arg(long)]
    pub no_warning_duration: Option<f32>,

    /// Holds below this level (dBFS) are ignored
    #[arg(long, allow_hyphen_values = true)]
    pub hold_level: Option<f64>,

    /// Leave out markers before this position (seconds)
    #[arg(long)]
    pub start: Option<f32>,

    /// Leave out markers in the last N seconds
    #[arg(long)]
    pub end: Option<f32>,

    /// Results table to append to
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Do not write the results table, info and marker files
    #[arg(long)]
    pub no_reports: bool,

    /// Write a JSON report next to every analysed file
    #[arg(short, long)]
    pub json: bool,

    /// Measure integrated loudness (EBU R128)
    #[arg(long)]
    pub loudness: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Print debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Loads `--config` (or the defaults) and applies the flag overrides.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(path) => Config::from_path(path)?,
            None => Config::default(),
        };

        let detector = &mut config.detector;
        if let Some(samples) = self.silence_samples {
            detector.silence_threshold_samples = samples;
        }
        if let Some(samples) = self.hold_samples {
            detector.hold_threshold_samples = samples;
        }
        if let Some(seconds) = self.no_warning_duration {
            detector.no_warning_duration = seconds;
        }
        if let Some(level) = self.hold_level {
            detector.hold_level_threshold_dbfs = level;
        }
        detector.validate()?;

        let report = &mut config.report;
        if let Some(start) = self.start {
            report.start_position = start;
        }
        if self.end.is_some() {
            report.end_position = self.end;
        }
        if let Some(table) = &self.table {
            report.table_path = table.clone();
        }
        Ok(config)
    }
}
