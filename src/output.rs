use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

static QUIET: AtomicBool = AtomicBool::new(false);
static DEBUG: AtomicBool = AtomicBool::new(false);

/// Sets the console verbosity used by [`output!`] and [`debug!`].
pub fn init(quiet: bool, debug: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
    DEBUG.store(debug && !quiet, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

pub fn is_debug() -> bool {
    DEBUG.load(Ordering::Relaxed)
}

/// Prints a line unless `--quiet` was given.
#[macro_export]
macro_rules! output {
    ($($arg:tt)*) => {
        if !$crate::output::is_quiet() {
            println!($($arg)*);
        }
    };
}

/// Prints a line only with `--debug`.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        if $crate::output::is_debug() {
            println!($($arg)*);
        }
    };
}

pub fn fmt_frame(frame: u64, digits: usize) -> String {
    format!("{:0width$}", frame, width = digits)
}

pub fn frame_to_time(frame: u64, sample_rate: u32) -> String {
    let seconds = frame as f64 / sample_rate as f64;
    let hours = (seconds / 3600.0).floor();
    let minutes = ((seconds % 3600.0) / 60.0).floor();
    let secs = seconds % 60.0;
    format!("{:02.0}:{:02.0}:{:06.3}", hours, minutes, secs)
}

/// Formats with at most three fraction digits, trailing zeros dropped.
pub fn fmt_number(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value < 0.0 {
            "-inf".to_string()
        } else {
            "inf".to_string()
        };
    }
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[derive(Debug)]
pub struct Output {
    pub progress_bar: Option<ProgressBar>,
}

impl Output {
    pub fn new(show_progress: bool, num_frames: u64) -> Self {
        let progress_bar = if show_progress && !is_quiet() {
            Some(ProgressBar::new(num_frames))
        } else {
            None
        };

        if let Some(pb) = &progress_bar {
            if let Ok(style) = ProgressStyle::with_template(
                "[{elapsed_precise}] [{wide_bar:.yellow/green}] {percent_precise}% ({pos}/{len})",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
        }

        Self { progress_bar }
    }

    pub fn hidden() -> Self {
        Self { progress_bar: None }
    }

    pub fn inc(&self, frames: u64) {
        if let Some(pb) = &self.progress_bar {
            pb.inc(frames);
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_and_clear();
        }
    }
}
