use ebur128::{EbuR128, Error as EbuR128Error, Mode};
use serde::Serialize;

use super::Analyser;
use crate::{header::AudioFormat, output};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoudnessSummary {
    /// Integrated loudness in LUFS.
    pub integrated: f64,
    /// Loudness range in LU.
    pub range: f64,
}

/// EBU R128 integrated loudness and loudness range over the whole file.
pub struct LoudnessAnalyser {
    loudness: EbuR128,
    frame_buf: Vec<i32>,
    window_size: usize,
    summary: Option<LoudnessSummary>,
}

impl LoudnessAnalyser {
    pub fn new(format: &AudioFormat) -> Result<Self, EbuR128Error> {
        let loudness = EbuR128::new(
            format.channels.into(),
            format.sample_rate,
            Mode::I | Mode::LRA,
        )?;

        // Feed the meter in one-second blocks.
        let window_size = format.sample_rate as usize * format.channels as usize;

        Ok(Self {
            loudness,
            frame_buf: Vec::with_capacity(window_size),
            window_size,
            summary: None,
        })
    }

    pub fn summary(&self) -> Option<LoudnessSummary> {
        self.summary
    }

    fn flush(&mut self) {
        if self.frame_buf.is_empty() {
            return;
        }
        if let Err(err) = self.loudness.add_frames_i32(&self.frame_buf) {
            output!(
                "Warning: error adding frames to loudness measurement: {:?}",
                &err
            );
        }
        self.frame_buf.clear();
    }
}

impl Analyser for LoudnessAnalyser {
    fn analyse(&mut self, _frame_index: u64, frame: &[i32]) {
        self.frame_buf.extend_from_slice(frame);
        if self.frame_buf.len() >= self.window_size {
            self.flush();
        }
    }

    fn finish(&mut self) -> u8 {
        self.flush();
        self.summary = Some(LoudnessSummary {
            integrated: self.loudness.loudness_global().unwrap_or(f64::NEG_INFINITY),
            range: self.loudness.loudness_range().unwrap_or(0.0),
        });
        0
    }

    fn json(&self) -> Option<(String, serde_json::Value)> {
        let summary = self.summary?;
        Some(("loudness".to_string(), serde_json::json!(summary)))
    }
}
