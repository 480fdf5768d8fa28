use serde::Serialize;

use crate::{
    ERR_CONTAINS_HOLD, ERR_CONTAINS_OVERMODULATION, ERR_CONTAINS_SILENCE, output::fmt_number,
};

/// A recording defect found by the scanner. Channels are zero-based and
/// positions are frame indices.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DefectEvent {
    /// A run of repeated digital zeros.
    Silence {
        channel: u16,
        /// `detected_at` minus the silence threshold, clamped at 0: a run of
        /// leading zeros starts counting on the first sample, so the
        /// difference can be -1.
        start_sample_index: u64,
        /// Frame at which the run reached the silence threshold.
        detected_at: u64,
    },
    /// A full-scale sample.
    Overmodulation { channel: u16, sample_index: u64 },
    /// A non-zero value stuck for the hold threshold.
    Hold {
        channel: u16,
        start_sample_index: u64,
        level_dbfs: f64,
    },
}

impl DefectEvent {
    pub fn channel(&self) -> u16 {
        match *self {
            DefectEvent::Silence { channel, .. }
            | DefectEvent::Overmodulation { channel, .. }
            | DefectEvent::Hold { channel, .. } => channel,
        }
    }

    /// Frame the event is reported at.
    pub fn position(&self) -> u64 {
        match *self {
            DefectEvent::Silence {
                start_sample_index, ..
            }
            | DefectEvent::Hold {
                start_sample_index, ..
            } => start_sample_index,
            DefectEvent::Overmodulation { sample_index, .. } => sample_index,
        }
    }

    pub fn label(&self) -> String {
        match self {
            DefectEvent::Silence { .. } => "Silence".to_string(),
            DefectEvent::Overmodulation { .. } => "Overmodulation".to_string(),
            DefectEvent::Hold { level_dbfs, .. } => {
                format!("Hold at {} dBFS", fmt_number(*level_dbfs))
            }
        }
    }

    /// Exit-code bit for this kind of defect.
    pub fn flag(&self) -> u8 {
        match self {
            DefectEvent::Silence { .. } => ERR_CONTAINS_SILENCE,
            DefectEvent::Overmodulation { .. } => ERR_CONTAINS_OVERMODULATION,
            DefectEvent::Hold { .. } => ERR_CONTAINS_HOLD,
        }
    }
}
