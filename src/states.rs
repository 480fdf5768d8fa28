use serde::Serialize;

/// Run-length and debounce state of one channel.
#[derive(Debug, Clone, Default)]
pub struct ChannelState {
    pub last_value: i32,
    pub same_value_run: u64,
    pub zero_run: u64,
    pub last_silence: Option<u64>,
    pub last_overmodulation: Option<u64>,
    pub last_hold: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeakLocation {
    pub frame: u64,
    pub channel: u16,
}

/// Loudest sample of a scan. `level_dbfs` and `location` are `None` when no
/// non-zero sample was seen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakRecord {
    pub level_dbfs: Option<f64>,
    pub location: Option<PeakLocation>,
}

#[derive(Debug, Clone, Default)]
pub struct PeakTracker {
    max_abs: u32,
    location: Option<PeakLocation>,
}

impl PeakTracker {
    pub fn observe(&mut self, frame: u64, channel: u16, value: i32) {
        let abs = value.unsigned_abs();
        if abs > self.max_abs {
            self.max_abs = abs;
            self.location = Some(PeakLocation { frame, channel });
        }
    }

    pub fn record(&self) -> PeakRecord {
        PeakRecord {
            level_dbfs: (self.max_abs > 0).then(|| amplitude_dbfs(self.max_abs)),
            location: self.location,
        }
    }
}

/// Level of an absolute amplitude relative to `i32::MAX`.
pub fn amplitude_dbfs(abs: u32) -> f64 {
    20.0 * (abs as f64 / i32::MAX as f64).log10()
}
