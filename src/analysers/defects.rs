use std::io::Read;

use serde::Serialize;

use super::{Analyser, run};
use crate::{
    config::DetectorConfig,
    debug,
    decoder::SampleStream,
    error::ScanError,
    events::DefectEvent,
    header::AudioFormat,
    output,
    output::{Output, fmt_frame, fmt_number, frame_to_time},
    states::{ChannelState, PeakRecord, PeakTracker, amplitude_dbfs},
};

/// Samples at or above this value count as positive clipping.
pub const CLIP_POSITIVE: i32 = 0x7FFF_0000;

/// Findings of one scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub events: Vec<DefectEvent>,
    pub peak: PeakRecord,
    pub frames_scanned: u64,
}

impl ScanReport {
    /// OR of the exit-code flags of all events.
    pub fn flags(&self) -> u8 {
        event_flags(&self.events)
    }
}

fn event_flags(events: &[DefectEvent]) -> u8 {
    events.iter().fold(0, |flags, event| flags | event.flag())
}

fn is_clipped(value: i32) -> bool {
    value == i32::MIN || value >= CLIP_POSITIVE
}

/// A cursor that never fired behaves as if it fired `debounce` frames before
/// frame 0, so nothing is reported at frame 0 itself.
fn window_open(last: Option<u64>, frame: u64, debounce: u64) -> bool {
    match last {
        Some(last) => frame.saturating_sub(last) > debounce,
        None => frame > 0,
    }
}

/// Streaming detector for digital silence, overmodulation and held values,
/// plus global peak tracking.
pub struct DefectScanner {
    config: DetectorConfig,
    sample_rate: u32,
    debounce_frames: u64,
    digits: usize,
    channels: Vec<ChannelState>,
    peak: PeakTracker,
    events: Vec<DefectEvent>,
    frames_scanned: u64,
}

impl DefectScanner {
    pub fn new(config: DetectorConfig, format: &AudioFormat) -> Self {
        Self {
            debounce_frames: config.debounce_frames(format.sample_rate),
            config,
            sample_rate: format.sample_rate,
            digits: format.sample_count().to_string().len(),
            channels: vec![ChannelState::default(); format.channels as usize],
            peak: PeakTracker::default(),
            events: Vec::new(),
            frames_scanned: 0,
        }
    }

    pub fn events(&self) -> &[DefectEvent] {
        &self.events
    }

    /// Advances the detectors of `channel` by one sample at `frame`.
    pub fn push_sample(&mut self, frame: u64, channel: u16, value: i32) {
        self.peak.observe(frame, channel, value);

        let silence_threshold = self.config.silence_threshold_samples as u64;
        let hold_threshold = self.config.hold_threshold_samples as u64;
        let debounce = self.debounce_frames;
        let state = &mut self.channels[channel as usize];
        let mut emitted = Vec::new();
        let mut hold_candidate = true;

        if value == state.last_value {
            state.same_value_run += 1;

            if value == 0 {
                hold_candidate = false;
                state.zero_run += 1;
                if state.zero_run == silence_threshold
                    && window_open(state.last_silence, frame, debounce)
                {
                    state.last_silence = Some(frame);
                    emitted.push(DefectEvent::Silence {
                        channel,
                        start_sample_index: frame.saturating_sub(silence_threshold),
                        detected_at: frame,
                    });
                }
            } else {
                state.zero_run = 0;
            }
        } else {
            state.same_value_run = 0;
            state.zero_run = 0;
            state.last_value = value;

            // Only a fresh value is checked: sustained clipping reports once.
            if is_clipped(value) {
                hold_candidate = false;
                if window_open(state.last_overmodulation, frame, debounce) {
                    state.last_overmodulation = Some(frame);
                    emitted.push(DefectEvent::Overmodulation {
                        channel,
                        sample_index: frame,
                    });
                }
            }
        }

        if hold_candidate
            && state.same_value_run == hold_threshold
            && window_open(state.last_hold, frame, debounce)
        {
            let level = amplitude_dbfs(value.unsigned_abs());
            if level > self.config.hold_level_threshold_dbfs {
                emitted.push(DefectEvent::Hold {
                    channel,
                    start_sample_index: (frame + 1).saturating_sub(hold_threshold),
                    level_dbfs: level,
                });
            } else {
                debug!(
                    "[{}] DEBUG        : CH:{} hold below level floor ({} dBFS)",
                    fmt_frame(frame, self.digits),
                    channel + 1,
                    fmt_number(level)
                );
            }
            state.last_hold = Some(frame);
        }

        for event in emitted {
            self.log_event(frame, &event);
            self.events.push(event);
        }
    }

    fn log_event(&self, frame: u64, event: &DefectEvent) {
        let label = fmt_frame(frame, self.digits);
        let at = frame_to_time(event.position(), self.sample_rate);
        match event {
            DefectEvent::Silence { channel, .. } => output!(
                "[{}] SILENCE       : CH:{} - {} samples @ {}",
                label,
                channel + 1,
                self.config.silence_threshold_samples,
                at
            ),
            DefectEvent::Overmodulation { channel, .. } => {
                output!("[{}] OVERMODULATION: CH:{} @ {}", label, channel + 1, at)
            }
            DefectEvent::Hold {
                channel,
                level_dbfs,
                ..
            } => output!(
                "[{}] HOLD          : CH:{} - {} dBFS @ {}",
                label,
                channel + 1,
                fmt_number(*level_dbfs),
                at
            ),
        }
    }

    /// Current findings, with the peak finalized as of the last sample seen.
    pub fn report(&self) -> ScanReport {
        ScanReport {
            events: self.events.clone(),
            peak: self.peak.record(),
            frames_scanned: self.frames_scanned,
        }
    }

    pub fn into_report(self) -> ScanReport {
        ScanReport {
            peak: self.peak.record(),
            frames_scanned: self.frames_scanned,
            events: self.events,
        }
    }

    /// Consumes `stream` to its end. A truncated payload yields a
    /// [`ScanError`] that still carries the findings made before the break.
    pub fn scan<R: Read>(mut self, mut stream: SampleStream<R>) -> Result<ScanReport, ScanError> {
        let analyser: &mut dyn Analyser = &mut self;
        match run(&mut stream, &mut [analyser], &Output::hidden()) {
            Ok(_) => Ok(self.into_report()),
            Err(source) => Err(ScanError {
                source,
                partial: self.into_report(),
            }),
        }
    }
}

impl Analyser for DefectScanner {
    fn analyse(&mut self, frame_index: u64, frame: &[i32]) {
        for (channel, value) in frame.iter().enumerate() {
            self.push_sample(frame_index, channel as u16, *value);
        }
        self.frames_scanned = frame_index + 1;
    }

    fn finish(&mut self) -> u8 {
        event_flags(&self.events)
    }

    fn json(&self) -> Option<(String, serde_json::Value)> {
        let analysis = serde_json::json!({
            "results": self.report(),
            "thresholds": self.config,
            "debounceFrames": self.debounce_frames,
        });
        Some(("defects".to_string(), analysis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::SampleDepth;
    use pretty_assertions::assert_eq;

    fn mono16(sample_rate: u32) -> AudioFormat {
        AudioFormat {
            channels: 1,
            sample_rate,
            depth: SampleDepth::Pcm16,
            payload_len: 0,
        }
    }

    fn config(silence: u32, hold: u32, debounce_frames: u32) -> DetectorConfig {
        // At 1000 Hz a duration of n ms is n frames.
        DetectorConfig {
            silence_threshold_samples: silence,
            hold_threshold_samples: hold,
            no_warning_duration: debounce_frames as f32 / 1000.0,
            hold_level_threshold_dbfs: -50.0,
        }
    }

    fn scan_mono(config: DetectorConfig, samples: &[i16]) -> ScanReport {
        let mut scanner = DefectScanner::new(config, &mono16(1000));
        for (frame, sample) in samples.iter().enumerate() {
            scanner.analyse(frame as u64, &[(*sample as i32) << 16]);
        }
        scanner.into_report()
    }

    #[test]
    fn twenty_zeros_make_one_silence() {
        let report = scan_mono(config(10, 5, 0), &[0; 20]);
        assert_eq!(
            report.events,
            vec![DefectEvent::Silence {
                channel: 0,
                start_sample_index: 0,
                detected_at: 9,
            }]
        );
        assert_eq!(report.peak.level_dbfs, None);
    }

    #[test]
    fn silence_run_restarts_after_a_change() {
        let mut samples = vec![0i16; 6];
        samples.push(300);
        samples.extend([0i16; 12]);
        let report = scan_mono(config(10, 50, 0), &samples);

        // Run restarts at frame 7 (changed branch) and counts from frame 8.
        assert_eq!(
            report.events,
            vec![DefectEvent::Silence {
                channel: 0,
                start_sample_index: 7,
                detected_at: 17,
            }]
        );
    }

    #[test]
    fn clipped_value_reports_once_while_sustained() {
        let report = scan_mono(
            config(10, 5, 0),
            &[1000, i16::MAX, i16::MAX, i16::MAX, 1000],
        );
        assert_eq!(
            report.events,
            vec![DefectEvent::Overmodulation {
                channel: 0,
                sample_index: 1,
            }]
        );

        let report = scan_mono(config(10, 5, 0), &[100, i16::MIN, 100, i16::MIN]);
        assert_eq!(
            report
                .events
                .iter()
                .map(DefectEvent::position)
                .collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[test]
    fn nothing_is_reported_at_frame_zero() {
        let report = scan_mono(config(1, 5, 0), &[i16::MIN, 5]);
        assert!(report.events.is_empty(), "{:?}", report.events);

        let report = scan_mono(config(1, 5, 0), &[5, i16::MIN]);
        assert_eq!(
            report.events,
            vec![DefectEvent::Overmodulation {
                channel: 0,
                sample_index: 1,
            }]
        );

        // A leading zero repeats the initial value and crosses the threshold at frame 0.
        let report = scan_mono(config(1, 5, 0), &[0, 0, 0]);
        assert!(report.events.is_empty(), "{:?}", report.events);
    }

    #[test]
    fn huge_debounce_saturates_instead_of_overflowing() {
        let config = DetectorConfig {
            no_warning_duration: 1e15,
            ..DetectorConfig::default()
        };
        config.validate().unwrap();
        assert_eq!(config.debounce_frames(48_000), u64::MAX);

        let mut scanner = DefectScanner::new(config, &mono16(48_000));
        for (frame, sample) in [100i16, i16::MIN, 100, i16::MIN].iter().enumerate() {
            scanner.analyse(frame as u64, &[(*sample as i32) << 16]);
        }
        assert_eq!(
            scanner.events(),
            &[DefectEvent::Overmodulation {
                channel: 0,
                sample_index: 1,
            }]
        );
    }

    #[test]
    fn sustained_clipping_is_later_seen_as_a_hold() {
        let mut samples = vec![1000i16];
        samples.extend([i16::MAX; 10]);
        let report = scan_mono(config(10, 3, 0), &samples);
        assert_eq!(report.events.len(), 2);
        assert_eq!(
            report.events[0],
            DefectEvent::Overmodulation {
                channel: 0,
                sample_index: 1,
            }
        );
        assert!(matches!(
            report.events[1],
            DefectEvent::Hold {
                channel: 0,
                start_sample_index: 2,
                ..
            }
        ));
    }

    #[test]
    fn hold_reports_start_and_level() {
        let report = scan_mono(config(10, 5, 0), &[16_384; 8]);
        match report.events.as_slice() {
            [DefectEvent::Hold {
                channel: 0,
                start_sample_index: 1,
                level_dbfs,
            }] => assert!((level_dbfs + 6.0206).abs() < 1e-3),
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn hold_debounce_suppresses_close_runs() {
        let mut samples = vec![1000i16; 10];
        samples.extend([2000i16; 10]);

        // First hold at frame 5, second run reaches the threshold at frame 15.
        let close = scan_mono(config(10, 5, 20), &samples);
        assert_eq!(close.events.len(), 1);
        assert_eq!(close.events[0].position(), 1);

        let apart = scan_mono(config(10, 5, 3), &samples);
        assert_eq!(
            apart
                .events
                .iter()
                .map(DefectEvent::position)
                .collect::<Vec<_>>(),
            vec![1, 11]
        );
    }

    #[test]
    fn quiet_hold_still_consumes_the_window() {
        // -60 dBFS is below the -50 dBFS floor.
        let mut samples = vec![33i16; 6];
        samples.extend([8000i16; 6]);

        let report = scan_mono(config(10, 5, 20), &samples);
        assert!(report.events.is_empty());

        let report = scan_mono(config(10, 5, 0), &samples);
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].position(), 7);
    }

    #[test]
    fn peak_points_at_largest_value() {
        let report = scan_mono(config(10, 5, 0), &[100, 50, 200, 150]);
        let location = report.peak.location.unwrap();
        assert_eq!(location.frame, 2);
        assert_eq!(location.channel, 0);
        let expected = amplitude_dbfs(200 << 16);
        assert!((report.peak.level_dbfs.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn channels_keep_separate_state_and_debounce() {
        let format = AudioFormat {
            channels: 2,
            ..mono16(1000)
        };
        let mut scanner = DefectScanner::new(config(4, 50, 1000), &format);
        for frame in 0..6u64 {
            scanner.analyse(frame, &[0, 0]);
        }
        assert_eq!(
            scanner.events(),
            &[
                DefectEvent::Silence {
                    channel: 0,
                    start_sample_index: 0,
                    detected_at: 3,
                },
                DefectEvent::Silence {
                    channel: 1,
                    start_sample_index: 0,
                    detected_at: 3,
                },
            ]
        );
        assert_eq!(scanner.finish(), crate::ERR_CONTAINS_SILENCE);
    }
}
