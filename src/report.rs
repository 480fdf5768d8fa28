//! Text reports written after a file has been scanned: a results table row,
//! a per-file info sheet and a WaveLab marker file.

use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{
    analysers::defects::ScanReport, config::ReportConfig, events::DefectEvent,
    header::AudioFormat, output::fmt_number,
};

const TABLE_COLUMNS: [&str; 10] = [
    "File name",
    "Bits per sample",
    "Channel count",
    "Sample freq",
    "Sample count",
    "File duration",
    "File size",
    "Peak channel",
    "Peak position",
    "Peak value",
];

/// Everything the reports need to know about one analysed file.
#[derive(Debug, Clone)]
pub struct FileSummary<'a> {
    pub path: &'a Path,
    pub file_size: u64,
    pub format: &'a AudioFormat,
    pub scan: &'a ScanReport,
}

impl FileSummary<'_> {
    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Values in [`TABLE_COLUMNS`] order. Peak channel is 1-based; a file
    /// without a peak shows 0 and -1.
    fn values(&self) -> [String; 10] {
        let (peak_channel, peak_position) = match self.scan.peak.location {
            Some(location) => (location.channel as i64 + 1, location.frame as i64),
            None => (0, -1),
        };
        [
            self.file_name(),
            self.format.bits_per_sample().to_string(),
            self.format.channels.to_string(),
            self.format.sample_rate.to_string(),
            self.format.sample_count().to_string(),
            fmt_number(self.format.duration()),
            self.file_size.to_string(),
            peak_channel.to_string(),
            peak_position.to_string(),
            fmt_number(self.scan.peak.level_dbfs.unwrap_or(f64::NEG_INFINITY)),
        ]
    }
}

/// Appends one row to the results table, writing the header first when the
/// table does not exist yet.
pub fn append_table_row(table: &Path, summary: &FileSummary) -> io::Result<()> {
    let needs_header = !table.exists();
    let file = OpenOptions::new().create(true).append(true).open(table)?;
    let mut out = BufWriter::new(file);
    if needs_header {
        writeln!(out, "{}", TABLE_COLUMNS.join("\t"))?;
    }
    writeln!(out, "{}", summary.values().join("\t"))?;
    out.flush()
}

/// Path of the info sheet: the audio file name with `.txt` appended.
pub fn info_path(audio: &Path) -> PathBuf {
    let mut name = audio.as_os_str().to_owned();
    name.push(".txt");
    PathBuf::from(name)
}

/// Path of the marker file: the audio file with its extension swapped.
pub fn markers_path(audio: &Path) -> PathBuf {
    audio.with_extension("mrk")
}

pub fn write_info(summary: &FileSummary) -> io::Result<PathBuf> {
    let path = info_path(summary.path);
    let mut out = BufWriter::new(File::create(&path)?);
    for (name, value) in TABLE_COLUMNS.iter().zip(summary.values()) {
        writeln!(out, "{name}\t{value}")?;
    }
    out.flush()?;
    Ok(path)
}

/// Renders the WaveLab marker list for `events`.
///
/// An event sharing its position with the next one is dropped. Events before
/// `start_position` seconds are skipped, and listing stops at the first event
/// inside the last `end_position` seconds.
pub fn render_markers(
    events: &[DefectEvent],
    format: &AudioFormat,
    config: &ReportConfig,
) -> String {
    let seconds = |position: u64| position as f64 / format.sample_rate as f64;
    let cutoff = config
        .end_position
        .map(|end| format.duration() - end as f64)
        .unwrap_or(f64::INFINITY);

    let mut out = String::from("Markers\n{\n");
    for (index, event) in events.iter().enumerate() {
        let position = event.position();
        if events
            .get(index + 1)
            .is_some_and(|next| next.position() == position)
        {
            continue;
        }
        if seconds(position) < config.start_position as f64 {
            continue;
        }
        if seconds(position) > cutoff {
            break;
        }

        out.push_str(&format!("\tMarker{}\n\t{{\n", index + 1));
        out.push_str(&format!("\t\tName={}\n", event.label()));
        out.push_str(&format!("\t\tPos={}\n", position));
        out.push_str("\t\tType=0\n\t\tFlags=0\n\t\tExtra=0\n\t}\n");
    }
    out.push_str("}\n");
    out
}

/// Writes the marker file next to the audio file. Nothing is written when
/// there are no events.
pub fn write_markers(
    summary: &FileSummary,
    config: &ReportConfig,
) -> io::Result<Option<PathBuf>> {
    if summary.scan.events.is_empty() {
        return Ok(None);
    }
    let path = markers_path(summary.path);
    std::fs::write(
        &path,
        render_markers(&summary.scan.events, summary.format, config),
    )?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        header::SampleDepth,
        states::{PeakLocation, PeakRecord},
    };
    use pretty_assertions::assert_eq;

    fn format() -> AudioFormat {
        // 10 seconds of 16-bit stereo at 100 Hz.
        AudioFormat {
            channels: 2,
            sample_rate: 100,
            depth: SampleDepth::Pcm16,
            payload_len: 4_000,
        }
    }

    fn scan(events: Vec<DefectEvent>) -> ScanReport {
        ScanReport {
            events,
            peak: PeakRecord {
                level_dbfs: Some(-3.0103),
                location: Some(PeakLocation {
                    frame: 42,
                    channel: 1,
                }),
            },
            frames_scanned: 1_000,
        }
    }

    fn clip(sample_index: u64) -> DefectEvent {
        DefectEvent::Overmodulation {
            channel: 0,
            sample_index,
        }
    }

    #[test]
    fn markers_skip_duplicates_and_respect_window() {
        let events = vec![
            clip(50),
            DefectEvent::Silence {
                channel: 0,
                start_sample_index: 150,
                detected_at: 160,
            },
            clip(150),
            DefectEvent::Hold {
                channel: 1,
                start_sample_index: 400,
                level_dbfs: -20.0,
            },
            clip(950),
            clip(990),
        ];
        let config = ReportConfig {
            start_position: 1.0,
            end_position: Some(1.0),
            ..ReportConfig::default()
        };

        let expected = "Markers\n{\n\
            \tMarker3\n\t{\n\t\tName=Overmodulation\n\t\tPos=150\n\
            \t\tType=0\n\t\tFlags=0\n\t\tExtra=0\n\t}\n\
            \tMarker4\n\t{\n\t\tName=Hold at -20 dBFS\n\t\tPos=400\n\
            \t\tType=0\n\t\tFlags=0\n\t\tExtra=0\n\t}\n\
            }\n";
        assert_eq!(render_markers(&events, &format(), &config), expected);
    }

    #[test]
    fn table_gets_a_single_header() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("results.txt");
        let audio = dir.path().join("take1.wav");
        let format = format();
        let scan = scan(vec![]);
        let summary = FileSummary {
            path: &audio,
            file_size: 4_044,
            format: &format,
            scan: &scan,
        };

        append_table_row(&table, &summary).unwrap();
        append_table_row(&table, &summary).unwrap();

        let text = std::fs::read_to_string(&table).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("File name\tBits per sample"));
        assert_eq!(lines[1], "take1.wav\t16\t2\t100\t1000\t10\t4044\t2\t42\t-3.01");
        assert_eq!(lines[1], lines[2]);
    }

    #[test]
    fn info_and_markers_land_next_to_the_audio() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("take2.wav");
        let format = format();
        let quiet = scan(vec![]);
        let summary = FileSummary {
            path: &audio,
            file_size: 10,
            format: &format,
            scan: &quiet,
        };

        let info = write_info(&summary).unwrap();
        assert_eq!(info, dir.path().join("take2.wav.txt"));
        let text = std::fs::read_to_string(info).unwrap();
        assert!(text.contains("Peak position\t42\n"));
        assert_eq!(write_markers(&summary, &ReportConfig::default()).unwrap(), None);

        let noisy = scan(vec![clip(5)]);
        let summary = FileSummary {
            scan: &noisy,
            ..summary
        };
        let markers = write_markers(&summary, &ReportConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(markers, dir.path().join("take2.mrk"));
    }
}
