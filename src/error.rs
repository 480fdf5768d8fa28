use std::io;

use thiserror::Error;

use crate::analysers::defects::ScanReport;

/// Errors raised while reading a RIFF/WAVE stream.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Missing or garbled RIFF/WAVE marker, or a required chunk is absent.
    #[error("not a usable RIFF/WAVE container: {0}")]
    BadContainer(&'static str),

    /// The `fmt ` chunk declares something other than PCM.
    #[error("unsupported codec: format code {0}, only PCM (1) is handled")]
    UnsupportedCodec(u16),

    /// PCM with a sample width other than 8, 16 or 24 bits.
    #[error("unsupported sample depth: {0} bits per sample")]
    UnsupportedBitDepth(u16),

    /// The stream ended before a structurally required read completed.
    #[error("unexpected end of stream while reading {0}")]
    UnexpectedEnd(&'static str),

    /// Any other IO failure of the underlying source.
    #[error("read failed: {0}")]
    Io(#[source] io::Error),
}

impl FormatError {
    pub(crate) fn from_io(err: io::Error, what: &'static str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            FormatError::UnexpectedEnd(what)
        } else {
            FormatError::Io(err)
        }
    }
}

/// A scan that stopped early. The findings gathered before the failure are
/// kept in `partial`.
#[derive(Debug, Error)]
#[error("scan stopped after {} frames: {source}", .partial.frames_scanned)]
pub struct ScanError {
    #[source]
    pub source: FormatError,
    pub partial: ScanReport,
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] io::Error),

    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
