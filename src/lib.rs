//! Detection of digital silence, overmodulation and held samples in PCM WAV
//! files.
//!
//! [`header::parse_header`] walks the RIFF chunks, [`decoder::SampleStream`]
//! decodes the payload frame by frame and
//! [`analysers::defects::DefectScanner`] turns the samples into
//! [`events::DefectEvent`]s and a peak record.

pub mod analysers;
pub mod config;
pub mod decoder;
pub mod error;
pub mod events;
pub mod header;
pub mod inputs;
pub mod json;
pub mod output;
pub mod reader;
pub mod report;
pub mod states;

#[doc(hidden)]
pub mod testutil;

pub const ERR_CONTAINS_SILENCE: u8 = 0b0001;
pub const ERR_CONTAINS_OVERMODULATION: u8 = 0b0010;
pub const ERR_CONTAINS_HOLD: u8 = 0b0100;
pub const ERR_UNREADABLE: u8 = 0b1000;
