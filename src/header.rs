use std::io::Read;

use serde::Serialize;

use crate::{debug, error::FormatError, reader::ByteReader};

const WAVE_FORMAT_PCM: u16 = 1;
const FMT_CHUNK_BASE_SIZE: u32 = 16;

/// Width of one PCM sample in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SampleDepth {
    Pcm8,
    Pcm16,
    Pcm24,
}

impl SampleDepth {
    pub fn from_bits(bits: u16) -> Result<Self, FormatError> {
        match bits {
            8 => Ok(SampleDepth::Pcm8),
            16 => Ok(SampleDepth::Pcm16),
            24 => Ok(SampleDepth::Pcm24),
            other => Err(FormatError::UnsupportedBitDepth(other)),
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            SampleDepth::Pcm8 => 1,
            SampleDepth::Pcm16 => 2,
            SampleDepth::Pcm24 => 3,
        }
    }

    pub fn bits(self) -> u16 {
        self.bytes() as u16 * 8
    }
}

/// Format parameters of a PCM WAV file, fixed once the header is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub depth: SampleDepth,
    /// Declared length of the `data` chunk in bytes.
    pub payload_len: u32,
}

impl AudioFormat {
    pub fn bits_per_sample(&self) -> u16 {
        self.depth.bits()
    }

    /// Bytes in one frame (one sample for every channel).
    pub fn frame_size(&self) -> usize {
        self.depth.bytes() * self.channels as usize
    }

    /// Number of whole frames the declared payload holds.
    pub fn sample_count(&self) -> u64 {
        self.payload_len as u64 / self.frame_size() as u64
    }

    pub fn duration(&self) -> f64 {
        self.sample_count() as f64 / self.sample_rate as f64
    }
}

impl Serialize for AudioFormat {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("AudioFormat", 6)?;
        state.serialize_field("channels", &self.channels)?;
        state.serialize_field("sampleRate", &self.sample_rate)?;
        state.serialize_field("bitsPerSample", &self.bits_per_sample())?;
        state.serialize_field("payloadBytes", &self.payload_len)?;
        state.serialize_field("sampleCount", &self.sample_count())?;
        state.serialize_field("duration", &self.duration())?;
        state.end()
    }
}

/// Fields of the most recent `fmt ` chunk.
struct FmtFields {
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

/// Walks the RIFF chunk list up to the `data` chunk and leaves `reader`
/// positioned at the first payload byte.
pub fn parse_header<R: Read>(reader: &mut ByteReader<R>) -> Result<AudioFormat, FormatError> {
    if &reader.read_tag("RIFF marker")? != b"RIFF" {
        return Err(FormatError::BadContainer("missing RIFF marker"));
    }
    reader.skip(4, "RIFF size")?;
    if &reader.read_tag("WAVE marker")? != b"WAVE" {
        return Err(FormatError::BadContainer("missing WAVE marker"));
    }

    let mut fmt: Option<FmtFields> = None;
    loop {
        let id = reader.read_tag("chunk id")?;
        match &id {
            b"fmt " => {
                let size = reader.read_u32_le("fmt chunk size")?;
                let code = reader.read_u16_le("format code")?;
                if code != WAVE_FORMAT_PCM {
                    return Err(FormatError::UnsupportedCodec(code));
                }
                let channels = reader.read_u16_le("channel count")?;
                let sample_rate = reader.read_u32_le("sample rate")?;
                reader.skip(4, "byte rate")?;
                reader.skip(2, "block align")?;
                let bits_per_sample = reader.read_u16_le("bits per sample")?;
                if size > FMT_CHUNK_BASE_SIZE {
                    reader.skip((size - FMT_CHUNK_BASE_SIZE) as u64, "fmt extension")?;
                }
                fmt = Some(FmtFields {
                    channels,
                    sample_rate,
                    bits_per_sample,
                });
            }
            b"data" => {
                let payload_len = reader.read_u32_le("data chunk size")?;
                let Some(fmt) = fmt else {
                    return Err(FormatError::BadContainer("data chunk before fmt chunk"));
                };
                return build_format(fmt, payload_len);
            }
            _ => {
                let size = reader.read_u32_le("chunk size")?;
                debug!(
                    "skipping chunk {:?} ({} bytes)",
                    String::from_utf8_lossy(&id),
                    size
                );
                reader.skip(size as u64, "chunk body")?;
            }
        }
    }
}

fn build_format(fmt: FmtFields, payload_len: u32) -> Result<AudioFormat, FormatError> {
    if fmt.channels == 0 {
        return Err(FormatError::BadContainer("fmt chunk declares zero channels"));
    }
    if fmt.sample_rate == 0 {
        return Err(FormatError::BadContainer("fmt chunk declares a zero sample rate"));
    }
    Ok(AudioFormat {
        channels: fmt.channels,
        sample_rate: fmt.sample_rate,
        depth: SampleDepth::from_bits(fmt.bits_per_sample)?,
        payload_len,
    })
}
