use std::io::Read;

use crate::{
    error::FormatError,
    header::{AudioFormat, SampleDepth, parse_header},
    reader::ByteReader,
};

/// Decodes one little-endian PCM sample into the high-order bytes of an
/// `i32`, so every depth shares the same full-scale reference.
///
/// `bytes` must hold exactly `depth.bytes()` bytes.
pub fn decode_sample(depth: SampleDepth, bytes: &[u8]) -> i32 {
    match depth {
        SampleDepth::Pcm8 => i32::from_le_bytes([0, 0, 0, bytes[0]]),
        SampleDepth::Pcm16 => i32::from_le_bytes([0, 0, bytes[0], bytes[1]]),
        SampleDepth::Pcm24 => i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]),
    }
}

/// Pulls whole frames of decoded samples out of the `data` payload.
///
/// The stream is finite and cannot be rewound: it stops once the declared
/// payload holds no further complete frame.
#[derive(Debug)]
pub struct SampleStream<R> {
    reader: ByteReader<R>,
    format: AudioFormat,
    raw: Vec<u8>,
    frames_total: u64,
    frames_read: u64,
}

impl<R: Read> SampleStream<R> {
    /// `reader` must be positioned at the start of the payload, as
    /// [`crate::header::parse_header`] leaves it.
    pub fn new(reader: ByteReader<R>, format: AudioFormat) -> Self {
        Self {
            reader,
            format,
            raw: vec![0; format.frame_size()],
            frames_total: format.sample_count(),
            frames_read: 0,
        }
    }

    /// Parses the header of `source` and returns a stream over its payload.
    pub fn open(source: R) -> Result<Self, FormatError> {
        let mut reader = ByteReader::new(source);
        let format = parse_header(&mut reader)?;
        Ok(Self::new(reader, format))
    }

    pub fn format(&self) -> &AudioFormat {
        &self.format
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Decodes the next frame into `frame`, which must hold one slot per
    /// channel. Returns the frame index, or `None` once the payload is spent.
    pub fn next_frame(&mut self, frame: &mut [i32]) -> Result<Option<u64>, FormatError> {
        if self.frames_read >= self.frames_total {
            return Ok(None);
        }
        self.reader.read_exact(&mut self.raw, "sample frame")?;

        let width = self.format.depth.bytes();
        for (slot, bytes) in frame.iter_mut().zip(self.raw.chunks_exact(width)) {
            *slot = decode_sample(self.format.depth, bytes);
        }

        let index = self.frames_read;
        self.frames_read += 1;
        Ok(Some(index))
    }
}

/// One decoded sample with its position in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub frame: u64,
    pub channel: u16,
    pub value: i32,
}

/// Flat view of a [`SampleStream`] in interleaved channel order.
pub struct Samples<R> {
    stream: SampleStream<R>,
    frame: Vec<i32>,
    frame_index: u64,
    next_channel: usize,
    done: bool,
}

impl<R: Read> IntoIterator for SampleStream<R> {
    type Item = Result<Sample, FormatError>;
    type IntoIter = Samples<R>;

    fn into_iter(self) -> Self::IntoIter {
        let channels = self.format.channels as usize;
        Samples {
            stream: self,
            frame: vec![0; channels],
            frame_index: 0,
            next_channel: channels,
            done: false,
        }
    }
}

impl<R: Read> Iterator for Samples<R> {
    type Item = Result<Sample, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.next_channel == self.frame.len() {
            match self.stream.next_frame(&mut self.frame) {
                Ok(Some(index)) => {
                    self.frame_index = index;
                    self.next_channel = 0;
                }
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }

        let channel = self.next_channel;
        self.next_channel += 1;
        Some(Ok(Sample {
            frame: self.frame_index,
            channel: channel as u16,
            value: self.frame[channel],
        }))
    }
}
