use std::io::Read;

use crate::{decoder::SampleStream, error::FormatError, output::Output};

pub mod defects;
pub mod loudness;

/// A consumer of decoded frames. Every analyser sees the same frames in the
/// same order.
pub trait Analyser {
    fn analyse(&mut self, frame_index: u64, frame: &[i32]);

    /// Flushes pending state and returns exit-code flags.
    fn finish(&mut self) -> u8 {
        0
    }

    fn json(&self) -> Option<(String, serde_json::Value)> {
        None
    }
}

/// Feeds every remaining frame of `stream` to each analyser and returns the
/// number of frames read. On a read failure the analysers keep what they
/// saw up to that point.
pub fn run<R: Read>(
    stream: &mut SampleStream<R>,
    analysers: &mut [&mut dyn Analyser],
    output: &Output,
) -> Result<u64, FormatError> {
    let mut frame = vec![0; stream.format().channels as usize];
    while let Some(index) = stream.next_frame(&mut frame)? {
        for analyser in analysers.iter_mut() {
            analyser.analyse(index, &frame);
        }
        output.inc(1);
    }
    Ok(stream.frames_read())
}
