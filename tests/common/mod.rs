#![allow(dead_code)]

use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub use wavcheck::testutil::WavBuilder;

/// 16-bit mono PCM file bytes.
pub fn mono16(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
    WavBuilder::new(1, sample_rate, 16).pcm16(samples).build()
}

/// 20 samples of digital silence followed by a half-scale 440 Hz tone.
pub fn write_silence_then_tone<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
    tone_samples: usize,
) -> Result<(), Box<dyn Error>> {
    let mut samples = vec![0i16; 20];
    for n in 0..tone_samples {
        let theta = (n as f32 / sample_rate as f32) * 2.0 * std::f32::consts::PI * 440.0;
        let sample = (theta.sin() * (i16::MAX / 2) as f32) as i16;
        // Keep the tone away from zero so it never extends the silence.
        samples.push(if sample == 0 { 1 } else { sample });
    }

    let mut file = File::create(path)?;
    file.write_all(&mono16(sample_rate, &samples))?;
    Ok(())
}
