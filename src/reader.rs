use std::io::{self, Read};

use crate::error::FormatError;

/// Little-endian cursor over a byte source. Every read is exact: a short read
/// surfaces as [`FormatError::UnexpectedEnd`].
#[derive(Debug)]
pub struct ByteReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn read_exact(&mut self, buf: &mut [u8], what: &'static str) -> Result<(), FormatError> {
        self.inner
            .read_exact(buf)
            .map_err(|err| FormatError::from_io(err, what))?;
        self.position += buf.len() as u64;
        Ok(())
    }

    pub fn read_tag(&mut self, what: &'static str) -> Result<[u8; 4], FormatError> {
        let mut tag = [0u8; 4];
        self.read_exact(&mut tag, what)?;
        Ok(tag)
    }

    pub fn read_u16_le(&mut self, what: &'static str) -> Result<u16, FormatError> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf, what)?;
        Ok(u16::from_le_bytes(buf))
    }

    pub fn read_u32_le(&mut self, what: &'static str) -> Result<u32, FormatError> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf, what)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Discards exactly `count` bytes.
    pub fn skip(&mut self, count: u64, what: &'static str) -> Result<(), FormatError> {
        let skipped = io::copy(&mut (&mut self.inner).take(count), &mut io::sink())
            .map_err(|err| FormatError::from_io(err, what))?;
        self.position += skipped;
        if skipped < count {
            return Err(FormatError::UnexpectedEnd(what));
        }
        Ok(())
    }
}
