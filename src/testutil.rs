//! In-memory RIFF/WAVE fixtures shared by unit and integration tests.

pub struct WavBuilder {
    channels: u16,
    sample_rate: u32,
    bits: u16,
    format_code: u16,
    fmt_extension: Vec<u8>,
    leading: Vec<([u8; 4], Vec<u8>)>,
    trailing: Vec<([u8; 4], Vec<u8>)>,
    payload: Vec<u8>,
    declared_len: Option<u32>,
}

impl WavBuilder {
    pub fn new(channels: u16, sample_rate: u32, bits: u16) -> Self {
        Self {
            channels,
            sample_rate,
            bits,
            format_code: 1,
            fmt_extension: Vec::new(),
            leading: Vec::new(),
            trailing: Vec::new(),
            payload: Vec::new(),
            declared_len: None,
        }
    }

    pub fn format_code(mut self, code: u16) -> Self {
        self.format_code = code;
        self
    }

    pub fn fmt_extension(mut self, bytes: Vec<u8>) -> Self {
        self.fmt_extension = bytes;
        self
    }

    /// Chunk placed before `fmt `.
    pub fn leading_chunk(mut self, id: [u8; 4], body: Vec<u8>) -> Self {
        self.leading.push((id, body));
        self
    }

    /// Chunk placed between `fmt ` and `data`.
    pub fn chunk(mut self, id: [u8; 4], body: Vec<u8>) -> Self {
        self.trailing.push((id, body));
        self
    }

    pub fn payload(mut self, bytes: Vec<u8>) -> Self {
        self.payload = bytes;
        self
    }

    pub fn pcm16(self, samples: &[i16]) -> Self {
        let bytes = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        self.payload(bytes)
    }

    /// Low three bytes of each sample, little-endian.
    pub fn pcm24(self, samples: &[i32]) -> Self {
        let bytes = samples
            .iter()
            .flat_map(|s| {
                let [a, b, c, _] = s.to_le_bytes();
                [a, b, c]
            })
            .collect();
        self.payload(bytes)
    }

    /// Overrides the `data` chunk size written in the header.
    pub fn declared_len(mut self, len: u32) -> Self {
        self.declared_len = Some(len);
        self
    }

    pub fn fmt_chunk_bytes(&self) -> Vec<u8> {
        let block_align = self.channels * (self.bits / 8);
        let mut out = Vec::new();
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&(16 + self.fmt_extension.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.format_code.to_le_bytes());
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&(self.sample_rate * block_align as u32).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&self.bits.to_le_bytes());
        out.extend_from_slice(&self.fmt_extension);
        out
    }

    pub fn build(&self) -> Vec<u8> {
        let mut body = b"WAVE".to_vec();
        for (id, chunk) in &self.leading {
            push_chunk(&mut body, id, chunk);
        }
        body.extend(self.fmt_chunk_bytes());
        for (id, chunk) in &self.trailing {
            push_chunk(&mut body, id, chunk);
        }
        body.extend_from_slice(b"data");
        let declared = self.declared_len.unwrap_or(self.payload.len() as u32);
        body.extend_from_slice(&declared.to_le_bytes());
        body.extend_from_slice(&self.payload);

        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend(body);
        out
    }
}

fn push_chunk(out: &mut Vec<u8>, id: &[u8; 4], body: &[u8]) {
    out.extend_from_slice(id);
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
}
