//! Chunk decoding for each encoding family.
//!
//! Sources deliver raw bytes in arbitrary chunks, so a multi-byte character
//! may straddle two chunks. [`ChunkDecoder`] holds such a partial sequence
//! until the next chunk completes it.

use crate::eol::Encoding;
use std::char::REPLACEMENT_CHARACTER;

/// Incremental decoder that turns source chunks into text.
#[derive(Debug, Clone)]
pub struct ChunkDecoder {
    encoding: Encoding,
    pending: Vec<u8>,
}

impl ChunkDecoder {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            pending: Vec::new(),
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Bytes of an incomplete character carried over from earlier chunks.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Decode `chunk`, appending complete characters to `out`.
    pub fn decode(&mut self, chunk: &[u8], out: &mut String) {
        match self.encoding {
            Encoding::Ascii => out.extend(chunk.iter().map(|&b| (b & 0x7f) as char)),
            Encoding::Binary | Encoding::Latin1 => out.extend(chunk.iter().map(|&b| b as char)),
            Encoding::Utf8 => self.decode_utf8(chunk, out),
            Encoding::Utf16Le | Encoding::Ucs2 => self.decode_utf16le(chunk, out),
        }
    }

    /// Flush an incomplete trailing sequence once no more input will arrive.
    pub fn finish(&mut self, out: &mut String) {
        if !self.pending.is_empty() {
            self.pending.clear();
            out.push(REPLACEMENT_CHARACTER);
        }
    }

    /// Take the carried bytes, leaving the decoder empty.
    pub fn take_pending(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending)
    }

    fn decode_utf8(&mut self, chunk: &[u8], out: &mut String) {
        let owned;
        let mut bytes: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            self.pending.extend_from_slice(chunk);
            owned = std::mem::take(&mut self.pending);
            &owned
        };

        loop {
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    out.push_str(text);
                    return;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&bytes[..valid]) {
                        out.push_str(text);
                    }
                    match err.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT_CHARACTER);
                            bytes = &bytes[valid + len..];
                        }
                        None => {
                            // Truncated sequence at the end of the chunk
                            self.pending.extend_from_slice(&bytes[valid..]);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn decode_utf16le(&mut self, chunk: &[u8], out: &mut String) {
        self.pending.extend_from_slice(chunk);
        let units: Vec<u16> = self
            .pending
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        let mut complete = units.len();
        if let Some(&last) = units.last() {
            if (0xD800..0xDC00).contains(&last) {
                // High surrogate waiting for its pair
                complete -= 1;
            }
        }

        out.extend(
            char::decode_utf16(units[..complete].iter().copied())
                .map(|r| r.unwrap_or(REPLACEMENT_CHARACTER)),
        );
        self.pending.drain(..complete * 2);
    }
}

/// Encode decoded text back into the bytes of `encoding`.
///
/// Used to hand unconsumed text back to a source.
pub fn encode(encoding: Encoding, text: &str) -> Vec<u8> {
    match encoding {
        Encoding::Utf8 => text.as_bytes().to_vec(),
        Encoding::Ascii | Encoding::Binary | Encoding::Latin1 => text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
            .collect(),
        Encoding::Utf16Le | Encoding::Ucs2 => {
            text.encode_utf16().flat_map(u16::to_le_bytes).collect()
        }
    }
}
