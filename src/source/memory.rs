//! In-memory source over pre-chunked bytes.

use super::{Buffering, PullSource, Pull, Signals, SourceKind};
use crate::error::SourceError;
use std::collections::VecDeque;

/// Default internal buffer ceiling reported by in-memory sources (16 KB).
pub const DEFAULT_MEMORY_HIGH_WATER_MARK: usize = 16 * 1024;

/// A source whose whole content is known up front.
///
/// Every chunk is delivered as given, so tests can place chunk boundaries
/// precisely (for example between `\r` and `\n`).
#[derive(Debug, Default)]
pub struct MemorySource {
    chunks: VecDeque<Vec<u8>>,
    end_pulled: bool,
    high_water_mark: Option<usize>,
    signals: Option<Signals>,
    paused: bool,
}

impl MemorySource {
    /// Create a source delivering `chunks` in order, then end of data.
    pub fn from_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks
                .into_iter()
                .map(Into::into)
                .filter(|c: &Vec<u8>| !c.is_empty())
                .collect(),
            ..Self::default()
        }
    }

    /// Create a source delivering `bytes` in chunks of at most `chunk_size`.
    pub fn from_bytes(bytes: &[u8], chunk_size: usize) -> Self {
        Self::from_chunks(bytes.chunks(chunk_size.max(1)).map(<[u8]>::to_vec))
    }

    /// Override the reported internal buffer ceiling.
    pub fn with_high_water_mark(mut self, high_water_mark: usize) -> Self {
        self.high_water_mark = Some(high_water_mark);
        self
    }

    /// Bytes not yet pulled, including anything handed back by a reader.
    pub fn remaining(&self) -> Vec<u8> {
        self.chunks.iter().flatten().copied().collect()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn pending_items(&self) -> usize {
        self.chunks.len() + usize::from(!self.end_pulled)
    }
}

impl PullSource for MemorySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Memory
    }

    fn buffering(&self) -> Buffering {
        Buffering {
            high_water_mark: self
                .high_water_mark
                .unwrap_or(DEFAULT_MEMORY_HIGH_WATER_MARK),
            buffered: self.chunks.iter().map(Vec::len).sum(),
            ended: true,
        }
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn subscribe(&mut self, signals: Signals) {
        for _ in 0..self.pending_items() {
            signals.readable();
        }
        self.signals = Some(signals);
    }

    fn unsubscribe(&mut self) {
        self.signals = None;
    }

    fn pull(&mut self) -> Result<Pull, SourceError> {
        match self.chunks.pop_front() {
            Some(chunk) => Ok(Pull::Chunk(chunk)),
            None => {
                self.end_pulled = true;
                Ok(Pull::End)
            }
        }
    }

    fn unshift(&mut self, bytes: Vec<u8>) {
        if bytes.is_empty() {
            return;
        }
        self.chunks.push_front(bytes);
        // Data handed back after the end was pulled re-arms the end.
        let rearmed = std::mem::take(&mut self.end_pulled);
        if let Some(signals) = &self.signals {
            signals.readable();
            if rearmed {
                signals.readable();
            }
        }
    }
}
