//! Source over any blocking [`Read`], such as a file or stdin.

use super::{Buffering, PullSource, Pull, Signals, SourceKind};
use crate::error::SourceError;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::trace;

/// Default pull size, matching the usual file stream buffer (64 KB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// A source pulling up to `chunk_size` bytes per pull from a reader.
///
/// Reads are assumed to complete promptly (files, pipes that are already
/// filled). Destroying the source drops the reader and closes its handle.
#[derive(Debug)]
pub struct ReadSource<R: Read> {
    reader: Option<R>,
    kind: SourceKind,
    chunk_size: usize,
    unshifted: VecDeque<Vec<u8>>,
    end_pulled: bool,
    signals: Option<Signals>,
}

impl ReadSource<File> {
    /// Open a file as a destroyable source.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::with_kind(file, SourceKind::File))
    }
}

impl<R: Read> ReadSource<R> {
    /// Wrap a generic byte stream.
    pub fn new(reader: R) -> Self {
        Self::with_kind(reader, SourceKind::Stream)
    }

    pub fn with_kind(reader: R, kind: SourceKind) -> Self {
        Self {
            reader: Some(reader),
            kind,
            chunk_size: DEFAULT_CHUNK_SIZE,
            unshifted: VecDeque::new(),
            end_pulled: false,
            signals: None,
        }
    }

    /// Set the maximum bytes returned by one pull.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn announce_next(&self) {
        if let Some(signals) = &self.signals {
            signals.readable();
        }
    }

    fn read_chunk(&mut self) -> Result<Pull, SourceError> {
        let reader = match self.reader.as_mut() {
            Some(reader) => reader,
            None => {
                self.end_pulled = true;
                return Ok(Pull::End);
            }
        };

        let mut buf = vec![0u8; self.chunk_size];
        let n = loop {
            match reader.read(&mut buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(SourceError::Io(e)),
            }
        };

        if n == 0 {
            self.end_pulled = true;
            return Ok(Pull::End);
        }
        buf.truncate(n);
        trace!(bytes = n, "read chunk");
        // Something always follows a chunk: more data or the end.
        self.announce_next();
        Ok(Pull::Chunk(buf))
    }
}

impl<R: Read> PullSource for ReadSource<R> {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn buffering(&self) -> Buffering {
        Buffering {
            high_water_mark: self.chunk_size,
            buffered: self.unshifted.iter().map(Vec::len).sum(),
            ended: self.end_pulled,
        }
    }

    fn pause(&mut self) {}

    fn subscribe(&mut self, signals: Signals) {
        let items = self.unshifted.len() + usize::from(!self.end_pulled);
        for _ in 0..items {
            signals.readable();
        }
        self.signals = Some(signals);
    }

    fn unsubscribe(&mut self) {
        self.signals = None;
    }

    fn pull(&mut self) -> Result<Pull, SourceError> {
        match self.unshifted.pop_front() {
            Some(bytes) => Ok(Pull::Chunk(bytes)),
            None => self.read_chunk(),
        }
    }

    fn unshift(&mut self, bytes: Vec<u8>) {
        if bytes.is_empty() {
            return;
        }
        self.unshifted.push_front(bytes);
        self.announce_next();
        // Data handed back after the end was pulled re-arms the end.
        if std::mem::take(&mut self.end_pulled) {
            self.announce_next();
        }
    }

    fn can_destroy(&self) -> bool {
        true
    }

    fn destroy(&mut self) -> Result<(), SourceError> {
        if self.reader.take().is_some() {
            self.unshifted.clear();
            if let Some(signals) = &self.signals {
                signals.closed();
            }
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.reader.is_some()
    }
}
