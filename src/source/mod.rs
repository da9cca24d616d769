//! Pull-source contract and the sources shipped with the crate.
//!
//! A source never pushes data at a reader. It announces that something can
//! be pulled by raising [`SourceSignal::Readable`] on the channel it was
//! subscribed with, exactly once per pullable item (a chunk, or the end of
//! data), and hands the item over on the next [`PullSource::pull`].
//!
//! - [`MemorySource`]: pre-chunked in-memory bytes
//! - [`ReadSource`]: any [`std::io::Read`], including files
//! - [`StreamSource`]: fed from elsewhere through a [`StreamWriter`]
//! - [`SocketSource`]: a TCP stream read on a background thread

pub mod memory;
pub mod read;
pub mod socket;
pub mod stream;

pub use memory::MemorySource;
pub use read::ReadSource;
pub use socket::SocketSource;
pub use stream::{StreamSource, StreamWriter};

use crate::error::SourceError;
use crossbeam_channel::{Receiver, Sender};

/// Readiness, failure and teardown notifications raised by a source.
#[derive(Debug)]
pub enum SourceSignal {
    /// One more item can be pulled.
    Readable,
    /// The source failed and must not be read further.
    Error(SourceError),
    /// The source released its underlying resource.
    Closed,
}

/// Sending half of a reader's signal queue, handed to a source on subscribe.
#[derive(Debug, Clone)]
pub struct Signals {
    tx: Sender<SourceSignal>,
}

impl Signals {
    // A failed send means the reader dropped its receiver, i.e. it closed.

    pub fn readable(&self) {
        let _ = self.tx.send(SourceSignal::Readable);
    }

    pub fn error(&self, err: SourceError) {
        let _ = self.tx.send(SourceSignal::Error(err));
    }

    pub fn closed(&self) {
        let _ = self.tx.send(SourceSignal::Closed);
    }
}

/// Create a signal queue: the [`Signals`] half goes to the source.
pub fn signal_channel() -> (Signals, Receiver<SourceSignal>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (Signals { tx }, rx)
}

/// Result of a single pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pull {
    /// Next chunk of raw bytes. An empty chunk carries nothing and is ignored.
    Chunk(Vec<u8>),
    /// No more data will ever be delivered.
    End,
}

/// What a source is backed by. Only file and socket sources may be torn
/// down automatically by a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Memory,
    File,
    Socket,
    Stream,
}

impl SourceKind {
    #[inline]
    pub fn is_destroy_safe(self) -> bool {
        matches!(self, SourceKind::File | SourceKind::Socket)
    }
}

/// Snapshot of a source's internal buffering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buffering {
    /// Largest amount of data the source buffers internally.
    pub high_water_mark: usize,
    /// Bytes currently buffered.
    pub buffered: usize,
    /// Whether the source has already received all of its data.
    pub ended: bool,
}

/// Capabilities a reader requires from the source it wraps.
pub trait PullSource {
    fn kind(&self) -> SourceKind;

    fn buffering(&self) -> Buffering;

    /// Stop any self-driven delivery; data only moves on [`pull`](Self::pull).
    fn pause(&mut self);

    /// Start raising signals on `signals`, announcing items already held.
    fn subscribe(&mut self, signals: Signals);

    fn unsubscribe(&mut self);

    /// Synchronous, non-blocking pull of the next item.
    fn pull(&mut self) -> Result<Pull, SourceError>;

    /// Put bytes back in front of anything not yet pulled.
    fn unshift(&mut self, bytes: Vec<u8>);

    fn can_destroy(&self) -> bool {
        false
    }

    /// Release the underlying resource.
    fn destroy(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Whether the underlying resource is still held.
    fn is_open(&self) -> bool {
        true
    }
}
