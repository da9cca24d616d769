//! Source fed from another owner, possibly on another thread.
//!
//! [`StreamSource::pair`] returns the source together with a
//! [`StreamWriter`]. Every written chunk raises one readiness signal on
//! whichever reader is subscribed at that moment.

use super::{Buffering, PullSource, Pull, Signals, SourceKind};
use crate::error::SourceError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Default internal buffer ceiling for fed sources (16 KB).
pub const DEFAULT_STREAM_HIGH_WATER_MARK: usize = 16 * 1024;

#[derive(Debug, Default)]
struct Shared {
    queue: VecDeque<Vec<u8>>,
    ended: bool,
    end_pulled: bool,
    error: Option<SourceError>,
    signals: Option<Signals>,
}

impl Shared {
    fn pending_items(&self) -> usize {
        self.queue.len() + usize::from(self.ended && !self.end_pulled)
    }
}

/// Pull side of a fed source.
#[derive(Debug)]
pub struct StreamSource {
    shared: Arc<Mutex<Shared>>,
    kind: SourceKind,
    high_water_mark: usize,
}

/// Push side of a fed source. Dropping the writer ends the stream.
#[derive(Debug)]
pub struct StreamWriter {
    shared: Arc<Mutex<Shared>>,
}

impl StreamSource {
    pub fn pair() -> (StreamWriter, StreamSource) {
        Self::pair_with_kind(SourceKind::Stream)
    }

    pub(crate) fn pair_with_kind(kind: SourceKind) -> (StreamWriter, StreamSource) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let writer = StreamWriter {
            shared: Arc::clone(&shared),
        };
        let source = StreamSource {
            shared,
            kind,
            high_water_mark: DEFAULT_STREAM_HIGH_WATER_MARK,
        };
        (writer, source)
    }

    pub fn with_high_water_mark(mut self, high_water_mark: usize) -> Self {
        self.high_water_mark = high_water_mark;
        self
    }

    /// Bytes queued but not yet pulled.
    pub fn remaining(&self) -> Vec<u8> {
        self.shared.lock().queue.iter().flatten().copied().collect()
    }

    /// Mark the stream ended and drop queued data after a teardown.
    pub(crate) fn shut(&self) {
        let mut shared = self.shared.lock();
        shared.queue.clear();
        shared.ended = true;
        shared.end_pulled = true;
        if let Some(signals) = &shared.signals {
            signals.closed();
        }
    }
}

impl StreamWriter {
    /// Queue a chunk. Ignored once the stream has ended.
    pub fn write(&self, chunk: impl Into<Vec<u8>>) {
        let chunk = chunk.into();
        let mut shared = self.shared.lock();
        if shared.ended || chunk.is_empty() {
            return;
        }
        shared.queue.push_back(chunk);
        if let Some(signals) = &shared.signals {
            signals.readable();
        }
    }

    /// Signal that no more data follows.
    pub fn end(&self) {
        let mut shared = self.shared.lock();
        if shared.ended {
            return;
        }
        shared.ended = true;
        if let Some(signals) = &shared.signals {
            signals.readable();
        }
    }

    /// Report a failure to the subscribed reader, or to the next one.
    pub fn fail(&self, err: SourceError) {
        let mut shared = self.shared.lock();
        if let Some(signals) = &shared.signals {
            signals.error(err);
            return;
        }
        shared.error = Some(err);
    }
}

impl Drop for StreamWriter {
    fn drop(&mut self) {
        self.end();
    }
}

impl PullSource for StreamSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn buffering(&self) -> Buffering {
        let shared = self.shared.lock();
        Buffering {
            high_water_mark: self.high_water_mark,
            buffered: shared.queue.iter().map(Vec::len).sum(),
            ended: shared.ended,
        }
    }

    fn pause(&mut self) {}

    fn subscribe(&mut self, signals: Signals) {
        let mut shared = self.shared.lock();
        for _ in 0..shared.pending_items() {
            signals.readable();
        }
        if let Some(err) = shared.error.take() {
            signals.error(err);
        }
        shared.signals = Some(signals);
    }

    fn unsubscribe(&mut self) {
        self.shared.lock().signals = None;
    }

    fn pull(&mut self) -> Result<Pull, SourceError> {
        let mut shared = self.shared.lock();
        if let Some(chunk) = shared.queue.pop_front() {
            return Ok(Pull::Chunk(chunk));
        }
        if shared.ended {
            shared.end_pulled = true;
            return Ok(Pull::End);
        }
        Ok(Pull::Chunk(Vec::new()))
    }

    fn unshift(&mut self, bytes: Vec<u8>) {
        if bytes.is_empty() {
            return;
        }
        let mut shared = self.shared.lock();
        shared.queue.push_front(bytes);
        // Data handed back after the end was pulled re-arms the end.
        let rearmed = shared.ended && std::mem::take(&mut shared.end_pulled);
        if let Some(signals) = &shared.signals {
            signals.readable();
            if rearmed {
                signals.readable();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{signal_channel, SourceSignal};

    #[test]
    fn test_writes_signal_subscriber() {
        let (writer, mut source) = StreamSource::pair();
        writer.write("early");
        let (signals, rx) = signal_channel();
        source.subscribe(signals);
        assert_eq!(rx.try_iter().count(), 1);

        writer.write("late");
        writer.end();
        assert_eq!(rx.try_iter().count(), 2);

        assert_eq!(source.pull().unwrap(), Pull::Chunk(b"early".to_vec()));
        assert_eq!(source.pull().unwrap(), Pull::Chunk(b"late".to_vec()));
        assert_eq!(source.pull().unwrap(), Pull::End);
    }

    #[test]
    fn test_pull_before_data_is_empty() {
        let (_writer, mut source) = StreamSource::pair();
        assert_eq!(source.pull().unwrap(), Pull::Chunk(Vec::new()));
        assert!(!source.buffering().ended);
    }

    #[test]
    fn test_failure_held_until_subscribe() {
        let (writer, mut source) = StreamSource::pair();
        writer.fail(SourceError::Other("boom".into()));
        let (signals, rx) = signal_channel();
        source.subscribe(signals);
        let received: Vec<_> = rx.try_iter().collect();
        assert!(matches!(received.as_slice(), [SourceSignal::Error(_)]));
    }

    #[test]
    fn test_dropping_writer_ends_stream() {
        let (writer, mut source) = StreamSource::pair();
        writer.write("x");
        drop(writer);
        assert!(source.buffering().ended);
        assert_eq!(source.pull().unwrap(), Pull::Chunk(b"x".to_vec()));
        assert_eq!(source.pull().unwrap(), Pull::End);
    }

    #[test]
    fn test_unshift_after_end_rearms_end() {
        let (writer, mut source) = StreamSource::pair();
        writer.write("xy");
        writer.end();
        assert_eq!(source.pull().unwrap(), Pull::Chunk(b"xy".to_vec()));
        assert_eq!(source.pull().unwrap(), Pull::End);

        let (signals, rx) = signal_channel();
        source.subscribe(signals);
        assert_eq!(rx.try_iter().count(), 0);
        source.unshift(b"y".to_vec());
        assert_eq!(rx.try_iter().count(), 2);
        assert_eq!(source.pull().unwrap(), Pull::Chunk(b"y".to_vec()));
        assert_eq!(source.pull().unwrap(), Pull::End);
    }
}
