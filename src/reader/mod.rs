//! Line segmentation engine.
//!
//! A [`LineReader`] owns one [`PullSource`] for its whole life. Source
//! chunks are decoded into a backlog, and lines are cut from the front of the
//! backlog one [`read`](LineReader::read) at a time. Source signals arrive on
//! a channel and are only acted on while the consumer drives the reader
//! through [`next_event`](LineReader::next_event) or
//! [`wait_event`](LineReader::wait_event), so consumer calls and source
//! signals never interleave.
//!
//! # Example
//!
//! ```
//! use linewise::{Event, LineReader, MemorySource, ReaderOptions};
//! use linewise::eol::EolMatch;
//!
//! let source = MemorySource::from_chunks(["foo\nba", "r\n"]);
//! let options = ReaderOptions::new().eol_match(EolMatch::Lf);
//! let mut reader = LineReader::new(source, options).unwrap();
//!
//! let mut lines = Vec::new();
//! while let Some(event) = reader.next_event() {
//!     match event {
//!         Event::Readable => {
//!             while let Some(line) = reader.read() {
//!                 lines.push(line);
//!             }
//!         }
//!         Event::End | Event::Close => {}
//!         Event::Error(err) => panic!("{}", err),
//!     }
//! }
//! assert_eq!(lines, ["foo", "bar"]);
//! assert_eq!(reader.line_count(), 2);
//! ```

pub mod backlog;
pub mod lifecycle;

pub use backlog::Backlog;
pub use lifecycle::{LifecycleState, Transition};

use crate::config::{ReaderConfig, ReaderOptions};
use crate::decode::{self, ChunkDecoder};
use crate::error::{ConfigError, ReaderError};
use crate::scanner::scan;
use crate::source::{signal_channel, Pull, PullSource, SourceSignal};
use crossbeam_channel::{Receiver, TryRecvError};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Notifications raised by a reader.
#[derive(Debug)]
pub enum Event {
    /// The backlog may now satisfy a read.
    Readable,
    /// The source is exhausted and every line was emitted. Raised once.
    End,
    /// A fatal condition; the reader closes right after.
    Error(ReaderError),
    /// The reader is torn down. Raised exactly once, always last.
    Close,
}

/// Pull-based line reader over a [`PullSource`].
pub struct LineReader<S: PullSource> {
    source: Option<S>,
    config: ReaderConfig,
    signals: Option<Receiver<SourceSignal>>,
    decoder: ChunkDecoder,
    backlog: Backlog,
    line_count: u64,
    state: LifecycleState,
    source_ended: bool,
    source_errored: bool,
    source_closed: bool,
    /// Items the source announced that have not been pulled yet.
    announced: usize,
    notifications: VecDeque<Event>,
}

impl<S: PullSource> LineReader<S> {
    /// Wrap `source`, validating `options` against it.
    ///
    /// The source is paused and subscribed; nothing is pulled until the
    /// reader is driven.
    pub fn new(mut source: S, options: ReaderOptions) -> Result<Self, ConfigError> {
        let config = options.validate(&source)?;

        source.pause();
        let (signals, receiver) = signal_channel();
        source.subscribe(signals);

        let mut reader = Self {
            source: Some(source),
            config,
            signals: Some(receiver),
            decoder: ChunkDecoder::new(config.encoding()),
            backlog: Backlog::new(),
            line_count: 0,
            state: LifecycleState::Idle,
            source_ended: false,
            source_errored: false,
            source_closed: false,
            announced: 0,
            notifications: VecDeque::new(),
        };
        reader.transition(Transition::Subscribed);
        debug!(
            encoding = %config.encoding(),
            eol = %config.eol_match(),
            max_line_length = config.max_line_length(),
            auto_destroy = config.auto_destroy_source(),
            "line reader attached"
        );
        Ok(reader)
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == LifecycleState::Closed
    }

    /// Number of lines emitted so far.
    pub fn line_count(&self) -> u64 {
        self.line_count
    }

    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    /// Close the reader and hand back its source, e.g. to wrap it again.
    pub fn into_source(mut self) -> Option<S> {
        self.close();
        self.source.take()
    }

    /// Try to produce the next complete line without blocking.
    ///
    /// Returns `None` when the backlog cannot satisfy the request; a pull is
    /// then scheduled and an [`Event::Readable`] follows once data arrives.
    /// After the reader closes this always returns `None`.
    pub fn read(&mut self) -> Option<String> {
        if self.state.is_closing() {
            return None;
        }
        if self.backlog.is_empty() {
            if !self.source_ended {
                self.transition(Transition::NeedData);
            }
            return None;
        }

        let source_ended = self.source_ended;
        let (content_len, whole_len, held_back, length) = {
            let window = self.backlog.as_str();
            let m = scan(window, self.config.eol_match());
            // A terminator-less tail, or one ending in a lone `\r`, may still
            // be completed by the next chunk.
            let held_back = m.consumes(window) && m.is_ambiguous() && !source_ended;
            let mut length = m.content.chars().count();
            // A trailing `\r` on a held-back tail may turn out to be half of
            // a `\r\n` terminator.
            if held_back && m.content.ends_with('\r') {
                length -= 1;
            }
            (m.content.len(), m.whole.len(), held_back, length)
        };

        if !self.config.allows_length(length) {
            self.fail(ReaderError::LineTooLong {
                limit: self.config.max_line_length(),
                length,
            });
            return None;
        }

        if held_back {
            self.transition(Transition::NeedData);
            return None;
        }

        let line = self.backlog.as_str()[..content_len].to_string();
        self.backlog.consume(whole_len);
        self.line_count += 1;

        if self.backlog.is_empty() && self.source_ended {
            debug!(lines = self.line_count, "final line emitted");
            self.transition(Transition::FinalLineRead);
            self.notifications.push_back(Event::End);
        }
        Some(line)
    }

    /// Next notification, processing pending source signals first.
    ///
    /// Returns `None` when nothing is pending; the reader is then waiting on
    /// its source (or fully closed). After each [`Event::Readable`] the
    /// consumer is expected to call [`read`](Self::read) until it returns
    /// `None`.
    pub fn next_event(&mut self) -> Option<Event> {
        self.poll_event(false)
    }

    /// Like [`next_event`](Self::next_event), but blocks until the source
    /// signals. Returns `None` only after the reader closed and all
    /// notifications were delivered.
    pub fn wait_event(&mut self) -> Option<Event> {
        self.poll_event(true)
    }

    /// Blocking iterator over the remaining lines.
    pub fn lines(&mut self) -> Lines<'_, S> {
        Lines { reader: self }
    }

    /// Tear the reader down immediately, whatever is left in the backlog.
    ///
    /// Unsubscribes from the source. With auto-destroy the source is
    /// destroyed; otherwise unconsumed bytes are handed back to it. Calling
    /// this again is a no-op. A pending [`Event::End`] is still delivered
    /// before [`Event::Close`].
    pub fn close(&mut self) {
        if self.state.is_closing() {
            return;
        }
        self.transition(Transition::CloseRequested);
        self.notifications.retain(|e| !matches!(e, Event::Readable));
        self.teardown();
    }

    fn poll_event(&mut self, blocking: bool) -> Option<Event> {
        loop {
            if let Some(event) = self.take_notification() {
                return Some(event);
            }
            if self.state.wants_chunk() && self.announced > 0 {
                self.pull_chunk();
                continue;
            }

            let receiver = self.signals.as_ref()?;
            let signal = if blocking {
                receiver.recv().unwrap_or(SourceSignal::Closed)
            } else {
                match receiver.try_recv() {
                    Ok(signal) => signal,
                    Err(TryRecvError::Empty) => return None,
                    Err(TryRecvError::Disconnected) => SourceSignal::Closed,
                }
            };
            self.handle_signal(signal);
        }
    }

    fn take_notification(&mut self) -> Option<Event> {
        let event = self.notifications.pop_front()?;
        if matches!(event, Event::End) {
            self.close();
        }
        Some(event)
    }

    fn handle_signal(&mut self, signal: SourceSignal) {
        match signal {
            SourceSignal::Readable => {
                if !self.source_ended {
                    self.announced += 1;
                }
            }
            SourceSignal::Error(err) => self.fail(ReaderError::Source(err)),
            SourceSignal::Closed => {
                debug!("source closed underneath reader");
                self.source_closed = true;
                self.close();
            }
        }
    }

    fn pull_chunk(&mut self) {
        self.announced -= 1;
        let Some(source) = self.source.as_mut() else {
            return;
        };

        match source.pull() {
            Ok(Pull::Chunk(bytes)) => {
                if bytes.is_empty() {
                    trace!("empty chunk ignored");
                    return;
                }
                let before = self.backlog.len();
                self.decoder.decode(&bytes, self.backlog.tail_mut());
                trace!(bytes = bytes.len(), backlog = self.backlog.len(), "pulled chunk");
                // A chunk holding only part of a character adds no text yet.
                if self.backlog.len() > before {
                    self.transition(Transition::ChunkPulled);
                    self.notify_readable();
                }
            }
            Ok(Pull::End) => {
                self.source_ended = true;
                self.announced = 0;
                self.decoder.finish(self.backlog.tail_mut());
                let backlog_empty = self.backlog.is_empty();
                self.transition(Transition::EndPulled { backlog_empty });
                if backlog_empty {
                    debug!(lines = self.line_count, "source ended with empty backlog");
                    self.notifications.push_back(Event::End);
                } else {
                    debug!(backlog = self.backlog.len(), "source ended, draining backlog");
                    self.notify_readable();
                }
            }
            Err(err) => self.fail(ReaderError::Source(err)),
        }
    }

    fn notify_readable(&mut self) {
        if !matches!(self.notifications.back(), Some(Event::Readable)) {
            self.notifications.push_back(Event::Readable);
        }
    }

    fn fail(&mut self, err: ReaderError) {
        if self.state.is_closing() {
            return;
        }
        warn!(error = %err, lines = self.line_count, "line reader failed");
        if matches!(err, ReaderError::Source(_)) {
            self.source_errored = true;
        }
        self.notifications.retain(|e| !matches!(e, Event::Readable));
        self.notifications.push_back(Event::Error(err));
        self.transition(Transition::Failed);
        self.teardown();
    }

    fn teardown(&mut self) {
        self.signals = None;
        if let Some(source) = self.source.as_mut() {
            source.unsubscribe();
            if self.source_closed {
                // Nothing to return bytes to or destroy.
            } else if self.config.auto_destroy_source() {
                match source.destroy() {
                    Ok(()) => debug!("source destroyed"),
                    Err(err) => warn!(error = %err, "failed to destroy source"),
                }
            } else if !self.source_errored {
                let mut bytes = decode::encode(self.config.encoding(), self.backlog.as_str());
                bytes.extend(self.decoder.take_pending());
                if !bytes.is_empty() {
                    debug!(bytes = bytes.len(), "returning unconsumed bytes to source");
                    source.unshift(bytes);
                }
            }
        }
        self.backlog.clear();
        self.transition(Transition::Released);
        self.notifications.push_back(Event::Close);
        debug!(lines = self.line_count, "line reader closed");
    }

    fn transition(&mut self, transition: Transition) {
        match self.state.next(transition) {
            Some(next) => {
                if next != self.state {
                    trace!(from = ?self.state, to = ?next, "lifecycle");
                }
                self.state = next;
            }
            None => trace!(state = ?self.state, ?transition, "transition ignored"),
        }
    }
}

impl<S: PullSource> Drop for LineReader<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Blocking iterator returned by [`LineReader::lines`].
pub struct Lines<'a, S: PullSource> {
    reader: &'a mut LineReader<S>,
}

impl<S: PullSource> Iterator for Lines<'_, S> {
    type Item = Result<String, ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.reader.read() {
                return Some(Ok(line));
            }
            match self.reader.wait_event()? {
                Event::Error(err) => return Some(Err(err)),
                Event::Readable | Event::End | Event::Close => continue,
            }
        }
    }
}
