//! Source lifecycle state machine.
//!
//! The reader never branches on loose flags to decide what a source signal
//! means; it feeds a [`Transition`] into [`LifecycleState::next`] and acts
//! on the resulting state. Transitions that are not legal from the current
//! state yield `None` and leave the reader where it was.

/// Where a reader is in its relationship with its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, not yet subscribed.
    Idle,
    /// Waiting for the source to announce a chunk.
    AwaitingChunk,
    /// The backlog may satisfy a read.
    DataBuffered,
    /// The source is exhausted and the last line has been emitted.
    Ending,
    /// Teardown in progress.
    Closing,
    /// Torn down; nothing more is read.
    Closed,
}

/// Inputs that move the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Signals are connected.
    Subscribed,
    /// A pull produced text.
    ChunkPulled,
    /// A pull reported end of data.
    EndPulled { backlog_empty: bool },
    /// A read could not be satisfied from the backlog.
    NeedData,
    /// A read returned the last line of an ended source.
    FinalLineRead,
    /// The source raised an error or a fatal condition was hit.
    Failed,
    /// `close()` was requested.
    CloseRequested,
    /// Teardown finished.
    Released,
}

impl LifecycleState {
    /// The state after `transition`, or `None` if it is not legal here.
    pub fn next(self, transition: Transition) -> Option<LifecycleState> {
        use LifecycleState::*;
        use Transition::*;

        match (self, transition) {
            (Closed, _) => None,
            (Closing, Released) => Some(Closed),
            (Closing, _) => None,
            (_, Failed) | (_, CloseRequested) => Some(Closing),

            (Idle, Subscribed) => Some(AwaitingChunk),
            (AwaitingChunk, ChunkPulled) => Some(DataBuffered),
            (AwaitingChunk, EndPulled { backlog_empty: true }) => Some(Ending),
            (AwaitingChunk, EndPulled { backlog_empty: false }) => Some(DataBuffered),
            (AwaitingChunk, NeedData) | (DataBuffered, NeedData) => Some(AwaitingChunk),
            (DataBuffered, FinalLineRead) => Some(Ending),
            _ => None,
        }
    }

    /// True once close has begun.
    #[inline]
    pub fn is_closing(self) -> bool {
        matches!(self, LifecycleState::Closing | LifecycleState::Closed)
    }

    /// True when the reader wants the next chunk pulled.
    #[inline]
    pub fn wants_chunk(self) -> bool {
        self == LifecycleState::AwaitingChunk
    }
}
