//! linewise: line segmentation over pull-based byte sources
//!
//! This library splits a byte source into lines without ever holding the
//! whole input in memory. It pulls chunks only when a read cannot be
//! satisfied from what it already has.
//!
//! # Features
//!
//! - **Encoding aware**: ascii, binary, latin1, utf8 and utf16le text, with
//!   characters split across chunks reassembled
//! - **EOL dialects**: from strict CRLF up to every Unicode line break
//! - **Bounded lines**: a per-reader maximum line length, checked in characters
//! - **Source hygiene**: unread bytes are handed back to the source on close,
//!   or the source is destroyed when asked to
//!
//! # Example
//!
//! ```rust,no_run
//! use linewise::{LineReader, ReadSource, ReaderOptions};
//! use linewise::eol::EolMatch;
//!
//! let source = ReadSource::open("access.log").unwrap();
//! let options = ReaderOptions::new().eol_match(EolMatch::Lf).max_line_length(0);
//! let mut reader = LineReader::new(source, options).unwrap();
//!
//! for line in reader.lines() {
//!     println!("{}", line.unwrap());
//! }
//! ```

pub mod config;
pub mod decode;
pub mod eol;
pub mod error;
pub mod output;
pub mod reader;
pub mod scanner;
pub mod source;

// Re-export commonly used types
pub use config::{ReaderConfig, ReaderOptions};
pub use eol::{encodings, eol_matches, Encoding, EolMatch};
pub use error::{ConfigError, LinewiseError, ReaderError, SourceError};
pub use reader::{Event, LineReader, Lines};
pub use source::{MemorySource, PullSource, ReadSource, SocketSource, StreamSource, StreamWriter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::ReaderOptions;
    pub use crate::eol::{Encoding, EolMatch};
    pub use crate::error::{ConfigError, ReaderError};
    pub use crate::reader::{Event, LineReader};
    pub use crate::source::{MemorySource, PullSource, ReadSource, SocketSource, StreamSource};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_basic_workflow() {
        let source = MemorySource::from_bytes(b"alpha\r\nbeta\ngamma\x0bdelta", 3);
        let mut reader = LineReader::new(source, ReaderOptions::new()).unwrap();

        let lines: Vec<String> = reader.lines().map(Result::unwrap).collect();
        assert_eq!(lines, ["alpha", "beta", "gamma", "delta"]);
        assert_eq!(reader.line_count(), 4);
        assert!(reader.is_closed());
    }

    #[test]
    fn test_reject_then_rewrap() {
        let source = MemorySource::from_chunks(["one\ntwo\nthree\n"]);
        let mut reader = LineReader::new(
            source,
            ReaderOptions::new().eol_match(EolMatch::Lf),
        )
        .unwrap();
        assert!(matches!(reader.next_event(), Some(Event::Readable)));
        assert_eq!(reader.read().as_deref(), Some("one"));

        // The second reader picks up exactly where the first stopped.
        let source = reader.into_source().unwrap();
        let mut reader = LineReader::new(source, ReaderOptions::new()).unwrap();
        let rest: Vec<String> = reader.lines().map(Result::unwrap).collect();
        assert_eq!(rest, ["two", "three"]);
    }
}
