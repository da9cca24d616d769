//! Boundary scanner: finds the first line in a text window.
//!
//! Scanning is leftmost and always succeeds. A window without a terminator
//! is itself a match, with an empty terminator, so callers decide whether an
//! unterminated remainder is a complete line.

use crate::eol::EolMatch;
use memchr::{memchr, memchr2, memmem};

const NEL: char = '\u{0085}';
const LINE_SEPARATOR: char = '\u{2028}';
const PARAGRAPH_SEPARATOR: char = '\u{2029}';

/// The first line found in a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMatch<'a> {
    /// Prefix of the window consumed by this match (content + terminator).
    pub whole: &'a str,
    /// Line text without its terminator.
    pub content: &'a str,
    /// Matched terminator, empty when the window ran out first.
    pub terminator: &'a str,
}

impl LineMatch<'_> {
    /// True when the match covers the whole window.
    #[inline]
    pub fn consumes(&self, window: &str) -> bool {
        self.whole.len() == window.len()
    }

    /// True when more input could still change the match: no terminator was
    /// found, or the terminator is a lone `\r` that the next chunk might
    /// extend into `\r\n`.
    #[inline]
    pub fn is_ambiguous(&self) -> bool {
        self.terminator.is_empty() || self.terminator == "\r"
    }
}

/// Single-character terminators of `dialect`, excluding the `\r\n` pair.
#[inline]
pub fn is_terminator(dialect: EolMatch, c: char) -> bool {
    match dialect {
        EolMatch::Crlf => false,
        EolMatch::Lf => c == '\n',
        EolMatch::Basic => matches!(c, '\n' | '\r'),
        EolMatch::SevenBit => matches!(c, '\n' | '\r' | '\x0b' | '\x0c'),
        EolMatch::Iso8859 => matches!(c, '\n' | '\r' | '\x0b' | '\x0c' | NEL),
        EolMatch::All => matches!(
            c,
            '\n' | '\r' | '\x0b' | '\x0c' | NEL | LINE_SEPARATOR | PARAGRAPH_SEPARATOR
        ),
    }
}

/// Locate the first terminator as `(offset, byte_len)`.
fn find_boundary(window: &str, dialect: EolMatch) -> Option<(usize, usize)> {
    let bytes = window.as_bytes();
    let start = match dialect {
        EolMatch::Lf => return memchr(b'\n', bytes).map(|i| (i, 1)),
        EolMatch::Crlf => return memmem::find(bytes, b"\r\n").map(|i| (i, 2)),
        EolMatch::Basic => memchr2(b'\n', b'\r', bytes)?,
        // Terminators of this dialect are all ASCII, so a byte search is safe in UTF-8.
        EolMatch::SevenBit => bytes
            .iter()
            .position(|b| matches!(b, b'\n' | b'\r' | 0x0b | 0x0c))?,
        EolMatch::Iso8859 | EolMatch::All => {
            let (i, c) = window
                .char_indices()
                .find(|&(_, c)| is_terminator(dialect, c))?;
            if c != '\r' {
                return Some((i, c.len_utf8()));
            }
            i
        }
    };

    if bytes[start] == b'\r' && bytes.get(start + 1) == Some(&b'\n') {
        Some((start, 2))
    } else {
        Some((start, 1))
    }
}

/// Find the first line of `window` under `dialect`.
pub fn scan(window: &str, dialect: EolMatch) -> LineMatch<'_> {
    match find_boundary(window, dialect) {
        Some((at, len)) => LineMatch {
            whole: &window[..at + len],
            content: &window[..at],
            terminator: &window[at..at + len],
        },
        None => LineMatch {
            whole: window,
            content: window,
            terminator: "",
        },
    }
}
