//! Reader configuration.
//!
//! Options are collected in a [`ReaderOptions`] builder and validated against
//! the EOL classification table and the source being wrapped, producing an
//! immutable [`ReaderConfig`]. The source-buffer safety ceiling is a
//! process-wide setting that is read once per reader construction.

use crate::eol::{Encoding, EolMatch};
use crate::error::{ConfigError, Result};
use crate::source::PullSource;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Default maximum line length in characters.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// Default ceiling on a source's internal buffering (64 KB).
pub const DEFAULT_MAX_SOURCE_BUFFER: usize = 64 * 1024;

/// Process-wide ceiling on a wrapped source's internal buffering.
///
/// Larger source buffers mean fewer pulls but more memory held outside the
/// reader's control; sources above the ceiling are rejected at construction.
static MAX_SOURCE_BUFFER: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_SOURCE_BUFFER);

/// Change the source-buffer ceiling for readers constructed afterwards.
///
/// # Example
///
/// ```
/// use linewise::config;
///
/// config::set_max_source_buffer(128 * 1024);
/// assert_eq!(config::max_source_buffer(), 128 * 1024);
/// config::set_max_source_buffer(config::DEFAULT_MAX_SOURCE_BUFFER);
/// ```
#[inline]
pub fn set_max_source_buffer(limit: usize) {
    MAX_SOURCE_BUFFER.store(limit, Ordering::Release);
}

/// Current source-buffer ceiling.
#[inline]
pub fn max_source_buffer() -> usize {
    MAX_SOURCE_BUFFER.load(Ordering::Acquire)
}

/// Parse a maximum line length written as a plain non-negative integer.
///
/// Signs, fractions, leading zeros and anything non-numeric are rejected.
pub fn parse_max_line_length(value: &str) -> Result<usize> {
    let canonical = !value.is_empty()
        && value.bytes().all(|b| b.is_ascii_digit())
        && (value == "0" || !value.starts_with('0'));
    if !canonical {
        return Err(ConfigError::InvalidMaxLineLength(value.to_string()));
    }
    value
        .parse()
        .map_err(|_| ConfigError::InvalidMaxLineLength(value.to_string()))
}

/// Parse an auto-destroy flag; only `true` and `false` are accepted.
pub fn parse_auto_destroy(value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidAutoDestroy(value.to_string())),
    }
}

/// Construction-time options for a line reader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderOptions {
    pub encoding: Option<Encoding>,
    pub eol_match: Option<EolMatch>,
    pub max_line_length: Option<usize>,
    pub auto_destroy_source: bool,
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn eol_match(mut self, eol_match: EolMatch) -> Self {
        self.eol_match = Some(eol_match);
        self
    }

    /// Maximum line length in characters; `0` means unlimited.
    pub fn max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = Some(max_line_length);
        self
    }

    pub fn auto_destroy_source(mut self, auto_destroy: bool) -> Self {
        self.auto_destroy_source = auto_destroy;
        self
    }

    /// Set an option from its textual name and value.
    ///
    /// Recognized keys: `encoding`, `eolMatch`, `maxLineLength`,
    /// `autoDestroySource` (snake_case spellings are accepted too).
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "encoding" => self.encoding = Some(value.parse()?),
            "eolMatch" | "eol_match" => self.eol_match = Some(value.parse()?),
            "maxLineLength" | "max_line_length" => {
                self.max_line_length = Some(parse_max_line_length(value)?)
            }
            "autoDestroySource" | "auto_destroy_source" => {
                self.auto_destroy_source = parse_auto_destroy(value)?
            }
            _ => return Err(ConfigError::UnknownOption(key.to_string())),
        }
        Ok(())
    }

    /// Validate these options for `source`.
    pub fn validate<S: PullSource + ?Sized>(&self, source: &S) -> Result<ReaderConfig> {
        if !source.is_open() {
            return Err(ConfigError::InvalidSource(
                "source has already been destroyed".to_string(),
            ));
        }

        let limit = max_source_buffer();
        let buffering = source.buffering();
        let drained = buffering.ended && buffering.buffered < limit;
        if buffering.high_water_mark > limit && !drained {
            return Err(ConfigError::SourceBufferTooLarge {
                high_water_mark: buffering.high_water_mark,
                limit,
            });
        }

        let encoding = self.encoding.unwrap_or_default();
        let eol_match = encoding.resolve_eol(self.eol_match)?;

        let mut auto_destroy_source = self.auto_destroy_source;
        if auto_destroy_source && !(source.kind().is_destroy_safe() && source.can_destroy()) {
            debug!(kind = ?source.kind(), "auto-destroy not supported by source, disabled");
            auto_destroy_source = false;
        }

        Ok(ReaderConfig {
            encoding,
            eol_match,
            max_line_length: self.max_line_length.unwrap_or(DEFAULT_MAX_LINE_LENGTH),
            auto_destroy_source,
        })
    }
}

/// Validated, immutable reader configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    encoding: Encoding,
    eol_match: EolMatch,
    max_line_length: usize,
    auto_destroy_source: bool,
}

impl ReaderConfig {
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn eol_match(&self) -> EolMatch {
        self.eol_match
    }

    /// `0` means unlimited.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    pub fn auto_destroy_source(&self) -> bool {
        self.auto_destroy_source
    }

    /// Whether a line of `length` characters is allowed.
    #[inline]
    pub fn allows_length(&self, length: usize) -> bool {
        self.max_line_length == 0 || length <= self.max_line_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemorySource, ReadSource, SourceKind};
    use serial_test::serial;
    use std::io::Cursor;

    #[test]
    fn test_parse_max_line_length() {
        assert_eq!(parse_max_line_length("0").unwrap(), 0);
        assert_eq!(parse_max_line_length("4096").unwrap(), 4096);
        for bad in ["infinity", "102.3", "-999", "+5", "007", "", " 12"] {
            let err = parse_max_line_length(bad).unwrap_err();
            assert!(err.to_string().starts_with("Invalid maximum line length"), "{}", bad);
        }
    }

    #[test]
    fn test_parse_auto_destroy() {
        assert!(parse_auto_destroy("true").unwrap());
        assert!(!parse_auto_destroy("false").unwrap());
        assert!(parse_auto_destroy("yeah").is_err());
        assert!(parse_auto_destroy("null").is_err());
    }

    #[test]
    #[serial]
    fn test_defaults() {
        let config = ReaderOptions::new()
            .validate(&MemorySource::from_chunks(["x"]))
            .unwrap();
        assert_eq!(config.encoding(), Encoding::Utf8);
        assert_eq!(config.eol_match(), EolMatch::All);
        assert_eq!(config.max_line_length(), DEFAULT_MAX_LINE_LENGTH);
        assert!(!config.auto_destroy_source());
    }

    #[test]
    #[serial]
    fn test_set_by_name() {
        let mut options = ReaderOptions::new();
        options.set("encoding", "ascii").unwrap();
        options.set("eolMatch", "DOS").unwrap();
        options.set("maxLineLength", "10").unwrap();
        assert!(options.set("maxLineLength", "10.5").is_err());
        assert!(options.set("autoDestroySource", "yeah").is_err());
        assert!(options.set("colour", "blue").is_err());

        let config = options.validate(&MemorySource::default()).unwrap();
        assert_eq!(config.eol_match(), EolMatch::Crlf);
        assert_eq!(config.max_line_length(), 10);
    }

    #[test]
    #[serial]
    fn test_incompatible_dialect_rejected() {
        let options = ReaderOptions::new()
            .encoding(Encoding::Ascii)
            .eol_match(EolMatch::All);
        let err = options.validate(&MemorySource::default()).unwrap_err();
        assert!(matches!(err, ConfigError::IncompatibleEolMatch { .. }));
    }

    #[test]
    #[serial]
    fn test_source_buffer_ceiling() {
        let oversized = ReadSource::new(Cursor::new(Vec::new())).with_chunk_size(65 * 1024);
        let err = ReaderOptions::new().validate(&oversized).unwrap_err();
        assert!(err.to_string().contains("inappropriate buffer size"));

        // A fully buffered source under the ceiling is fine whatever its mark.
        let drained = MemorySource::from_chunks(["abc"]).with_high_water_mark(1 << 20);
        assert!(ReaderOptions::new().validate(&drained).is_ok());

        set_max_source_buffer(128 * 1024);
        assert!(ReaderOptions::new().validate(&oversized).is_ok());
        set_max_source_buffer(DEFAULT_MAX_SOURCE_BUFFER);
    }

    #[test]
    #[serial]
    fn test_auto_destroy_forced_off_for_unsafe_kinds() {
        let options = ReaderOptions::new().auto_destroy_source(true);
        let config = options.validate(&MemorySource::default()).unwrap();
        assert!(!config.auto_destroy_source());

        let stdin_like = ReadSource::new(Cursor::new(Vec::new()));
        assert!(!options.validate(&stdin_like).unwrap().auto_destroy_source());

        let file_like = ReadSource::with_kind(Cursor::new(Vec::new()), SourceKind::File);
        assert!(options.validate(&file_like).unwrap().auto_destroy_source());
    }

    #[test]
    fn test_allows_length() {
        let config = ReaderConfig {
            encoding: Encoding::Utf8,
            eol_match: EolMatch::Lf,
            max_line_length: 3,
            auto_destroy_source: false,
        };
        assert!(config.allows_length(3));
        assert!(!config.allows_length(4));
        let unlimited = ReaderConfig {
            max_line_length: 0,
            ..config
        };
        assert!(unlimited.allows_length(usize::MAX));
    }
}
