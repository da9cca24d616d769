//! EOL classification table.
//!
//! Every encoding family has a match level that bounds which EOL dialects
//! can be detected safely in text of that encoding. Level 0 encodings are
//! single-byte safe, level 1 adds the 8-bit NEL marker and level 2 adds the
//! Unicode line and paragraph separators.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Supported encoding families, in the order reported by [`encodings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    Ascii,
    Binary,
    Latin1,
    #[default]
    Utf8,
    Utf16Le,
    Ucs2,
}

impl Encoding {
    pub const ALL: [Encoding; 6] = [
        Encoding::Ascii,
        Encoding::Binary,
        Encoding::Latin1,
        Encoding::Utf8,
        Encoding::Utf16Le,
        Encoding::Ucs2,
    ];

    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Ascii => "ascii",
            Encoding::Binary => "binary",
            Encoding::Latin1 => "latin1",
            Encoding::Utf8 => "utf8",
            Encoding::Utf16Le => "utf16le",
            Encoding::Ucs2 => "ucs2",
        }
    }

    /// Highest dialect level that is safe to scan for in this encoding.
    pub fn match_level(self) -> u8 {
        match self {
            Encoding::Ascii | Encoding::Binary => 0,
            Encoding::Latin1 => 1,
            Encoding::Utf8 | Encoding::Utf16Le | Encoding::Ucs2 => 2,
        }
    }

    /// Dialect used when none is requested.
    pub fn default_eol(self) -> EolMatch {
        match self.match_level() {
            0 => EolMatch::SevenBit,
            1 => EolMatch::Iso8859,
            _ => EolMatch::All,
        }
    }

    /// Whether `eol` may be used with this encoding.
    #[inline]
    pub fn supports(self, eol: EolMatch) -> bool {
        eol.match_level() <= self.match_level()
    }

    /// Validate a requested dialect, substituting the default when absent.
    pub fn resolve_eol(self, requested: Option<EolMatch>) -> Result<EolMatch, ConfigError> {
        match requested {
            None => Ok(self.default_eol()),
            Some(eol) if self.supports(eol) => Ok(eol),
            Some(eol) => Err(ConfigError::IncompatibleEolMatch {
                requested: eol.to_string(),
                encoding: self.to_string(),
            }),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            "binary" => Ok(Encoding::Binary),
            "latin1" | "iso-8859-1" | "iso8859-1" => Ok(Encoding::Latin1),
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "utf16le" | "utf-16le" => Ok(Encoding::Utf16Le),
            "ucs2" | "ucs-2" => Ok(Encoding::Ucs2),
            _ => Err(ConfigError::UnknownEncoding(s.to_string())),
        }
    }
}

/// A class of line terminators recognized as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EolMatch {
    /// `\r\n` only.
    Crlf,
    /// `\n` only.
    Lf,
    /// `\n`, `\r\n` or a lone `\r`.
    Basic,
    /// `Basic` plus form feed and vertical tab.
    SevenBit,
    /// `SevenBit` plus NEL (U+0085).
    Iso8859,
    /// `Iso8859` plus LINE SEPARATOR and PARAGRAPH SEPARATOR.
    All,
}

impl EolMatch {
    /// Ascending by match level.
    pub const ALL: [EolMatch; 6] = [
        EolMatch::Crlf,
        EolMatch::Lf,
        EolMatch::Basic,
        EolMatch::SevenBit,
        EolMatch::Iso8859,
        EolMatch::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EolMatch::Crlf => "crlf",
            EolMatch::Lf => "lf",
            EolMatch::Basic => "basic",
            EolMatch::SevenBit => "7bit",
            EolMatch::Iso8859 => "iso8859",
            EolMatch::All => "all",
        }
    }

    pub fn match_level(self) -> u8 {
        match self {
            EolMatch::Crlf | EolMatch::Lf | EolMatch::Basic | EolMatch::SevenBit => 0,
            EolMatch::Iso8859 => 1,
            EolMatch::All => 2,
        }
    }

    /// Whether a lone `\r` ends a line in this dialect.
    #[inline]
    pub fn accepts_lone_cr(self) -> bool {
        !matches!(self, EolMatch::Crlf | EolMatch::Lf)
    }

    /// The dialect matching the host operating system's convention.
    pub fn native() -> Self {
        if cfg!(windows) {
            EolMatch::Crlf
        } else {
            EolMatch::Lf
        }
    }
}

impl fmt::Display for EolMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EolMatch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crlf" | "dos" | "rfc2046" => Ok(EolMatch::Crlf),
            "lf" | "unix" | "linux" => Ok(EolMatch::Lf),
            "native" => Ok(EolMatch::native()),
            "basic" => Ok(EolMatch::Basic),
            "7bit" => Ok(EolMatch::SevenBit),
            "iso8859" => Ok(EolMatch::Iso8859),
            "all" => Ok(EolMatch::All),
            _ => Err(ConfigError::UnknownEolMatch(s.to_string())),
        }
    }
}

/// All supported encoding families.
pub fn encodings() -> &'static [Encoding] {
    &Encoding::ALL
}

/// Dialects legal for `encoding`, ordered by match level.
pub fn eol_matches(encoding: Encoding) -> Vec<EolMatch> {
    EolMatch::ALL
        .iter()
        .copied()
        .filter(|eol| encoding.supports(*eol))
        .collect()
}
