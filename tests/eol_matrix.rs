//! Encoding x EOL dialect matrix.
//!
//! For every legal combination, text with terminators of that dialect is
//! encoded, split into chunks of awkward sizes, and read back.

use linewise::decode::encode;
use linewise::eol::{self, Encoding, EolMatch};
use linewise::{ConfigError, LineReader, MemorySource, ReaderOptions};

/// Terminators recognized by `dialect`.
fn terminators(dialect: EolMatch) -> &'static [&'static str] {
    match dialect {
        EolMatch::Crlf => &["\r\n"],
        EolMatch::Lf => &["\n"],
        EolMatch::Basic => &["\n", "\r", "\r\n"],
        EolMatch::SevenBit => &["\n", "\r", "\r\n", "\x0b", "\x0c"],
        EolMatch::Iso8859 => &["\n", "\r", "\r\n", "\x0b", "\x0c", "\u{85}"],
        EolMatch::All => &[
            "\n", "\r", "\r\n", "\x0b", "\x0c", "\u{85}", "\u{2028}", "\u{2029}",
        ],
    }
}

/// Line content representable in `encoding`.
fn words(encoding: Encoding) -> &'static [&'static str] {
    match encoding {
        Encoding::Ascii => &["alpha", "beta gamma", "x", "tab\there", "~!@#"],
        Encoding::Binary | Encoding::Latin1 => &["alpha", "café", "x", "naïve ÿ", "£5"],
        Encoding::Utf8 | Encoding::Utf16Le | Encoding::Ucs2 => {
            &["alpha", "café", "x", "€uro", "emoji 😀 ok", "日本語"]
        }
    }
}

/// Build `count` lines joined by rotating terminators; the last line is
/// left unterminated when `open_tail` is set.
fn build_text(encoding: Encoding, dialect: EolMatch, count: usize, open_tail: bool) -> (String, Vec<String>) {
    let words = words(encoding);
    let terms = terminators(dialect);
    let mut text = String::new();
    let mut lines = Vec::new();
    for i in 0..count {
        let line = format!("{}{}", words[i % words.len()], i);
        text.push_str(&line);
        if i + 1 < count || !open_tail {
            text.push_str(terms[i % terms.len()]);
        }
        lines.push(line);
    }
    (text, lines)
}

#[test]
fn test_every_legal_combination() {
    for &encoding in eol::encodings() {
        for dialect in eol::eol_matches(encoding) {
            for open_tail in [false, true] {
                let (text, expected) = build_text(encoding, dialect, 40, open_tail);
                let bytes = encode(encoding, &text);
                for chunk_size in [1, 3, 7, 64, bytes.len()] {
                    let source = MemorySource::from_bytes(&bytes, chunk_size);
                    let options = ReaderOptions::new().encoding(encoding).eol_match(dialect);
                    let mut reader = LineReader::new(source, options).unwrap();

                    let lines: Vec<String> = reader.lines().map(Result::unwrap).collect();
                    assert_eq!(
                        lines, expected,
                        "{} / {} / chunk {} / open tail {}",
                        encoding, dialect, chunk_size, open_tail
                    );
                    assert_eq!(reader.line_count(), expected.len() as u64);
                }
            }
        }
    }
}

#[test]
fn test_default_dialect_per_encoding() {
    for (encoding, dialect) in [
        (Encoding::Ascii, EolMatch::SevenBit),
        (Encoding::Binary, EolMatch::SevenBit),
        (Encoding::Latin1, EolMatch::Iso8859),
        (Encoding::Utf8, EolMatch::All),
        (Encoding::Utf16Le, EolMatch::All),
        (Encoding::Ucs2, EolMatch::All),
    ] {
        let reader =
            LineReader::new(MemorySource::default(), ReaderOptions::new().encoding(encoding))
                .unwrap();
        assert_eq!(reader.config().eol_match(), dialect, "{}", encoding);
    }
}

#[test]
fn test_illegal_combinations_rejected() {
    for &encoding in eol::encodings() {
        for dialect in EolMatch::ALL {
            let legal = eol::eol_matches(encoding).contains(&dialect);
            let options = ReaderOptions::new().encoding(encoding).eol_match(dialect);
            match LineReader::new(MemorySource::default(), options) {
                Ok(_) => assert!(legal, "{} / {} accepted", encoding, dialect),
                Err(ConfigError::IncompatibleEolMatch { .. }) => {
                    assert!(!legal, "{} / {} rejected", encoding, dialect)
                }
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
    }
}

#[test]
fn test_names_and_aliases() {
    let mut options = ReaderOptions::new();
    options.set("encoding", "UTF-16LE").unwrap();
    options.set("eolMatch", "unix").unwrap();
    let reader = LineReader::new(MemorySource::default(), options).unwrap();
    assert_eq!(reader.config().encoding(), Encoding::Utf16Le);
    assert_eq!(reader.config().eol_match(), EolMatch::Lf);

    let mut options = ReaderOptions::new();
    assert!(matches!(
        options.set("encoding", "ebcdic"),
        Err(ConfigError::UnknownEncoding(_))
    ));
    assert!(matches!(
        options.set("eolMatch", "mac"),
        Err(ConfigError::UnknownEolMatch(_))
    ));
}

#[test]
fn test_latin1_nel_only_with_iso8859() {
    let bytes = b"one\x85two";
    let source = MemorySource::from_chunks([&bytes[..]]);
    let options = ReaderOptions::new()
        .encoding(Encoding::Latin1)
        .eol_match(EolMatch::SevenBit);
    let mut reader = LineReader::new(source, options).unwrap();
    let lines: Vec<String> = reader.lines().map(Result::unwrap).collect();
    assert_eq!(lines, ["one\u{85}two"]);

    let source = MemorySource::from_chunks([&bytes[..]]);
    let options = ReaderOptions::new().encoding(Encoding::Latin1);
    let mut reader = LineReader::new(source, options).unwrap();
    let lines: Vec<String> = reader.lines().map(Result::unwrap).collect();
    assert_eq!(lines, ["one", "two"]);
}
