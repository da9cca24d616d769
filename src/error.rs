//! Error types for line reading.
//!
//! Configuration problems are reported synchronously when a reader is built.
//! Everything that goes wrong afterwards travels through the reader's
//! [`Event::Error`](crate::reader::Event::Error) notification.

use std::io;
use thiserror::Error;

/// Errors raised while validating reader options. No reader is created when
/// one of these is returned.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Source does not satisfy the pull-source contract: {0}")]
    InvalidSource(String),

    #[error("Source has inappropriate buffer size: {high_water_mark} (limit {limit})")]
    SourceBufferTooLarge { high_water_mark: usize, limit: usize },

    #[error("Encoding not valid here: {0}")]
    UnknownEncoding(String),

    #[error("Unknown EOL match type: {0}")]
    UnknownEolMatch(String),

    #[error("Invalid EOL match type for {encoding} encoding: {requested}")]
    IncompatibleEolMatch { requested: String, encoding: String },

    #[error("Invalid maximum line length: {0}")]
    InvalidMaxLineLength(String),

    #[error("Invalid autoDestroySource option value: {0}")]
    InvalidAutoDestroy(String),

    #[error("Unrecognized option: {0}")]
    UnknownOption(String),
}

/// Errors reported by a source through its error signal or a failed pull.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Source failure: {0}")]
    Other(String),
}

/// Fatal runtime errors. Each one closes the reader.
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Maximum line length exceeded: {length} > {limit}")]
    LineTooLong { limit: usize, length: usize },

    #[error(transparent)]
    Source(#[from] SourceError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Any failure of a complete line-reading run, as reported by the binary.
#[derive(Error, Debug)]
pub enum LinewiseError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Reader(#[from] ReaderError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
