//! Buffered line output for the command-line tool.
//!
//! Uses itoa for line numbers and counts to avoid allocation in the hot path.

use std::io::{self, BufWriter, Write};

/// Buffer size for OutputWriter (256KB default).
const DEFAULT_BUFFER_SIZE: usize = 256 * 1024;

/// Writes lines, optionally numbered, through a large buffer.
pub struct OutputWriter<W: Write> {
    writer: BufWriter<W>,
    itoa_buf: itoa::Buffer,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, output)
    }

    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            itoa_buf: itoa::Buffer::new(),
        }
    }

    /// Write `line` followed by a newline.
    #[inline]
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")
    }

    /// Write `number`, a tab, then `line` and a newline.
    #[inline]
    pub fn write_numbered(&mut self, number: u64, line: &str) -> io::Result<()> {
        self.write_int(number)?;
        self.writer.write_all(b"\t")?;
        self.write_line(line)
    }

    /// Write an integer using itoa.
    #[inline]
    pub fn write_int<I: itoa::Integer>(&mut self, n: I) -> io::Result<()> {
        self.writer.write_all(self.itoa_buf.format(n).as_bytes())
    }

    /// Write a count on a line of its own.
    pub fn write_count(&mut self, count: u64) -> io::Result<()> {
        self.write_int(count)?;
        self.writer.write_all(b"\n")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}
