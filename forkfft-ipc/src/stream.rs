//! Line-Oriented Streams
//!
//! Buffered reader and writer wrappers over any byte stream (stdin/stdout or a
//! pipe end). One sample per line in both directions.

use crate::line::{DecodeError, decode_line, encode_line};
use forkfft_core::ComplexSample;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use thiserror::Error;

/// Errors raised while moving samples over a stream
#[derive(Debug, Error)]
pub enum LineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line_no}: {source}")]
    Decode {
        line_no: usize,
        #[source]
        source: DecodeError,
    },

    #[error("expected {expected} lines, stream ended after {got}")]
    Incomplete { expected: usize, got: usize },
}

impl LineError {
    /// The decoder error behind this failure, if any
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            LineError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Reads one sample per line
pub struct LineReader<R: Read> {
    reader: BufReader<R>,
    buf: String,
    lines_read: usize,
}

impl<R: Read> LineReader<R> {
    /// Create a new line reader
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::with_capacity(64 * 1024, reader),
            buf: String::new(),
            lines_read: 0,
        }
    }

    /// Read and decode the next line. `Ok(None)` at end of stream.
    pub fn read_sample(&mut self) -> Result<Option<ComplexSample>, LineError> {
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.lines_read += 1;
        decode_line(&self.buf)
            .map(Some)
            .map_err(|source| LineError::Decode {
                line_no: self.lines_read,
                source,
            })
    }

    /// Read exactly `n` samples; a stream that ends early is an error.
    pub fn read_exact_samples(&mut self, n: usize) -> Result<Vec<ComplexSample>, LineError> {
        let mut samples = Vec::with_capacity(n);
        while samples.len() < n {
            match self.read_sample()? {
                Some(sample) => samples.push(sample),
                None => {
                    return Err(LineError::Incomplete {
                        expected: n,
                        got: samples.len(),
                    });
                }
            }
        }
        Ok(samples)
    }

    /// Number of lines consumed so far
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Consume and return the inner reader
    pub fn into_inner(self) -> BufReader<R> {
        self.reader
    }
}

/// Read every line until end of input.
pub fn read_all_samples<R: Read>(reader: R) -> Result<Vec<ComplexSample>, LineError> {
    let mut reader = LineReader::new(reader);
    let mut samples = Vec::new();
    while let Some(sample) = reader.read_sample()? {
        samples.push(sample);
    }
    Ok(samples)
}

/// Writes one sample per line
pub struct LineWriter<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> LineWriter<W> {
    /// Create a new line writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(64 * 1024, writer),
        }
    }

    /// Write a sample in wire format (six decimals).
    pub fn write_sample(&mut self, sample: ComplexSample) -> Result<(), LineError> {
        self.write_text(&encode_line(sample))
    }

    /// Write an already formatted line; the newline is appended here.
    pub fn write_text(&mut self, text: &str) -> Result<(), LineError> {
        self.writer.write_all(text.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<(), LineError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the inner writer.
    pub fn into_inner(self) -> Result<W, LineError> {
        self.writer
            .into_inner()
            .map_err(|e| LineError::Io(e.into_error()))
    }
}
