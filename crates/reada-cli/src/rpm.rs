//! Header stream scanner.
//!
//! A stream is a run of records, each a 16-byte big-endian header followed by
//! its body:
//! [ magic: u32 = 0x8eade801 ][ reserved: u32 = 0 ][ il: u32 ][ dl: u32 ]
//! [ body: 16 * il + dl bytes ]
//!
//! The scanner is written against `HeaderReader` so the same loop can be
//! driven by plain reads, readahead, or `std::io::BufReader`.

use std::io::{self, BufReader, Read, Seek};

use thiserror::Error;

use reada_io::{ReadAhead, ReadStats};

pub const HEADER_MAGIC: u32 = 0x8ead_e801;
pub const HEADER_LEN: usize = 16;
/// Bodies at or above this size are rejected as corrupt.
pub const MAX_BODY: usize = 1 << 20;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("bad header magic {magic:#010x} at offset {offset}")]
    BadMagic { magic: u32, offset: u64 },

    #[error("non-zero reserved word at offset {offset}")]
    BadReserved { offset: u64 },

    #[error("body of {size} bytes at offset {offset} exceeds the 1 MiB limit")]
    BodyTooLarge { size: usize, offset: u64 },

    #[error("truncated record at offset {offset}: expected {expected} bytes, got {got}")]
    Truncated {
        offset: u64,
        expected: usize,
        got: usize,
    },

    #[error("lookahead after the record at offset {offset} is neither end of stream nor a header")]
    PeekMismatch { offset: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Reada(#[from] reada_core::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Stream offset of the header's first byte.
    pub offset: u64,
    pub il: u32,
    pub dl: u32,
}

impl Header {
    pub fn parse(bytes: &[u8; HEADER_LEN], offset: u64) -> Result<Self, ScanError> {
        let word = |i: usize| {
            u32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
        };
        let magic = word(0);
        if magic != HEADER_MAGIC {
            return Err(ScanError::BadMagic { magic, offset });
        }
        if word(4) != 0 {
            return Err(ScanError::BadReserved { offset });
        }
        let header = Header {
            offset,
            il: word(8),
            dl: word(12),
        };
        let size = header.body_len();
        if size >= MAX_BODY {
            return Err(ScanError::BodyTooLarge { size, offset });
        }
        Ok(header)
    }

    pub fn body_len(&self) -> usize {
        16usize
            .saturating_mul(self.il as usize)
            .saturating_add(self.dl as usize)
    }

    pub fn record_len(&self) -> usize {
        HEADER_LEN + self.body_len()
    }
}

/// Append one well-formed record with a body of `fill` bytes.
pub fn encode_record(out: &mut Vec<u8>, il: u32, dl: u32, fill: u8) {
    out.extend_from_slice(&HEADER_MAGIC.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&il.to_be_bytes());
    out.extend_from_slice(&dl.to_be_bytes());
    let body = 16 * il as usize + dl as usize;
    out.resize(out.len() + body, fill);
}

/// A stream of `count` records with varying, deterministic sizes.
pub fn synthetic_stream(count: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for i in 0..count {
        let il = (i * 7 % 40) as u32;
        let dl = (i * 131 % 3000) as u32;
        encode_record(&mut out, il, dl, i as u8);
    }
    out
}

/// Minimal read interface the scanner needs.
pub trait HeaderReader {
    /// Fill `buf` completely; fewer bytes only at end of stream.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize, ScanError>;

    /// Hook run after each complete record ending at `offset`.
    fn after_record(&mut self, _offset: u64) -> Result<(), ScanError> {
        Ok(())
    }

    /// Syscall counters, when the reader keeps any.
    fn stats(&self) -> Option<ReadStats> {
        None
    }
}

/// Unbuffered: every request goes straight to the source.
pub struct PlainReader<R>(pub R);

impl<R: Read> HeaderReader for PlainReader<R> {
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize, ScanError> {
        read_to_fill(&mut self.0, buf)
    }
}

/// `std::io::BufReader`, the generic double-copying baseline.
pub struct StdBufReader<R>(pub BufReader<R>);

impl<R: Read> HeaderReader for StdBufReader<R> {
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize, ScanError> {
        read_to_fill(&mut self.0, buf)
    }
}

/// Readahead; optionally checks the next header with a peek after every record.
pub struct ReadaReader<R, B = Box<[u8]>> {
    pub inner: ReadAhead<R, B>,
    pub verify_peek: bool,
}

impl<R, B> ReadaReader<R, B> {
    pub fn new(inner: ReadAhead<R, B>, verify_peek: bool) -> Self {
        Self { inner, verify_peek }
    }
}

impl<R: Read + Seek, B: AsRef<[u8]> + AsMut<[u8]>> HeaderReader for ReadaReader<R, B> {
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize, ScanError> {
        if buf.is_empty() {
            return Ok(0);
        }
        Ok(self.inner.read(buf)?)
    }

    fn after_record(&mut self, offset: u64) -> Result<(), ScanError> {
        if !self.verify_peek {
            return Ok(());
        }
        let mut next = [0u8; 4];
        match self.inner.peek(&mut next)? {
            0 => Ok(()),
            4 if u32::from_be_bytes(next) == HEADER_MAGIC => Ok(()),
            _ => Err(ScanError::PeekMismatch { offset }),
        }
    }

    fn stats(&self) -> Option<ReadStats> {
        Some(self.inner.stats())
    }
}

fn read_to_fill<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<usize, ScanError> {
    let mut total = 0;
    while total < buf.len() {
        match r.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(total)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub headers: usize,
    pub bytes: u64,
}

/// Walk every record in the stream, calling `visit` with each header.
pub fn scan(
    reader: &mut dyn HeaderReader,
    mut visit: impl FnMut(&Header),
) -> Result<ScanSummary, ScanError> {
    let mut summary = ScanSummary::default();
    let mut hdr = [0u8; HEADER_LEN];
    let mut body = Vec::new();

    loop {
        let offset = summary.bytes;
        let n = reader.read_full(&mut hdr)?;
        if n == 0 {
            break;
        }
        if n != HEADER_LEN {
            return Err(ScanError::Truncated {
                offset,
                expected: HEADER_LEN,
                got: n,
            });
        }
        let header = Header::parse(&hdr, offset)?;

        let len = header.body_len();
        body.resize(len, 0);
        let got = reader.read_full(&mut body)?;
        if got != len {
            return Err(ScanError::Truncated {
                offset,
                expected: header.record_len(),
                got: HEADER_LEN + got,
            });
        }

        summary.bytes += header.record_len() as u64;
        summary.headers += 1;
        reader.after_record(summary.bytes)?;
        visit(&header);
    }

    Ok(summary)
}
