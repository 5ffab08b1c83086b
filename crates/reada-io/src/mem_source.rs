//! In-memory source for testing.
//!
//! Behaves like a regular file descriptor over a byte vector and counts every
//! call made against it. It can also be scripted to misbehave: short reads,
//! `Interrupted` results, a hard failure at a given offset, or a failing seek.

use std::io::{self, IoSliceMut, Read, Seek, SeekFrom};

/// Calls observed by a `MemorySource`, interrupted ones included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounters {
    pub reads: u64,
    pub vectored_reads: u64,
    pub seeks: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Vec<u8>,
    pos: u64,
    max_chunk: Option<usize>,
    interrupt_every: Option<u64>,
    fail_at: Option<u64>,
    fail_next_seek: bool,
    calls: u64,
    counters: SourceCounters,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Source of `len` bytes where byte `i` is `i % 251`, so misplaced bytes show up.
    pub fn patterned(len: usize) -> Self {
        Self::new(pattern(len))
    }

    /// Deliver at most `n` bytes per call.
    pub fn with_max_chunk(mut self, n: usize) -> Self {
        self.max_chunk = Some(n.max(1));
        self
    }

    /// Every `k`-th read call returns `Interrupted` without transferring data.
    pub fn with_interrupt_every(mut self, k: u64) -> Self {
        self.interrupt_every = Some(k.max(1));
        self
    }

    /// Reads stop short at `offset`; a read starting there fails.
    pub fn with_failure_at(mut self, offset: u64) -> Self {
        self.fail_at = Some(offset);
        self
    }

    pub fn fail_next_seek(&mut self) {
        self.fail_next_seek = true;
    }

    /// Lift an injected read failure, as if the device recovered.
    pub fn heal(&mut self) {
        self.fail_at = None;
    }

    pub fn counters(&self) -> SourceCounters {
        self.counters
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Common gate for `read` and `read_vectored`: how many bytes this call may move.
    fn admit(&mut self, wanted: usize) -> io::Result<usize> {
        self.calls += 1;
        if let Some(k) = self.interrupt_every {
            if self.calls % k == 0 {
                return Err(io::ErrorKind::Interrupted.into());
            }
        }
        let len = self.data.len() as u64;
        let mut limit = len;
        if let Some(at) = self.fail_at {
            if self.pos >= at && self.pos < len {
                return Err(io::Error::new(io::ErrorKind::Other, "injected read failure"));
            }
            limit = limit.min(at.max(self.pos));
        }
        let left = limit.saturating_sub(self.pos) as usize;
        let mut n = wanted.min(left);
        if let Some(max) = self.max_chunk {
            n = n.min(max);
        }
        Ok(n)
    }
}

impl Read for MemorySource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.counters.reads += 1;
        let n = self.admit(buf.len())?;
        if n == 0 {
            return Ok(0);
        }
        let at = self.pos as usize;
        buf[..n].copy_from_slice(&self.data[at..at + n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        self.counters.vectored_reads += 1;
        let wanted = bufs.iter().map(|b| b.len()).sum();
        let mut left = self.admit(wanted)?;
        let mut total = 0;
        for b in bufs.iter_mut() {
            if left == 0 {
                break;
            }
            let n = b.len().min(left);
            let at = self.pos as usize;
            b[..n].copy_from_slice(&self.data[at..at + n]);
            self.pos += n as u64;
            left -= n;
            total += n;
        }
        Ok(total)
    }
}

impl Seek for MemorySource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.counters.seeks += 1;
        if self.fail_next_seek {
            self.fail_next_seek = false;
            return Err(io::Error::new(io::ErrorKind::Other, "injected seek failure"));
        }
        let target = match pos {
            SeekFrom::Start(p) => Some(p),
            SeekFrom::End(d) => (self.data.len() as u64).checked_add_signed(d),
            SeekFrom::Current(d) => self.pos.checked_add_signed(d),
        };
        match target {
            Some(p) => {
                self.pos = p;
                Ok(p)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative or overflowing position",
            )),
        }
    }
}

/// `len` bytes where byte `i` is `i % 251`.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
