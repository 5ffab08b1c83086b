//! The readahead engine.
//!
//! One fixed-capacity window per source. Physical layout of the buffer:
//!
//! ```text
//! 0          start             end              capacity
//! [ consumed | valid, unconsumed | free ...........]
//! ```
//!
//! `buf[0..end]` holds exactly the source bytes `[pos - end, pos)`, where `pos`
//! is the source's own offset. The caller's logical position is
//! `pos - (end - start)`. Keeping the consumed prefix around is what lets a
//! backward seek inside the window skip the real seek.
//!
//! Refills are sized so the source offset after the refill lands on a page
//! boundary (unless the source is a pipe), which means at most one partial
//! page is ever buffered.

use std::fmt;
use std::io::{self, IoSliceMut, Read, Seek, SeekFrom};

use reada_core::prelude::{is_aligned, refill_len, Error, ReadaConfig, Result, StreamState};

use crate::source::Unseekable;
use crate::stats::ReadStats;

/// Buffered readahead over a raw source.
///
/// The source's position belongs to the `ReadAhead` from construction on:
/// reading or seeking it behind the engine's back breaks the window.
pub struct ReadAhead<R, B = Box<[u8]>> {
    inner: R,
    buf: B,
    start: usize,
    end: usize,
    pos: u64,
    page: usize,
    pipe: bool,
    state: StreamState,
    /// Failure hit by a call that still delivered bytes; reported by the next call.
    pending: Option<io::Error>,
    stats: ReadStats,
}

impl<R: Read + Seek> ReadAhead<R> {
    /// Readahead with the default 8 KiB window.
    pub fn new(inner: R) -> Result<Self> {
        Self::with_config(inner, &ReadaConfig::default())
    }

    pub fn with_config(inner: R, cfg: &ReadaConfig) -> Result<Self> {
        cfg.validate()?;
        let buf = vec![0u8; cfg.capacity].into_boxed_slice();
        ReadAhead::with_buffer(inner, buf, cfg)
    }
}

impl<R: Read> ReadAhead<Unseekable<R>> {
    /// Readahead over a reader that cannot seek, forcing pipe mode.
    pub fn pipe(reader: R) -> Result<Self> {
        let cfg = ReadaConfig {
            pipe: Some(true),
            ..ReadaConfig::default()
        };
        Self::with_config(Unseekable::new(reader), &cfg)
    }
}

impl<R: Read + Seek, B: AsRef<[u8]> + AsMut<[u8]>> ReadAhead<R, B> {
    /// Readahead over a caller-owned buffer, e.g. `&mut [u8; 8192]`.
    ///
    /// The buffer's length is the capacity (`cfg.capacity` is not consulted)
    /// and must be a multiple of `cfg.page_size` spanning at least two pages.
    /// Its contents are scratch.
    pub fn with_buffer(mut inner: R, buf: B, cfg: &ReadaConfig) -> Result<Self> {
        let capacity = buf.as_ref().len();
        ReadaConfig {
            capacity,
            ..cfg.clone()
        }
        .validate()?;

        let (pos, pipe) = match cfg.pipe {
            Some(true) => (0, true),
            Some(false) => (inner.stream_position()?, false),
            None => match inner.stream_position() {
                Ok(p) => (p, false),
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(error = %_e, "source position unavailable, using pipe mode");
                    (0, true)
                }
            },
        };

        Ok(Self {
            inner,
            buf,
            start: 0,
            end: 0,
            pos,
            page: cfg.page_size,
            pipe,
            state: StreamState::Active,
            pending: None,
            stats: ReadStats::default(),
        })
    }

    // ----- queries -----

    pub fn capacity(&self) -> usize {
        self.buf.as_ref().len()
    }

    pub fn page_size(&self) -> usize {
        self.page
    }

    pub fn is_pipe(&self) -> bool {
        self.pipe
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn stats(&self) -> ReadStats {
        self.stats
    }

    /// Offset of the underlying source: the logical position plus what is buffered.
    pub fn os_position(&self) -> u64 {
        self.pos
    }

    /// Logical position: the next byte `read` would return.
    pub fn tell(&self) -> u64 {
        self.pos - self.available() as u64
    }

    /// Bytes read from the source but not yet consumed.
    pub fn buffered(&self) -> &[u8] {
        &self.buf.as_ref()[self.start..self.end]
    }

    /// Largest request `peek`/`fill` can satisfy right now without going past
    /// the page-aligned refill limit. Always more than `capacity - page_size`
    /// and never more than `capacity`.
    pub fn max_fill(&self) -> usize {
        self.refill_target(self.tell())
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutable access to the source. Reading or seeking it desynchronizes the window.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Give back the source. Its position is `os_position()`, which is ahead
    /// of `tell()` by whatever was still buffered.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Advance over up to `n` already buffered bytes. Never touches the source.
    pub fn consume(&mut self, n: usize) {
        self.start += n.min(self.available());
    }

    // ----- primitives -----

    /// Fill `dst` completely from the stream.
    ///
    /// Returns fewer than `dst.len()` bytes only when the source reached its
    /// end or failed; the stream then stays latched in that state.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize> {
        let size = dst.len();
        if size == 0 {
            return Err(Error::InvalidArgument("zero-length read".into()));
        }

        let avail = self.available();
        if avail >= size {
            dst.copy_from_slice(&self.buf.as_ref()[self.start..self.start + size]);
            self.start += size;
            return Ok(size);
        }

        dst[..avail].copy_from_slice(&self.buf.as_ref()[self.start..self.end]);
        self.start = self.end;
        let mut total = avail;
        if let Some(done) = self.terminal(total) {
            return done;
        }

        while total < size {
            let need = size - total;
            let want = self.refill_target(self.pos + need as u64);
            // The scatter read overwrites the window from the front.
            self.start = 0;
            self.end = 0;

            let result = loop {
                self.stats.vectored_reads += 1;
                let mut iov = [
                    IoSliceMut::new(&mut dst[total..]),
                    IoSliceMut::new(&mut self.buf.as_mut()[..want]),
                ];
                match self.inner.read_vectored(&mut iov) {
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                        self.stats.interrupted += 1;
                    }
                    other => break other,
                }
            };

            let n = match result {
                Ok(0) => {
                    self.latch_eof();
                    break;
                }
                Ok(n) => n,
                Err(e) => return self.latch_error(e, total),
            };
            self.advance(n);

            if n > need {
                self.end = n - need;
                total = size;
                debug_assert!(self.end < want || self.pipe || is_aligned(self.pos, self.page));
            } else {
                total += n;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(requested = size, delivered = total, buffered = self.end, "read");

        Ok(total)
    }

    /// Copy up to `dst.len()` upcoming bytes without consuming them.
    ///
    /// A short count means the stream ended (or failed) first; whatever was
    /// available has still been copied. `dst` may not exceed the capacity.
    pub fn peek(&mut self, dst: &mut [u8]) -> Result<usize> {
        let n = self.fill(dst.len())?;
        dst[..n].copy_from_slice(&self.buf.as_ref()[self.start..self.start + n]);
        Ok(n)
    }

    /// Make sure at least `min` bytes are buffered, reading ahead as needed.
    ///
    /// Returns `min`, or fewer if the stream ends first. After a successful
    /// `fill(n)`, `read`/`peek` of up to `n` bytes never touch the source.
    pub fn fill(&mut self, min: usize) -> Result<usize> {
        if min == 0 {
            return Err(Error::InvalidArgument("zero-length fill".into()));
        }
        let cap = self.capacity();
        if min > cap {
            return Err(Error::InvalidArgument(format!(
                "request of {min} bytes exceeds buffer capacity {cap}"
            )));
        }

        if self.available() >= min {
            return Ok(min);
        }
        if let Some(done) = self.terminal(self.available()) {
            return done;
        }

        self.compact();
        // buf[0] now holds the byte at tell(); align the end of the window.
        let aligned = self.refill_target(self.tell());
        let limit = if aligned < min { cap } else { aligned };

        while self.end < min {
            let result = loop {
                self.stats.reads += 1;
                match self.inner.read(&mut self.buf.as_mut()[self.end..limit]) {
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                        self.stats.interrupted += 1;
                    }
                    other => break other,
                }
            };
            match result {
                Ok(0) => {
                    self.latch_eof();
                    break;
                }
                Ok(n) => {
                    self.advance(n);
                    self.end += n;
                }
                Err(e) => return self.latch_error(e, self.end.min(min)),
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(requested = min, buffered = self.end, limit, "fill");

        Ok(self.end.min(min))
    }

    /// Advance the stream by `n` bytes without copying them out.
    ///
    /// Returns fewer than `n` only when the stream ends or fails first.
    pub fn skip(&mut self, n: usize) -> Result<usize> {
        if n == 0 {
            return Err(Error::InvalidArgument("zero-length skip".into()));
        }

        let avail = self.available();
        if avail >= n {
            self.start += n;
            return Ok(n);
        }

        self.start = self.end;
        let mut skipped = avail;
        if let Some(done) = self.terminal(skipped) {
            return done;
        }

        while skipped < n {
            let want = self.refill_target(self.pos);
            self.start = 0;
            self.end = 0;

            let result = loop {
                self.stats.reads += 1;
                match self.inner.read(&mut self.buf.as_mut()[..want]) {
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                        self.stats.interrupted += 1;
                    }
                    other => break other,
                }
            };
            let got = match result {
                Ok(0) => {
                    self.latch_eof();
                    break;
                }
                Ok(got) => got,
                Err(e) => return self.latch_error(e, skipped),
            };
            self.advance(got);
            self.end = got;

            let need = n - skipped;
            if got > need {
                self.start = need;
                skipped = n;
            } else {
                self.start = got;
                skipped += got;
            }
        }

        Ok(skipped)
    }

    /// Reposition the stream to absolute offset `target`.
    ///
    /// Targets inside the window (consumed bytes included) only move the
    /// cursor. Anything else is a real seek, which empties the window and
    /// clears a latched EOF or failure. A failed seek leaves everything as it
    /// was. On a pipe only forward moves within the buffered bytes succeed.
    ///
    /// Once latched, a seekable stream always takes the real seek, even to
    /// `tell()`: that is how a caller retries after EOF or a failure.
    pub fn seek(&mut self, target: u64) -> Result<u64> {
        let here = self.tell();
        if self.state.is_active() || self.pipe {
            if target == here {
                return Ok(target);
            }

            let window_lo = self.pos - self.end as u64;
            let lo = if self.pipe { here } else { window_lo };
            if target >= lo && target <= self.pos {
                // target - window_lo <= end, so it fits in usize.
                self.start = (target - window_lo) as usize;
                return Ok(target);
            }
        }

        if self.pipe {
            return Err(Error::NotSeekable {
                from: here,
                to: target,
            });
        }
        self.real_seek(SeekFrom::Start(target))
    }

    /// Reposition relative to the end of the source. Always a real seek.
    pub fn seek_from_end(&mut self, offset: i64) -> Result<u64> {
        if self.pipe {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::Unsupported,
                "cannot seek relative to the end of a pipe",
            )));
        }
        self.real_seek(SeekFrom::End(offset))
    }

    // ----- helpers -----

    fn available(&self) -> usize {
        self.end - self.start
    }

    /// Refill size for a read whose buffered part starts at source `offset`.
    fn refill_target(&self, offset: u64) -> usize {
        if self.pipe {
            self.capacity()
        } else {
            refill_len(offset, self.capacity(), self.page)
        }
    }

    fn advance(&mut self, n: usize) {
        self.pos += n as u64;
        self.stats.bytes_fetched += n as u64;
    }

    /// Move the unconsumed bytes to the front of the buffer.
    fn compact(&mut self) {
        if self.start > 0 {
            let (start, end) = (self.start, self.end);
            self.buf.as_mut().copy_within(start..end, 0);
            self.end -= start;
            self.start = 0;
        }
    }

    /// `Some` when the stream is latched and must not touch the source.
    /// A pending failure is reported here, once, if nothing else was delivered.
    fn terminal(&mut self, delivered: usize) -> Option<Result<usize>> {
        if self.state.is_active() {
            return None;
        }
        if delivered == 0 {
            if let Some(e) = self.pending.take() {
                return Some(Err(Error::Io(e)));
            }
        }
        Some(Ok(delivered))
    }

    fn latch_eof(&mut self) {
        self.state = StreamState::Eof;
        #[cfg(feature = "tracing")]
        tracing::debug!(pos = self.pos, "end of stream");
    }

    fn latch_error(&mut self, e: io::Error, delivered: usize) -> Result<usize> {
        self.state = StreamState::Failed(e.kind());
        #[cfg(feature = "tracing")]
        tracing::debug!(pos = self.pos, error = %e, delivered, "source failed");
        if delivered > 0 {
            self.pending = Some(e);
            Ok(delivered)
        } else {
            Err(Error::Io(e))
        }
    }

    fn real_seek(&mut self, to: SeekFrom) -> Result<u64> {
        let result = loop {
            self.stats.seeks += 1;
            match self.inner.seek(to) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    self.stats.interrupted += 1;
                }
                other => break other,
            }
        };
        // A failed seek leaves the source where it was; keep the window.
        let p = result.map_err(Error::Seek)?;

        #[cfg(feature = "tracing")]
        tracing::trace!(from = self.tell(), to = p, "seek");

        self.start = 0;
        self.end = 0;
        self.pos = p;
        self.state = StreamState::Active;
        self.pending = None;
        Ok(p)
    }
}

impl<R, B: AsRef<[u8]>> fmt::Debug for ReadAhead<R, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadAhead")
            .field("capacity", &self.buf.as_ref().len())
            .field("start", &self.start)
            .field("end", &self.end)
            .field("pos", &self.pos)
            .field("pipe", &self.pipe)
            .field("state", &self.state)
            .finish()
    }
}
