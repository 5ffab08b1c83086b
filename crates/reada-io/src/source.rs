//! Adapter for readers that cannot seek.

use std::io::{self, IoSliceMut, Read, Seek, SeekFrom};

/// Wraps a plain `Read` (pipe, socket, stdin) so it can drive a `ReadAhead`.
///
/// Every seek fails with `Unsupported`, which is also how `ReadAhead`
/// detects pipe mode when the config leaves it open.
#[derive(Debug)]
pub struct Unseekable<R>(R);

impl<R: Read> Unseekable<R> {
    pub fn new(inner: R) -> Self {
        Self(inner)
    }

    pub fn get_ref(&self) -> &R {
        &self.0
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.0
    }

    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R: Read> Read for Unseekable<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        self.0.read_vectored(bufs)
    }
}

impl<R: Read> Seek for Unseekable<R> {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "source is not seekable",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_pass_through() {
        let mut s = Unseekable::new(&b"abc"[..]);
        let mut out = [0u8; 3];
        assert_eq!(s.read(&mut out).unwrap(), 3);
        assert_eq!(&out, b"abc");
    }

    #[test]
    fn seeking_is_unsupported() {
        let mut s = Unseekable::new(&b"abc"[..]);
        let err = s.stream_position().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}
