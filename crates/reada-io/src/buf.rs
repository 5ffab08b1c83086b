//! `std::io` traits on top of the readahead primitives.
//!
//! These let a `ReadAhead` stand in wherever a `BufReader` would: `read_exact`,
//! `lines`, `read_until`, generic decoders. Zero-length std reads are not an
//! error here, unlike the primitive `ReadAhead::read`.

use std::io::{self, BufRead, Read, Seek, SeekFrom};

use crate::readahead::ReadAhead;

impl<R: Read + Seek, B: AsRef<[u8]> + AsMut<[u8]>> Read for ReadAhead<R, B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        ReadAhead::read(self, buf).map_err(Into::into)
    }
}

impl<R: Read + Seek, B: AsRef<[u8]> + AsMut<[u8]>> BufRead for ReadAhead<R, B> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.buffered().is_empty() {
            self.fill(1)?;
        }
        Ok(self.buffered())
    }

    fn consume(&mut self, amt: usize) {
        ReadAhead::consume(self, amt)
    }
}

impl<R: Read + Seek, B: AsRef<[u8]> + AsMut<[u8]>> Seek for ReadAhead<R, B> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(p) => p,
            SeekFrom::End(d) => return self.seek_from_end(d).map_err(Into::into),
            SeekFrom::Current(d) => self.tell().checked_add_signed(d).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "seek to a negative or overflowing position",
                )
            })?,
        };
        ReadAhead::seek(self, target).map_err(Into::into)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.tell())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem_source::{pattern, MemorySource};

    #[test]
    fn read_exact_and_empty_reads() {
        let mut r = ReadAhead::new(MemorySource::patterned(1000)).unwrap();
        assert_eq!(Read::read(&mut r, &mut []).unwrap(), 0);
        let mut out = [0u8; 600];
        r.read_exact(&mut out).unwrap();
        assert_eq!(&out[..], &pattern(600)[..]);
        let err = r.read_exact(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn lines_through_bufread() {
        let text = b"alpha\nbeta\ngamma\n".to_vec();
        let r = ReadAhead::new(MemorySource::new(text)).unwrap();
        let lines: Vec<String> = r.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn fill_buf_at_eof_is_empty() {
        let mut r = ReadAhead::new(MemorySource::patterned(3)).unwrap();
        assert_eq!(r.fill_buf().unwrap(), &[0, 1, 2]);
        BufRead::consume(&mut r, 3);
        assert!(r.fill_buf().unwrap().is_empty());
        assert!(r.fill_buf().unwrap().is_empty());
    }

    #[test]
    fn seek_from_current_uses_logical_position() {
        let mut r = ReadAhead::new(MemorySource::patterned(10_000)).unwrap();
        let mut out = [0u8; 100];
        r.read_exact(&mut out).unwrap();
        assert_eq!(Seek::seek(&mut r, SeekFrom::Current(-40)).unwrap(), 60);
        assert_eq!(r.stream_position().unwrap(), 60);
        assert!(Seek::seek(&mut r, SeekFrom::Current(-61)).is_err());
    }
}
