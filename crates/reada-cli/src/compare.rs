//! Read-strategy comparison over header-stream files.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::ValueEnum;

use reada_core::config::ReadaConfig;
use reada_io::{ReadAhead, ReadStats};

use crate::rpm::{scan, HeaderReader, PlainReader, ReadaReader, ScanError, StdBufReader};

/// How the scanner pulls bytes from each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// One read call per request, no buffering.
    Read,
    /// Readahead with page-aligned scatter refills.
    Reada,
    /// `std::io::BufReader` with the same capacity.
    Bufread,
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub files: usize,
    pub headers: usize,
    pub bytes: u64,
    pub elapsed: Duration,
    /// Summed over all files; only collected in `Mode::Reada`.
    pub stats: Option<ReadStats>,
}

/// Unbuffered handle on the stdin descriptor.
///
/// `io::stdin()` reads through its own internal buffer, which would put a
/// second buffer under every strategy being compared.
#[cfg(unix)]
pub fn raw_stdin() -> io::Result<File> {
    use std::os::fd::AsFd;
    Ok(File::from(io::stdin().as_fd().try_clone_to_owned()?))
}

#[cfg(windows)]
pub fn raw_stdin() -> io::Result<File> {
    use std::os::windows::io::AsHandle;
    Ok(File::from(io::stdin().as_handle().try_clone_to_owned()?))
}

/// Open `path` (`-` for stdin) as a header reader for `mode`.
///
/// Stdin is read from its descriptor directly. Pipe mode is detected unless
/// `cfg.pipe` forces it: a redirected regular file still gets aligned refills.
pub fn open_reader(
    path: &Path,
    mode: Mode,
    cfg: &ReadaConfig,
    verify_peek: bool,
) -> Result<Box<dyn HeaderReader>, ScanError> {
    let stdin = path == Path::new("-");
    let reader: Box<dyn HeaderReader> = match (mode, stdin) {
        (Mode::Read, true) => Box::new(PlainReader(raw_stdin()?)),
        (Mode::Read, false) => Box::new(PlainReader(File::open(path)?)),
        (Mode::Bufread, true) => Box::new(StdBufReader(BufReader::with_capacity(
            cfg.capacity,
            raw_stdin()?,
        ))),
        (Mode::Bufread, false) => Box::new(StdBufReader(BufReader::with_capacity(
            cfg.capacity,
            File::open(path)?,
        ))),
        (Mode::Reada, true) => {
            let ra = ReadAhead::with_config(raw_stdin()?, cfg)?;
            Box::new(ReadaReader::new(ra, verify_peek))
        }
        (Mode::Reada, false) => {
            let ra = ReadAhead::with_config(File::open(path)?, cfg)?;
            Box::new(ReadaReader::new(ra, verify_peek))
        }
    };
    Ok(reader)
}

/// Scan every file in order and total the results.
pub fn run(
    paths: &[PathBuf],
    mode: Mode,
    cfg: &ReadaConfig,
    verify_peek: bool,
) -> Result<Report, ScanError> {
    let mut report = Report::default();
    let started = Instant::now();

    for path in paths {
        let mut reader = open_reader(path, mode, cfg, verify_peek)?;
        let summary = scan(reader.as_mut(), |_| {})?;

        tracing::debug!(
            path = %path.display(),
            headers = summary.headers,
            bytes = summary.bytes,
            "scanned"
        );

        report.files += 1;
        report.headers += summary.headers;
        report.bytes += summary.bytes;
        if let Some(s) = reader.stats() {
            let total = report.stats.get_or_insert_with(ReadStats::default);
            total.reads += s.reads;
            total.vectored_reads += s.vectored_reads;
            total.seeks += s.seeks;
            total.interrupted += s.interrupted;
            total.bytes_fetched += s.bytes_fetched;
        }
    }

    report.elapsed = started.elapsed();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpm::synthetic_stream;
    use std::fs;

    fn temp_stream(name: &str, records: usize) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("reada-compare-{name}-{}", std::process::id()));
        fs::write(&path, synthetic_stream(records)).expect("write stream");
        path
    }

    #[test]
    fn modes_report_identical_totals() {
        let a = temp_stream("a", 50);
        let b = temp_stream("b", 120);
        let paths = vec![a.clone(), b.clone()];
        let cfg = ReadaConfig::default();

        let plain = run(&paths, Mode::Read, &cfg, false).unwrap();
        let reada = run(&paths, Mode::Reada, &cfg, true).unwrap();
        let bufread = run(&paths, Mode::Bufread, &cfg, false).unwrap();

        assert_eq!(plain.headers, 170);
        assert_eq!((reada.headers, reada.bytes), (plain.headers, plain.bytes));
        assert_eq!((bufread.headers, bufread.bytes), (plain.headers, plain.bytes));
        assert!(plain.stats.is_none());

        let stats = reada.stats.expect("reada stats");
        assert_eq!(stats.bytes_fetched, plain.bytes);
        assert_eq!(stats.seeks, 0);

        let _ = fs::remove_file(a);
        let _ = fs::remove_file(b);
    }

    #[cfg(unix)]
    #[test]
    fn stdin_is_opened_without_std_buffering() {
        // Construction only queries the position; nothing is read from stdin.
        let reader = open_reader(Path::new("-"), Mode::Reada, &ReadaConfig::default(), false)
            .expect("stdin reader");
        let stats = reader.stats().expect("reada stats");
        assert_eq!(stats.syscalls(), 0);
        assert!(raw_stdin().is_ok());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = run(
            &[PathBuf::from("/nonexistent/reada/stream")],
            Mode::Reada,
            &ReadaConfig::default(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::Io(_)));
    }
}
