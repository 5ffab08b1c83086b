//! Latched EOF/failure behavior and recovery through reposition.

use reada::{Error, MemorySource, ReadAhead, StreamState};
use reada_io::mem_source::pattern;

#[test]
fn test_error_with_progress_is_reported_on_next_call() {
    let src = MemorySource::patterned(10_000).with_failure_at(5000);
    let mut r = ReadAhead::new(src).unwrap();

    let mut out = vec![0u8; 3000];
    assert_eq!(r.read(&mut out).unwrap(), 3000);

    // 2000 bytes are buffered up to the failure point; they are still delivered.
    assert_eq!(r.read(&mut out).unwrap(), 2000);
    assert_eq!(&out[..2000], &pattern(5000)[3000..]);
    assert!(r.state().is_failed());

    let err = r.read(&mut out).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(!err.is_retryable());

    // Reported once; afterwards the stream is quiet and stays off the source.
    let calls = r.stats().syscalls();
    assert_eq!(r.read(&mut out).unwrap(), 0);
    assert_eq!(r.peek(&mut out).unwrap(), 0);
    assert_eq!(r.skip(10).unwrap(), 0);
    assert_eq!(r.stats().syscalls(), calls);
}

#[test]
fn test_error_without_progress_is_immediate() {
    let src = MemorySource::patterned(10_000).with_failure_at(0);
    let mut r = ReadAhead::new(src).unwrap();
    let mut out = [0u8; 16];
    assert!(matches!(r.read(&mut out), Err(Error::Io(_))));
    assert_eq!(
        r.state(),
        StreamState::Failed(std::io::ErrorKind::Other)
    );
    assert_eq!(r.read(&mut out).unwrap(), 0);
}

#[test]
fn test_peek_failure_keeps_buffered_bytes() {
    let src = MemorySource::patterned(10_000)
        .with_max_chunk(100)
        .with_failure_at(250);
    let mut r = ReadAhead::new(src).unwrap();

    let mut out = vec![0u8; 1000];
    assert_eq!(r.peek(&mut out).unwrap(), 250);
    assert_eq!(&out[..250], &pattern(250)[..]);
    assert!(r.state().is_failed());

    // Buffered bytes remain readable; the failure surfaces once they run out.
    let mut small = vec![0u8; 250];
    assert_eq!(r.read(&mut small).unwrap(), 250);
    assert!(r.read(&mut small).is_err());
    assert_eq!(r.read(&mut small).unwrap(), 0);
}

#[test]
fn test_real_seek_clears_failure() {
    let mut r = ReadAhead::new(MemorySource::patterned(10_000).with_failure_at(4000)).unwrap();
    let mut out = vec![0u8; 6000];
    assert_eq!(r.read(&mut out).unwrap(), 4000);
    assert!(r.state().is_failed());

    r.get_mut().heal();
    let here = r.tell();
    assert_eq!(r.seek(here).unwrap(), 4000);
    assert!(r.state().is_active());
    assert_eq!(r.read(&mut out).unwrap(), 6000);
    assert_eq!(&out[..], &pattern(10_000)[4000..]);
}

#[test]
fn test_real_seek_clears_eof() {
    let mut r = ReadAhead::new(MemorySource::patterned(3000)).unwrap();
    let mut out = vec![0u8; 4000];
    assert_eq!(r.read(&mut out).unwrap(), 3000);
    assert_eq!(r.state(), StreamState::Eof);

    assert_eq!(r.seek(1000).unwrap(), 1000);
    assert_eq!(r.state(), StreamState::Active);
    assert_eq!(r.read(&mut out).unwrap(), 2000);
    assert_eq!(&out[..2000], &pattern(3000)[1000..]);
}

#[test]
fn test_failed_seek_keeps_latched_state() {
    let mut r = ReadAhead::new(MemorySource::patterned(100)).unwrap();
    let mut out = vec![0u8; 200];
    assert_eq!(r.read(&mut out).unwrap(), 100);

    r.get_mut().fail_next_seek();
    let err = r.seek(0).unwrap_err();
    assert!(matches!(err, Error::Seek(_)));
    assert!(err.is_retryable());
    assert!(r.state().is_eof());
    assert_eq!(r.tell(), 100);

    // A retry is safe.
    assert_eq!(r.seek(0).unwrap(), 0);
    assert_eq!(r.read(&mut out).unwrap(), 100);
}

#[test]
fn test_invalid_arguments_do_not_touch_state() {
    let mut r = ReadAhead::new(MemorySource::patterned(100)).unwrap();
    let mut huge = vec![0u8; r.capacity() + 1];
    let err = r.peek(&mut huge).unwrap_err();
    assert!(err.is_retryable());
    assert!(r.state().is_active());
    assert_eq!(r.stats().syscalls(), 0);
}

#[test]
fn test_skip_past_failure_reports_partial_then_error_once() {
    let src = MemorySource::patterned(10_000).with_failure_at(5000);
    let mut r = ReadAhead::new(src).unwrap();

    assert_eq!(r.skip(3000).unwrap(), 3000);
    // Only the 2000 bytes before the failure point can be skipped.
    assert_eq!(r.skip(4000).unwrap(), 2000);
    assert_eq!(r.tell(), 5000);
    assert!(r.state().is_failed());

    let err = r.skip(10).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert!(!err.is_retryable());

    let calls = r.stats().syscalls();
    assert_eq!(r.skip(10).unwrap(), 0);
    assert_eq!(r.stats().syscalls(), calls);
}

#[test]
fn test_skip_failure_without_progress_is_immediate() {
    let src = MemorySource::patterned(10_000).with_failure_at(0);
    let mut r = ReadAhead::new(src).unwrap();
    assert!(matches!(r.skip(100), Err(Error::Io(_))));
    assert!(r.state().is_failed());
    assert_eq!(r.skip(100).unwrap(), 0);
}
