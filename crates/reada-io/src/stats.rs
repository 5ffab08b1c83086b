//! Lightweight per-stream syscall counters.
//!
//! Plain integers: a `ReadAhead` has exactly one owner.

/// Calls issued against the underlying source, including interrupted attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Plain reads issued by peek/fill/skip.
    pub reads: u64,
    /// Scatter reads issued by read.
    pub vectored_reads: u64,
    /// Real seeks issued by reposition.
    pub seeks: u64,
    /// Attempts that came back `Interrupted` and were retried.
    pub interrupted: u64,
    /// Bytes the source delivered.
    pub bytes_fetched: u64,
}

impl ReadStats {
    pub fn syscalls(&self) -> u64 {
        self.reads + self.vectored_reads + self.seeks
    }
}
