#![forbid(unsafe_code)]
//! reada-io: readahead over a raw reader with peek, skip and windowed seek.
//!
//! `ReadAhead` keeps one fixed-capacity lookahead window per source and
//! refills it with page-aligned reads. A read that runs past the window is
//! finished by a single scatter read whose second slice refills the window.
//!
//! - `readahead`: the engine and its five primitives.
//! - `buf`: `std::io::{Read, BufRead, Seek}` on top of the primitives.
//! - `source`: adapter for non-seekable readers (pipes, sockets, stdin).
//! - `mem_source`: instrumented in-memory source used by tests and benches.

pub mod buf;
pub mod mem_source;
pub mod readahead;
pub mod source;
pub mod stats;

pub use mem_source::MemorySource;
pub use readahead::ReadAhead;
pub use source::Unseekable;
pub use stats::ReadStats;

pub use reada_core::{Error, ReadaConfig, Result, StreamState};
