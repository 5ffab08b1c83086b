//! reada: page-aligned readahead with peek, skip and windowed seek.
//!
//! The engine lives in `reada-io`; configuration and errors in `reada-core`.

pub use reada_core::config::ReadaConfig;
pub use reada_core::error::{Error, Result};
pub use reada_core::state::StreamState;
pub use reada_io::{MemorySource, ReadAhead, ReadStats, Unseekable};
