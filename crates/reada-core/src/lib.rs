#![forbid(unsafe_code)]
//! reada-core: errors, configuration, terminal stream state and page arithmetic.
//!
//! Everything the readahead engine needs to agree on with its callers lives
//! here. No I/O happens in this crate; `reada-io` owns the descriptor.

pub mod config;
pub mod error;
pub mod page;
pub mod prelude;
pub mod state;

pub use config::ReadaConfig;
pub use error::{Error, Result};
pub use state::StreamState;
