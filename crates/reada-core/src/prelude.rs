//! Convenient re-exports for downstream crates.

pub use crate::config::{ReadaConfig, DEFAULT_CAPACITY, DEFAULT_PAGE_SIZE};
pub use crate::error::{Error, Result};
pub use crate::page::{is_aligned, refill_len};
pub use crate::state::StreamState;
