//! reada-cli: consumers of the readahead engine.
//!
//! - `rpm`: the header-stream scanner the engine was built to serve.
//! - `compare`: runs the scanner over files with each read strategy.

pub mod compare;
pub mod rpm;
