//! Latched terminal condition of a readahead stream.

use std::fmt;
use std::io;

/// Once a stream leaves `Active`, no further bytes are fetched from the
/// source until a real seek succeeds. Bytes already buffered are still served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    #[default]
    Active,
    /// The source returned zero bytes.
    Eof,
    /// The source failed with an error other than `Interrupted`.
    Failed(io::ErrorKind),
}

impl StreamState {
    pub fn is_active(&self) -> bool {
        matches!(self, StreamState::Active)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, StreamState::Eof)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StreamState::Failed(_))
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamState::Active => f.write_str("active"),
            StreamState::Eof => f.write_str("eof"),
            StreamState::Failed(kind) => write!(f, "failed ({kind})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_active() {
        let s = StreamState::default();
        assert!(s.is_active());
        assert!(!s.is_terminal());
    }

    #[test]
    fn terminal_states() {
        assert!(StreamState::Eof.is_terminal());
        assert!(StreamState::Failed(io::ErrorKind::BrokenPipe).is_failed());
        assert_eq!(StreamState::Eof.to_string(), "eof");
    }
}
