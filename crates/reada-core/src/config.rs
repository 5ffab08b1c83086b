//! Readahead configuration that callers can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default buffer capacity: two pages.
pub const DEFAULT_CAPACITY: usize = 8192;

/// Page size the refills align to.
pub const DEFAULT_PAGE_SIZE: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadaConfig {
    /// Readahead buffer capacity in bytes. Must be a multiple of `page_size`
    /// and at least two pages.
    pub capacity: usize,

    /// Alignment target for refills. Must be a power of two.
    pub page_size: usize,

    /// Force pipe mode on or off. `None` detects it from the source: a source
    /// whose current position cannot be queried is treated as a pipe.
    pub pipe: Option<bool>,
}

impl Default for ReadaConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            page_size: DEFAULT_PAGE_SIZE,
            pipe: None,
        }
    }
}

impl ReadaConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `READA_CAPACITY`: buffer capacity in bytes
    /// - `READA_PAGE_SIZE`: refill alignment in bytes
    /// - `READA_PIPE`: `1`/`true` forces pipe mode, `0`/`false` disables it
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("READA_CAPACITY") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.capacity = v;
            }
        }

        if let Ok(s) = std::env::var("READA_PAGE_SIZE") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.page_size = v;
            }
        }

        if let Ok(s) = std::env::var("READA_PIPE") {
            cfg.pipe = parse_flag(&s);
        }

        cfg
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the capacity/page rules the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || !self.page_size.is_power_of_two() {
            return Err(Error::Config(format!(
                "page size {} is not a power of two",
                self.page_size
            )));
        }
        if self.capacity == 0 || self.capacity % self.page_size != 0 {
            return Err(Error::Config(format!(
                "capacity {} is not a positive multiple of the page size {}",
                self.capacity, self.page_size
            )));
        }
        // Refills must keep a full page of headroom past any request.
        if self.capacity / self.page_size < 2 {
            return Err(Error::Config(format!(
                "capacity {} must hold at least two pages of {}",
                self.capacity, self.page_size
            )));
        }
        Ok(())
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
