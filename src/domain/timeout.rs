//! Validated execution deadline.
//!
//! A `TimeoutSecs` can only be built inside the accepted range, so the
//! sandbox never has to re-check it.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RefineError, Result};

/// Wall-clock deadline in whole seconds, always within 1..=30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TimeoutSecs(u64);

impl TimeoutSecs {
    /// Smallest accepted deadline.
    pub const MIN: u64 = 1;
    /// Largest accepted deadline.
    pub const MAX: u64 = 30;
    /// Deadline used when the caller does not supply one.
    pub const DEFAULT: u64 = 10;

    /// Validate and wrap a deadline. Out-of-range values are rejected, never clamped.
    pub fn new(secs: u64) -> Result<Self> {
        if secs < Self::MIN {
            return Err(RefineError::Validation(format!("timeout must be >= {}, got {}", Self::MIN, secs)));
        }
        if secs > Self::MAX {
            return Err(RefineError::Validation(format!("timeout must be <= {}, got {}", Self::MAX, secs)));
        }
        Ok(Self(secs))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for TimeoutSecs {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<u64> for TimeoutSecs {
    type Error = RefineError;

    fn try_from(secs: u64) -> Result<Self> {
        Self::new(secs)
    }
}

impl From<TimeoutSecs> for u64 {
    fn from(timeout: TimeoutSecs) -> Self {
        timeout.0
    }
}

impl fmt::Display for TimeoutSecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
