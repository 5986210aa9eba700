//! Priority levels
//!
//! A priority decides where a package lands in the output: higher
//! priorities are listed first.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when building a priority
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriorityError {
    /// The text is not an integer
    #[error("invalid priority '{0}': not an integer")]
    NotAnInteger(String),

    /// The value is outside `0..=10`
    #[error(
        "priorities should be between {min} and {max}, got {0}",
        min = Priority::MIN,
        max = Priority::MAX
    )]
    OutOfRange(i64),
}

/// A package priority in the range `0..=10`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "u8")]
pub struct Priority(u8);

impl Priority {
    /// Lowest priority, assigned when no rule matches
    pub const MIN: Self = Self(0);

    /// Highest priority
    pub const MAX: Self = Self(10);

    /// Create a priority, checking the range
    pub fn new(value: i64) -> Result<Self, PriorityError> {
        u8::try_from(value)
            .ok()
            .map(Self)
            .filter(|p| *p <= Self::MAX)
            .ok_or(PriorityError::OutOfRange(value))
    }

    /// Numeric value
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Priority {
    type Error = PriorityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl std::str::FromStr for Priority {
    type Err = PriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value: i64 =
            trimmed.parse().map_err(|_| PriorityError::NotAnInteger(trimmed.to_string()))?;
        Self::new(value)
    }
}
