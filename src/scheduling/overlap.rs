use chrono::{DateTime, Utc};
use thiserror::Error;

/// A malformed half-open interval (`start >= end`). Never silently coerced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid interval: start {start} is not before end {end}")]
pub struct InvalidInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A well-formed half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidInterval> {
        if start >= end {
            return Err(InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Constructs without validation. Caller guarantees `start < end`;
    /// used for intervals already validated at insertion time.
    pub fn new_unchecked(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start < end);
        Self { start, end }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Returns true iff the two half-open intervals share at least one instant.
///
/// Touching endpoints (`a.end == b.start`) are not an overlap, so
/// back-to-back placements are legal. Symmetric and side-effect free.
pub fn overlaps(a: &Interval, b: &Interval) -> bool {
    a.start < b.end && a.end > b.start
}
