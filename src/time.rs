//! Logical timestamps for registered states.
//!
//! Every state handed to a [`Registry`](crate::Registry) is stamped with a [`Time`]. A `Time`
//! carries two values:
//!
//!   - a _tick_, which increases by exactly one for every registration and is only used to order
//!     states, and
//!   - an _elapsed_ offset from the first state of the trace, which is what the temporal bounds
//!     set by `within` are measured against.
//!
//! The elapsed offset is produced either by the registry [`Clock`], which advances by a fixed
//! period for every registration, or supplied by the caller when states are timestamped
//! externally.

use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Position of a registered state in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    tick: u64,
    elapsed: Duration,
}

impl Time {
    /// Create a time value directly. Times are normally obtained from
    /// [`Registry::register`](crate::Registry::register).
    pub fn new(tick: u64, elapsed: Duration) -> Self {
        Self { tick, elapsed }
    }

    /// Number of registrations that preceded this one in the current trace.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Offset of this state from the first state in the trace.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} (+{}ms)", self.tick, self.elapsed.as_millis())
    }
}

/// Unit of a temporal bound given to `within`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    /// Convert `n` units into a single [`Duration`].
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use ltl_monitor::TimeUnit;
    ///
    /// assert_eq!(TimeUnit::Seconds.normalize(5), Duration::from_millis(5000));
    /// ```
    pub fn normalize(self, n: u64) -> Duration {
        match self {
            Self::Milliseconds => Duration::from_millis(n),
            Self::Seconds => Duration::from_secs(n),
        }
    }
}

impl Display for TimeUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Milliseconds => write!(f, "milliseconds"),
            Self::Seconds => write!(f, "seconds"),
        }
    }
}

/// Source of elapsed offsets for states registered without an explicit timestamp.
///
/// The default clock advances by one millisecond per registration, so ticks and milliseconds
/// coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    period: Duration,
}

impl Clock {
    /// Create a clock that advances by `period` for every registration.
    pub fn with_period(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub(crate) fn advance(&self, previous: Option<Duration>) -> Duration {
        match previous {
            Some(elapsed) => elapsed.saturating_add(self.period),
            None => Duration::ZERO,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::with_period(Duration::from_millis(1))
    }
}
