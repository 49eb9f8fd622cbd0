//! Explanations for formulas that have been violated.
//!
//! When a formula evaluates to false, the [`Verdict`](crate::Verdict) carries a [`Violation`]
//! tree. Each combinator that contributed to the failure wraps the violation of its failing
//! child, so walking the tree from the root down ends at the leaf whose description and time
//! identify exactly what failed and when.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::time::Time;

/// Which operand of a binary operator caused a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// Reason an `eventually` obligation was not met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventuallyViolation {
    /// The bound elapsed at the given time without the subformula holding.
    TimedOut(Time),

    /// The trace ended without the subformula holding. Only produced by
    /// [`stop_default`](crate::stop_default).
    TestEnded,
}

/// Tree explaining why a formula was judged false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A literal or predicate was false.
    False { description: String, time: Time },

    /// The negated subformula held.
    Not { description: String, time: Time },

    And { side: Side, violation: Box<Violation> },

    Or { left: Box<Violation>, right: Box<Violation> },

    /// The antecedent held but the consequent was violated.
    Implies { antecedent: String, violation: Box<Violation> },

    /// The subformula was violated inside the window `[start, end]`. An `end` of `None` is an
    /// unbounded window.
    Always {
        subformula: String,
        start: Time,
        end: Option<Duration>,
        violation: Box<Violation>,
    },

    Eventually {
        subformula: String,
        start: Time,
        end: Option<Duration>,
        reason: EventuallyViolation,
    },
}

/// Operator responsible for a [`Violation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    Pure,
    Not,
    And,
    Or,
    Implies,
    Always,
    Eventually,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pure => "pure",
            Self::Not => "not",
            Self::And => "and",
            Self::Or => "or",
            Self::Implies => "implies",
            Self::Always => "always",
            Self::Eventually => "eventually",
        }
    }
}

impl Display for ViolationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Self::False { .. } => ViolationKind::Pure,
            Self::Not { .. } => ViolationKind::Not,
            Self::And { .. } => ViolationKind::And,
            Self::Or { .. } => ViolationKind::Or,
            Self::Implies { .. } => ViolationKind::Implies,
            Self::Always { .. } => ViolationKind::Always,
            Self::Eventually { .. } => ViolationKind::Eventually,
        }
    }

    /// Follow the first decisive child of each node down to the violation that caused the
    /// failure.
    ///
    /// For disjunctions both operands failed, the left one is followed.
    pub fn leaf(&self) -> &Violation {
        match self {
            Self::And { violation, .. }
            | Self::Implies { violation, .. }
            | Self::Always { violation, .. } => violation.leaf(),
            Self::Or { left, .. } => left.leaf(),
            Self::False { .. } | Self::Not { .. } | Self::Eventually { .. } => self,
        }
    }

    /// Time at which the leaf violation occurred.
    ///
    /// Returns [`None`] only for `eventually` obligations that were still open when the trace
    /// ended.
    pub fn time(&self) -> Option<Time> {
        match self.leaf() {
            Self::False { time, .. } | Self::Not { time, .. } => Some(*time),
            Self::Eventually {
                reason: EventuallyViolation::TimedOut(time),
                ..
            } => Some(*time),
            _ => None,
        }
    }

    /// Description of the formula at the leaf of the violation.
    pub fn description(&self) -> &str {
        match self.leaf() {
            Self::False { description, .. } | Self::Not { description, .. } => description,
            Self::Eventually { subformula, .. } => subformula,
            _ => "",
        }
    }
}

fn write_window(f: &mut Formatter<'_>, start: &Time, end: &Option<Duration>) -> std::fmt::Result {
    match end {
        Some(end) => write!(f, "[{}ms, {}ms]", start.elapsed().as_millis(), end.as_millis()),
        None => write!(f, "[{}ms, ..)", start.elapsed().as_millis()),
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::False { description, time } => {
                write!(f, "`{}` was false at {}", description, time)
            }
            Self::Not { description, time } => {
                write!(f, "`{}` held at {} but should not have", description, time)
            }
            Self::And { side, violation } => {
                write!(f, "{} side of conjunction failed: {}", side, violation)
            }
            Self::Or { left, right } => {
                write!(f, "both sides of disjunction failed: ({}) and ({})", left, right)
            }
            Self::Implies { antecedent, violation } => {
                write!(f, "`{}` held, but {}", antecedent, violation)
            }
            Self::Always {
                subformula,
                start,
                end,
                violation,
            } => {
                write!(f, "always `{}` in ", subformula)?;
                write_window(f, start, end)?;
                write!(f, " failed: {}", violation)
            }
            Self::Eventually {
                subformula,
                start,
                end,
                reason,
            } => {
                write!(f, "eventually `{}` in ", subformula)?;
                write_window(f, start, end)?;

                match reason {
                    EventuallyViolation::TimedOut(time) => write!(f, " timed out at {}", time),
                    EventuallyViolation::TestEnded => {
                        write!(f, " was still pending when the trace ended")
                    }
                }
            }
        }
    }
}
