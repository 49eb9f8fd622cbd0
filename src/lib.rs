//! Incremental runtime monitoring of Linear Temporal Logic formulas.
//!
//! This crate evaluates LTL formulas against a trace of states that arrives one state at a time.
//! After every state a formula is either definitely satisfied, definitely violated with a
//! [`Violation`] explaining what failed and when, or still undecided with a [`Residual`] holding
//! the remaining obligation.
//!
//! States are handed to a [`Registry`], and formulas observe them through [`Cell`]s, which are
//! pure queries bound to the current state of a registry:
//!
//! ```rust
//! use ltl_monitor::{always, evaluate, step, predicate, Formula, Registry, Verdict};
//!
//! let registry = Registry::new();
//! let count = registry.extract(|state: &u32| *state);
//! let formula = Formula::from(always(predicate!{ count.current()? <= 5 }));
//!
//! let mut verdict = evaluate(&formula, registry.register(1)).unwrap();
//!
//! for state in [1, 6] {
//!     let residual = verdict.residual().unwrap().clone();
//!     verdict = step(&residual, registry.register(state)).unwrap();
//! }
//!
//! assert!(matches!(verdict, Verdict::False(_)));
//! ```
//!
//! Whole traces can be checked at once using [`run_check`] or [`run_timed_check`], and several
//! named properties can be monitored side by side with a [`Monitor`].
//!
//! The crate performs no I/O and never decides when a state should be observed, it only judges
//! the states it is given.
#![deny(clippy::all)]

use thiserror::Error;

pub mod cell;
pub mod check;
pub mod evaluate;
pub mod formula;
pub mod monitor;
pub mod operators;
pub mod predicate;
pub mod registry;
pub mod stop;
pub mod time;
pub mod trace;
pub mod violation;

pub use crate::cell::Cell;
pub use crate::check::{run_check, run_timed_check, CheckResult};
pub use crate::evaluate::{evaluate, step, Residual, ResidualKind, Verdict};
pub use crate::formula::{always, eventually, next, not, pure, Formula};
pub use crate::monitor::{Monitor, MonitorError, PropertyState};
pub use crate::operators::BoundError;
pub use crate::predicate::{Literal, Predicate, PredicateOutput};
pub use crate::registry::{Registry, RegistryError};
pub use crate::stop::{stop_default, StopDefault};
pub use crate::time::{Clock, Time, TimeUnit};
pub use crate::trace::Trace;
pub use crate::violation::{EventuallyViolation, Side, Violation, ViolationKind};

/// Errors that can occur while evaluating a formula.
///
/// Logical outcomes are never errors: a violated formula produces a [`Verdict::False`]. Errors
/// indicate that evaluation itself could not be carried out.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Empty trace")]
    EmptyTrace,

    #[error("Trace time {0} cannot be used as an offset from the start of the trace")]
    InvalidTime(f64),

    /// Failure reported by a user-supplied predicate.
    #[error("Predicate error: {0}")]
    Predicate(String),
}

impl EvaluationError {
    /// Create an error for a predicate that could not be evaluated.
    ///
    /// ```rust
    /// use ltl_monitor::{EvaluationError, Formula};
    ///
    /// let formula = Formula::predicate("parsed", || -> Result<bool, EvaluationError> {
    ///     let value: i32 = "12a".parse().map_err(EvaluationError::predicate)?;
    ///     Ok(value > 0)
    /// });
    /// ```
    pub fn predicate<E>(error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::Predicate(error.to_string())
    }
}
