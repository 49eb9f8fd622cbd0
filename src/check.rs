//! Checking a formula against a whole trace.
//!
//! [`run_check`] and [`run_timed_check`] drive the evaluator over a finite sequence of states:
//! the registry is reset, the first state is registered and the formula evaluated at its time,
//! then every following state is registered and the residual stepped. Checking stops as soon as
//! the formula is settled, states after that point are never registered.
//!
//! ```rust
//! use ltl_monitor::{always, predicate, run_check, CheckResult, Formula, Registry};
//!
//! let registry = Registry::new();
//! let count = registry.extract(|state: &u32| *state);
//! let formula = Formula::from(always(predicate!{ count.current()? <= 5 }));
//!
//! let result = run_check(&registry, &formula, [1, 1, 6]).unwrap();
//!
//! match result {
//!     CheckResult::Failed(violation) => assert_eq!(violation.time().unwrap().tick(), 2),
//!     other => panic!("unexpected result {:?}", other),
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::evaluate::{evaluate, step, ResidualKind, Verdict};
use crate::formula::Formula;
use crate::registry::Registry;
use crate::time::Time;
use crate::trace::Trace;
use crate::violation::Violation;
use crate::EvaluationError;

/// Outcome of checking a formula against a finite trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Passed,
    Failed(Violation),

    /// The trace ended before the formula was settled.
    Inconclusive(ResidualKind),
}

impl CheckResult {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_inconclusive(&self) -> bool {
        matches!(self, Self::Inconclusive(_))
    }
}

impl From<Verdict> for CheckResult {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::True => Self::Passed,
            Verdict::False(violation) => Self::Failed(violation),
            Verdict::Residual(residual) => Self::Inconclusive(residual.kind()),
        }
    }
}

impl Display for CheckResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed(violation) => write!(f, "failed: {}", violation),
            Self::Inconclusive(kind) => write!(f, "inconclusive ({} pending)", kind),
        }
    }
}

/// Evaluate the formula at the first time and step through the rest until settled.
///
/// `times` registers a state each time it is advanced, so no state is registered once the
/// formula is settled.
fn check<I>(formula: &Formula, mut times: I) -> Result<Verdict, EvaluationError>
where
    I: Iterator<Item = Result<Time, EvaluationError>>,
{
    let first = times.next().ok_or(EvaluationError::EmptyTrace)??;
    let mut verdict = evaluate(formula, first)?;

    tracing::trace!(tick = first.tick(), verdict = %verdict, "evaluated formula");

    loop {
        let residual = match &verdict {
            Verdict::Residual(residual) => residual,
            _ => break,
        };

        let time = match times.next() {
            Some(time) => time?,
            None => break,
        };

        let next = step(residual, time)?;

        tracing::trace!(tick = time.tick(), verdict = %next, "stepped residual");
        verdict = next;
    }

    Ok(verdict)
}

fn report(formula: &Formula, verdict: Verdict) -> CheckResult {
    let result = CheckResult::from(verdict);

    tracing::debug!(formula = %formula, result = %result, "check finished");
    result
}

/// Check `formula` against a sequence of states.
///
/// States are stamped by the clock of the registry. The registry is reset before the first state
/// is registered, and an empty sequence is reported as [`EvaluationError::EmptyTrace`].
pub fn run_check<S, I>(
    registry: &Registry<S>,
    formula: &Formula,
    states: I,
) -> Result<CheckResult, EvaluationError>
where
    I: IntoIterator<Item = S>,
{
    registry.reset();

    let times = states.into_iter().map(|state| Ok(registry.register(state)));
    let verdict = check(formula, times)?;

    Ok(report(formula, verdict))
}

/// Check `formula` against a trace of timed states.
///
/// The time of each state, in seconds, is measured relative to the first state of the trace and
/// used as its elapsed offset, so time bounds are measured against the times in the trace rather
/// than the clock of the registry.
///
/// ```rust
/// use ltl_monitor::{eventually, pure, run_timed_check, Formula, Registry, TimeUnit, Trace};
///
/// let registry = Registry::new();
/// let ready = registry.extract(|state: &bool| *state);
/// let formula = eventually(Formula::predicate("ready", move || Ok(ready.current()?)))
///     .within(2, TimeUnit::Seconds)
///     .unwrap();
///
/// let trace = Trace::from([(10.0, false), (11.0, false), (12.5, true)]);
/// let result = run_timed_check(&registry, &formula.into(), trace).unwrap();
///
/// assert!(result.is_failed());
/// ```
pub fn run_timed_check<S>(
    registry: &Registry<S>,
    formula: &Formula,
    trace: Trace<S>,
) -> Result<CheckResult, EvaluationError> {
    registry.reset();

    let mut origin = None;
    let times = trace.into_iter().map(|(time, state)| {
        let start = *origin.get_or_insert(time);
        let elapsed = Duration::try_from_secs_f64(time - start)
            .map_err(|_| EvaluationError::InvalidTime(time))?;

        Ok(registry.register_at(state, elapsed)?)
    });

    let verdict = check(formula, times)?;

    Ok(report(formula, verdict))
}
