//! Definitions of forward temporal operators
//!
//! Forward operators depend on the states that follow the time they are first evaluated at. An
//! unbounded operator covers every remaining state of the trace, while a bounded operator covers
//! the states whose elapsed time is at most `start + bound`.
//!
//! Below is the window of an unbounded operator first evaluated at time T2:
//!
//! ```text
//! T1  T2  T3  T4 ... Tn
//! S1  S2  S3  S4 ... Sn
//!     |               |
//!     -----------------
//! ```
//!
//! Compare this to the window of an operator first evaluated at T2 with a bound reaching T4:
//!
//! ```text
//! T1  T2  T3  T4  T5 ... Tn
//! S1  S2  S3  S4  S5 ... Sn
//!     |       |
//!     ---------
//! ```
//!
//! Because states arrive one at a time, an operator cannot look ahead. Instead each evaluation
//! either settles the operator or leaves a residual that is stepped with the following state.

use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

use crate::evaluate::{evaluate, Derived, Node, Residual, Verdict};
use crate::formula::Formula;
use crate::time::{Time, TimeUnit};
use crate::violation::{EventuallyViolation, Violation};
use crate::EvaluationError;

/// Error produced when constructing a bounded temporal operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoundError {
    #[error("time bound is already set for `{0}`")]
    AlreadySet(&'static str),
}

/// Temporal operator that defers its subformula to the following state.
///
/// The current state is never inspected, evaluating `next` always produces a residual. If the
/// trace ends before another state arrives the obligation is left undecided.
///
/// ```rust
/// use ltl_monitor::pure;
/// use ltl_monitor::operators::Next;
///
/// let formula = Next::new(pure(true, "ready"));
/// ```
#[derive(Debug, Clone)]
pub struct Next {
    subformula: Rc<Formula>,
}

impl Next {
    pub fn new<F>(subformula: F) -> Self
    where
        F: Into<Formula>,
    {
        Self {
            subformula: Rc::new(subformula.into()),
        }
    }

    pub fn subformula(&self) -> &Formula {
        &self.subformula
    }

    pub(crate) fn shared(&self) -> &Rc<Formula> {
        &self.subformula
    }
}

impl Display for Next {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "next({})", self.subformula)
    }
}

#[derive(Debug, Clone)]
struct TemporalOperator {
    subformula: Rc<Formula>,
    bound: Option<Duration>,
}

impl TemporalOperator {
    fn new<F>(subformula: F, bound: Option<Duration>) -> Self
    where
        F: Into<Formula>,
    {
        Self {
            subformula: Rc::new(subformula.into()),
            bound,
        }
    }

    fn within(self, name: &'static str, bound: Duration) -> Result<Self, BoundError> {
        match self.bound {
            Some(_) => Err(BoundError::AlreadySet(name)),
            None => Ok(Self {
                bound: Some(bound),
                ..self
            }),
        }
    }

    fn fmt_named(&self, name: &str, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", name, self.subformula)?;

        if let Some(bound) = self.bound {
            write!(f, ".within({}, \"milliseconds\")", bound.as_millis())?;
        }

        Ok(())
    }
}

/// Temporal operator that requires its subformula to hold at every state.
///
/// The subformula is evaluated at every state inside the window of the operator, and a single
/// violation violates the whole operator. An unbounded operator can therefore never be satisfied
/// by a finite trace, only violated. A bounded operator is satisfied once a state at the end of
/// its window has been observed without a violation, or once a state past its window arrives.
///
/// | time | subformula | always   |
/// | ---- | ---------- | -------- |
/// |    0 | true       | residual |
/// |    1 | true       | residual |
/// |    2 | false      | false    |
///
/// Always formulas can be created either with or without bounds:
///
/// ```rust
/// use std::time::Duration;
/// use ltl_monitor::{pure, TimeUnit};
/// use ltl_monitor::operators::Always;
///
/// let unbounded = Always::unbounded(pure(true, "x <= 5"));
/// let bounded = Always::bounded(Duration::from_secs(5), pure(true, "x <= 5"));
/// let within = Always::unbounded(pure(true, "x <= 5")).within(5, TimeUnit::Seconds).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Always(TemporalOperator);

impl Always {
    pub fn unbounded<F>(subformula: F) -> Self
    where
        F: Into<Formula>,
    {
        Self(TemporalOperator::new(subformula, None))
    }

    pub fn bounded<F>(bound: Duration, subformula: F) -> Self
    where
        F: Into<Formula>,
    {
        Self(TemporalOperator::new(subformula, Some(bound)))
    }

    /// Limit the operator to the states within `n` units of the time it is first evaluated.
    ///
    /// The bound can only be set once.
    pub fn within(self, n: u64, unit: TimeUnit) -> Result<Self, BoundError> {
        self.0.within("always", unit.normalize(n)).map(Self)
    }

    pub fn subformula(&self) -> &Formula {
        &self.0.subformula
    }

    pub fn bound(&self) -> Option<Duration> {
        self.0.bound
    }

    pub(crate) fn shared(&self) -> &Rc<Formula> {
        &self.0.subformula
    }
}

impl Display for Always {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt_named("always", f)
    }
}

/// Temporal operator that requires its subformula to hold at some state.
///
/// The dual of [`Always`]. A single state where the subformula holds satisfies the operator, so
/// an unbounded operator can only be satisfied by a finite trace. A bounded operator is violated
/// once a state at the end of its window has been observed without the subformula holding, or
/// once a state past its window arrives.
///
/// | time | subformula | eventually |
/// | ---- | ---------- | ---------- |
/// |    0 | false      | residual   |
/// |    1 | false      | residual   |
/// |    2 | true       | true       |
///
/// ```rust
/// use ltl_monitor::{pure, TimeUnit};
/// use ltl_monitor::operators::Eventually;
///
/// let unbounded = Eventually::unbounded(pure(true, "done"));
/// let within = Eventually::unbounded(pure(true, "done"))
///     .within(250, TimeUnit::Milliseconds)
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Eventually(TemporalOperator);

impl Eventually {
    pub fn unbounded<F>(subformula: F) -> Self
    where
        F: Into<Formula>,
    {
        Self(TemporalOperator::new(subformula, None))
    }

    pub fn bounded<F>(bound: Duration, subformula: F) -> Self
    where
        F: Into<Formula>,
    {
        Self(TemporalOperator::new(subformula, Some(bound)))
    }

    /// Limit the operator to the states within `n` units of the time it is first evaluated.
    ///
    /// The bound can only be set once.
    pub fn within(self, n: u64, unit: TimeUnit) -> Result<Self, BoundError> {
        self.0.within("eventually", unit.normalize(n)).map(Self)
    }

    pub fn subformula(&self) -> &Formula {
        &self.0.subformula
    }

    pub fn bound(&self) -> Option<Duration> {
        self.0.bound
    }

    pub(crate) fn shared(&self) -> &Rc<Formula> {
        &self.0.subformula
    }
}

impl Display for Eventually {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt_named("eventually", f)
    }
}

/// Where a time falls relative to a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    Inside,
    Closing,
    Past,
}

/// The interval of elapsed time covered by a temporal operator, fixed when the operator is first
/// evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    start: Time,
    end: Option<Duration>,
}

impl Window {
    pub(crate) fn open(start: Time, bound: Option<Duration>) -> Self {
        Self {
            start,
            end: bound.map(|bound| start.elapsed().saturating_add(bound)),
        }
    }

    /// Determine if this window covers every time `other` covers from now on.
    pub(crate) fn outlasts(&self, other: &Window) -> bool {
        match (self.end, other.end) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(end), Some(other)) => end >= other,
        }
    }

    pub(crate) fn position(&self, time: Time) -> Position {
        match self.end {
            Some(end) if time.elapsed() > end => Position::Past,
            Some(end) if time.elapsed() == end => Position::Closing,
            _ => Position::Inside,
        }
    }

    pub(crate) fn always_violation(&self, subformula: &Formula, violation: Violation) -> Violation {
        Violation::Always {
            subformula: subformula.to_string(),
            start: self.start,
            end: self.end,
            violation: Box::new(violation),
        }
    }

    pub(crate) fn eventually_violation(
        &self,
        subformula: &Formula,
        reason: EventuallyViolation,
    ) -> Violation {
        Violation::Eventually {
            subformula: subformula.to_string(),
            start: self.start,
            end: self.end,
            reason,
        }
    }
}

impl Display for Window {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.end {
            Some(end) => {
                let start = self.start.elapsed().as_millis();
                write!(f, "[{}ms, {}ms]", start, end.as_millis())
            }
            None => write!(f, "[{}ms, ..)", self.start.elapsed().as_millis()),
        }
    }
}

pub(crate) fn always(
    subformula: &Rc<Formula>,
    window: Window,
    time: Time,
) -> Result<Verdict, EvaluationError> {
    let position = window.position(time);

    if position == Position::Past {
        return Ok(Verdict::True);
    }

    let continuation = || {
        Node::Derived(Derived::Always {
            window,
            subformula: Rc::clone(subformula),
        })
    };

    let verdict = match evaluate(subformula, time)? {
        Verdict::False(violation) => Verdict::False(window.always_violation(subformula, violation)),
        Verdict::True if position == Position::Closing => Verdict::True,
        Verdict::True => Verdict::Residual(Residual(continuation())),
        Verdict::Residual(Residual(pending)) => {
            let continuation = match position {
                Position::Closing => Node::True,
                _ => continuation(),
            };

            Verdict::Residual(Residual(Node::AndAlways {
                subformula: Rc::clone(subformula),
                window,
                pending: vec![pending],
                continuation: Box::new(continuation),
            }))
        }
    };

    Ok(verdict)
}

/// Combine the still pending evaluations of an `always` subformula with the stepped continuation
/// of the operator.
///
/// The continuation reports its own violations. Evaluations it starts are merged into `pending`
/// rather than nested, and an evaluation entailed by one already pending is dropped, so the
/// residual of an unbounded operator does not grow with the length of the trace.
pub(crate) fn always_pending(
    subformula: &Rc<Formula>,
    window: Window,
    mut pending: Vec<Node>,
    continuation: Verdict,
) -> Verdict {
    let continuation = match continuation {
        Verdict::False(violation) => return Verdict::False(violation),
        Verdict::True => Node::True,
        Verdict::Residual(Residual(Node::AndAlways {
            subformula: started,
            window: opened,
            pending: fresh,
            continuation,
        })) if Rc::ptr_eq(&started, subformula) && opened == window => {
            for node in fresh {
                absorb_conjunct(&mut pending, node);
            }

            *continuation
        }
        Verdict::Residual(Residual(node)) => node,
    };

    match (pending.is_empty(), continuation) {
        (true, Node::True) => Verdict::True,
        (true, continuation) => Verdict::Residual(Residual(continuation)),
        (false, continuation) => Verdict::Residual(Residual(Node::AndAlways {
            subformula: Rc::clone(subformula),
            window,
            pending,
            continuation: Box::new(continuation),
        })),
    }
}

/// Add `node` to a conjunction of pending evaluations.
///
/// `node` is dropped if a pending evaluation entails it, and replaces the pending evaluations it
/// entails otherwise.
pub(crate) fn absorb_conjunct(pending: &mut Vec<Node>, node: Node) {
    if pending.iter().any(|kept| kept.entails(&node)) {
        return;
    }

    pending.retain(|kept| !node.entails(kept));
    pending.push(node);
}

pub(crate) fn eventually(
    subformula: &Rc<Formula>,
    window: Window,
    time: Time,
) -> Result<Verdict, EvaluationError> {
    let position = window.position(time);
    let timed_out = || window.eventually_violation(subformula, EventuallyViolation::TimedOut(time));

    if position == Position::Past {
        return Ok(Verdict::False(timed_out()));
    }

    let continuation = || {
        Node::Derived(Derived::Eventually {
            window,
            subformula: Rc::clone(subformula),
        })
    };

    let verdict = match evaluate(subformula, time)? {
        Verdict::True => Verdict::True,
        Verdict::False(_) if position == Position::Closing => Verdict::False(timed_out()),
        Verdict::False(_) => Verdict::Residual(Residual(continuation())),
        Verdict::Residual(Residual(pending)) => {
            let continuation = match position {
                Position::Closing => Node::False(timed_out()),
                _ => continuation(),
            };

            Verdict::Residual(Residual(Node::OrEventually {
                subformula: Rc::clone(subformula),
                window,
                pending: vec![pending],
                continuation: Box::new(continuation),
            }))
        }
    };

    Ok(verdict)
}

/// Combine the still pending evaluations of an `eventually` subformula with the stepped
/// continuation of the operator.
///
/// The dual of [`always_pending`]. An evaluation that entails one already pending is dropped.
/// When every pending evaluation has failed the continuation is reported, since it carries the
/// reason the operator gave up.
pub(crate) fn eventually_pending(
    subformula: &Rc<Formula>,
    window: Window,
    mut pending: Vec<Node>,
    continuation: Verdict,
) -> Verdict {
    let continuation = match continuation {
        Verdict::True => return Verdict::True,
        Verdict::False(violation) if pending.is_empty() => return Verdict::False(violation),
        Verdict::False(violation) => Node::False(violation),
        Verdict::Residual(Residual(Node::OrEventually {
            subformula: started,
            window: opened,
            pending: fresh,
            continuation,
        })) if Rc::ptr_eq(&started, subformula) && opened == window => {
            for node in fresh {
                absorb_disjunct(&mut pending, node);
            }

            *continuation
        }
        Verdict::Residual(Residual(node)) => node,
    };

    if pending.is_empty() {
        return Verdict::Residual(Residual(continuation));
    }

    Verdict::Residual(Residual(Node::OrEventually {
        subformula: Rc::clone(subformula),
        window,
        pending,
        continuation: Box::new(continuation),
    }))
}

/// Add `node` to a disjunction of pending evaluations.
///
/// The dual of [`absorb_conjunct`]: `node` is dropped if it entails a pending evaluation, and
/// replaces the pending evaluations that entail it otherwise.
pub(crate) fn absorb_disjunct(pending: &mut Vec<Node>, node: Node) {
    if pending.iter().any(|kept| node.entails(kept)) {
        return;
    }

    pending.retain(|kept| !kept.entails(&node));
    pending.push(node);
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::rc::Rc;
    use std::time::Duration;

    use super::{always, eventually, Always, BoundError, Eventually, Position, Window};
    use crate::evaluate::{Node, Residual, Verdict};
    use crate::formula::{pure, Formula};
    use crate::time::{Time, TimeUnit};
    use crate::violation::{EventuallyViolation, Violation};

    fn at(tick: u64, millis: u64) -> Time {
        Time::new(tick, Duration::from_millis(millis))
    }

    #[test]
    fn within_sets_bound_once() {
        let formula = Always::unbounded(pure(true, "p")).within(5, TimeUnit::Seconds);
        let formula = formula.map(|always| always.bound());

        assert_eq!(formula, Ok(Some(Duration::from_secs(5))));

        let twice = Eventually::unbounded(pure(true, "p"))
            .within(1, TimeUnit::Seconds)
            .and_then(|eventually| eventually.within(2, TimeUnit::Seconds));

        assert_eq!(twice.map(|e| e.bound()), Err(BoundError::AlreadySet("eventually")));
    }

    #[test]
    fn display() -> Result<(), BoundError> {
        let formula = Always::unbounded(pure(true, "p")).within(5, TimeUnit::Seconds)?;
        assert_eq!(formula.to_string(), "always(p).within(5000, \"milliseconds\")");

        let formula = Eventually::unbounded(pure(true, "q"));
        assert_eq!(formula.to_string(), "eventually(q)");

        Ok(())
    }

    #[test]
    fn window_positions() {
        let window = Window::open(at(2, 2000), Some(Duration::from_secs(5)));

        assert_eq!(window.position(at(3, 3000)), Position::Inside);
        assert_eq!(window.position(at(4, 7000)), Position::Closing);
        assert_eq!(window.position(at(5, 7001)), Position::Past);

        let unbounded = Window::open(at(0, 0), None);
        assert_eq!(unbounded.position(at(9, u64::MAX)), Position::Inside);
    }

    #[test]
    fn always_past_window_holds() -> Result<(), Box<dyn Error>> {
        let subformula = Rc::new(pure(false, "never checked"));
        let window = Window::open(at(0, 0), Some(Duration::from_millis(5)));

        assert!(matches!(always(&subformula, window, at(1, 6))?, Verdict::True));

        Ok(())
    }

    #[test]
    fn always_closing_window() -> Result<(), Box<dyn Error>> {
        let holds = Rc::new(pure(true, "p"));
        let window = Window::open(at(0, 0), Some(Duration::from_millis(5)));

        assert!(matches!(always(&holds, window, at(1, 3))?, Verdict::Residual(_)));
        assert!(matches!(always(&holds, window, at(2, 5))?, Verdict::True));

        let fails = Rc::new(pure(false, "p"));

        match always(&fails, window, at(2, 5))? {
            Verdict::False(Violation::Always { start, end, .. }) => {
                assert_eq!(start, at(0, 0));
                assert_eq!(end, Some(Duration::from_millis(5)));
            }
            other => panic!("unexpected verdict {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn always_pending_subformula() -> Result<(), Box<dyn Error>> {
        let subformula = Rc::new(Formula::Next(super::Next::new(pure(true, "p"))));
        let window = Window::open(at(0, 0), None);

        assert!(matches!(
            always(&subformula, window, at(0, 0))?,
            Verdict::Residual(Residual(Node::AndAlways { .. }))
        ));

        Ok(())
    }

    #[test]
    fn eventually_times_out() -> Result<(), Box<dyn Error>> {
        let subformula = Rc::new(pure(false, "done"));
        let window = Window::open(at(0, 0), Some(Duration::from_millis(5)));

        assert!(matches!(eventually(&subformula, window, at(1, 4))?, Verdict::Residual(_)));

        match eventually(&subformula, window, at(2, 5))? {
            Verdict::False(Violation::Eventually { reason, .. }) => {
                assert_eq!(reason, EventuallyViolation::TimedOut(at(2, 5)));
            }
            other => panic!("unexpected verdict {:?}", other),
        }

        let satisfied = Rc::new(pure(true, "done"));

        match eventually(&satisfied, window, at(3, 9))? {
            Verdict::False(violation) => assert_eq!(violation.time(), Some(at(3, 9))),
            other => panic!("unexpected verdict {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn unbounded_eventually_never_fails() -> Result<(), Box<dyn Error>> {
        let subformula = Rc::new(pure(false, "done"));
        let window = Window::open(at(0, 0), None);

        for tick in 0..10 {
            let verdict = eventually(&subformula, window, at(tick, tick * 1000))?;
            assert!(matches!(verdict, Verdict::Residual(_)));
        }

        Ok(())
    }
}
