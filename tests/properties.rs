//! Property tests for the evaluator.
//!
//! Formulas are generated over two boolean variables and checked against random traces. Two
//! formulas are compared by stepping both in lockstep and requiring that they settle at the same
//! time with the same truth value, or remain undecided while leaning the same way.

use std::error::Error;

use ltl_monitor::{
    always, eventually, evaluate, next, not, pure, step, stop_default, Cell, Formula, Registry,
    StopDefault, Time, Verdict, ViolationKind,
};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

type State = (bool, bool);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Variable {
    X,
    Y,
}

#[derive(Debug, Clone)]
enum Syntax {
    Pure(bool),
    Variable(Variable),
    Not(Box<Syntax>),
    And(Box<Syntax>, Box<Syntax>),
    Or(Box<Syntax>, Box<Syntax>),
    Implies(Box<Syntax>, Box<Syntax>),
    Next(Box<Syntax>),
    Always(Box<Syntax>),
    Eventually(Box<Syntax>),
}

fn arb_variable() -> impl Strategy<Value = Variable> {
    prop_oneof![Just(Variable::X), Just(Variable::Y)]
}

fn arb_syntax() -> impl Strategy<Value = Syntax> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Syntax::Pure),
        arb_variable().prop_map(Syntax::Variable),
    ];

    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|sub| Syntax::Not(Box::new(sub))),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Syntax::And(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Syntax::Or(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Syntax::Implies(Box::new(l), Box::new(r))),
            inner.clone().prop_map(|sub| Syntax::Next(Box::new(sub))),
            inner.clone().prop_map(|sub| Syntax::Always(Box::new(sub))),
            inner.prop_map(|sub| Syntax::Eventually(Box::new(sub))),
        ]
    })
}

fn arb_trace() -> impl Strategy<Value = Vec<State>> {
    prop::collection::vec(any::<State>(), 1..10)
}

// ============================================================================
// Helpers
// ============================================================================

struct Variables {
    x: Cell<State, bool>,
    y: Cell<State, bool>,
}

impl Variables {
    fn new(registry: &Registry<State>) -> Self {
        Self {
            x: registry.extract(|state: &State| state.0),
            y: registry.extract(|state: &State| state.1),
        }
    }

    fn build(&self, syntax: &Syntax) -> Formula {
        match syntax {
            Syntax::Pure(value) => pure(*value, value.to_string()),
            Syntax::Variable(Variable::X) => {
                let x = self.x.clone();
                Formula::predicate("x", move || Ok(x.current()?))
            }
            Syntax::Variable(Variable::Y) => {
                let y = self.y.clone();
                Formula::predicate("y", move || Ok(y.current()?))
            }
            Syntax::Not(sub) => not(self.build(sub)),
            Syntax::And(left, right) => self.build(left).and(self.build(right)),
            Syntax::Or(left, right) => self.build(left).or(self.build(right)),
            Syntax::Implies(left, right) => self.build(left).implies(self.build(right)),
            Syntax::Next(sub) => next(self.build(sub)),
            Syntax::Always(sub) => always(self.build(sub)).into(),
            Syntax::Eventually(sub) => eventually(self.build(sub)).into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    True,
    False,
    LeansTrue,
    LeansFalse,
}

fn outcome(verdict: &Verdict, time: Time) -> Outcome {
    match verdict {
        Verdict::True => Outcome::True,
        Verdict::False(_) => Outcome::False,
        Verdict::Residual(residual) => match stop_default(residual, time) {
            StopDefault::True => Outcome::LeansTrue,
            StopDefault::False(_) => Outcome::LeansFalse,
        },
    }
}

/// Step both formulas over the trace until either settles, returning the outcome of each at
/// every time.
fn lockstep(
    registry: &Registry<State>,
    left: &Formula,
    right: &Formula,
    trace: &[State],
) -> Result<Vec<(Outcome, Outcome)>, Box<dyn Error>> {
    registry.reset();

    let mut outcomes = Vec::new();
    let mut states = trace.iter().copied();
    let first = states.next().ok_or("empty trace")?;
    let time = registry.register(first);

    let mut left_verdict = evaluate(left, time)?;
    let mut right_verdict = evaluate(right, time)?;
    outcomes.push((outcome(&left_verdict, time), outcome(&right_verdict, time)));

    for state in states {
        let (left_residual, right_residual) = match (&left_verdict, &right_verdict) {
            (Verdict::Residual(l), Verdict::Residual(r)) => (l.clone(), r.clone()),
            _ => break,
        };

        let time = registry.register(state);

        left_verdict = step(&left_residual, time)?;
        right_verdict = step(&right_residual, time)?;
        outcomes.push((outcome(&left_verdict, time), outcome(&right_verdict, time)));
    }

    Ok(outcomes)
}

fn failure<E: std::fmt::Display>(err: E) -> TestCaseError {
    TestCaseError::fail(err.to_string())
}

fn assert_equivalent(left: &Syntax, right: &Syntax, trace: &[State]) -> Result<(), TestCaseError> {
    let registry = Registry::new();
    let variables = Variables::new(&registry);
    let left = variables.build(left);
    let right = variables.build(right);

    let outcomes = lockstep(&registry, &left, &right, trace).map_err(failure)?;

    for (tick, (l, r)) in outcomes.into_iter().enumerate() {
        prop_assert_eq!(l, r, "{} and {} differ at tick {}", left, right, tick);
    }

    Ok(())
}

// ============================================================================
// Boolean Operators
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// pure(a).and(pure(b)) holds iff both hold, and a violation is tagged `and`.
    #[test]
    fn and_truth_table(a in any::<bool>(), b in any::<bool>()) {
        let time = Time::new(0, std::time::Duration::ZERO);
        let verdict = evaluate(&pure(a, "a").and(pure(b, "b")), time).map_err(failure)?;

        match verdict {
            Verdict::True => prop_assert!(a && b),
            Verdict::False(violation) => {
                prop_assert!(!(a && b));
                prop_assert_eq!(violation.kind(), ViolationKind::And);
            }
            Verdict::Residual(_) => prop_assert!(false, "pure formulas are always decided"),
        }
    }

    /// pure(a).or(pure(b)) holds iff either holds, and a violation is tagged `or`.
    #[test]
    fn or_truth_table(a in any::<bool>(), b in any::<bool>()) {
        let time = Time::new(0, std::time::Duration::ZERO);
        let verdict = evaluate(&pure(a, "a").or(pure(b, "b")), time).map_err(failure)?;

        match verdict {
            Verdict::True => prop_assert!(a || b),
            Verdict::False(violation) => {
                prop_assert!(!(a || b));
                prop_assert_eq!(violation.kind(), ViolationKind::Or);
            }
            Verdict::Residual(_) => prop_assert!(false, "pure formulas are always decided"),
        }
    }
}

// ============================================================================
// Negation
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// not(f) settles at the same time as f with the opposite truth value.
    #[test]
    fn not_inverts_verdicts(syntax in arb_syntax(), trace in arb_trace()) {
        let registry = Registry::new();
        let variables = Variables::new(&registry);
        let formula = variables.build(&syntax);
        let negated = not(formula.clone());

        let outcomes = lockstep(&registry, &formula, &negated, &trace).map_err(failure)?;

        for (l, r) in outcomes {
            match (l, r) {
                (Outcome::True, Outcome::False) | (Outcome::False, Outcome::True) => {}
                (
                    Outcome::LeansTrue | Outcome::LeansFalse,
                    Outcome::LeansTrue | Outcome::LeansFalse,
                ) => {}
                other => prop_assert!(false, "{} and its negation disagree: {:?}", formula, other),
            }
        }
    }
}

// ============================================================================
// Temporal Equivalences
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// X(!p) == !X(p)
    #[test]
    fn next_self_duality(syntax in arb_syntax(), trace in arb_trace()) {
        let left = Syntax::Next(Box::new(Syntax::Not(Box::new(syntax.clone()))));
        let right = Syntax::Not(Box::new(Syntax::Next(Box::new(syntax))));
        assert_equivalent(&left, &right, &trace)?;
    }

    /// G(!p) == !F(p)
    #[test]
    fn always_eventually_duality(syntax in arb_syntax(), trace in arb_trace()) {
        let left = Syntax::Always(Box::new(Syntax::Not(Box::new(syntax.clone()))));
        let right = Syntax::Not(Box::new(Syntax::Eventually(Box::new(syntax))));
        assert_equivalent(&left, &right, &trace)?;
    }

    /// F(p) == F(F(p))
    #[test]
    fn eventually_idempotency(syntax in arb_syntax(), trace in arb_trace()) {
        let left = Syntax::Eventually(Box::new(syntax.clone()));
        let right = Syntax::Eventually(Box::new(Syntax::Eventually(Box::new(syntax))));
        assert_equivalent(&left, &right, &trace)?;
    }

    /// G(p) == G(G(p))
    #[test]
    fn always_idempotency(syntax in arb_syntax(), trace in arb_trace()) {
        let left = Syntax::Always(Box::new(syntax.clone()));
        let right = Syntax::Always(Box::new(Syntax::Always(Box::new(syntax))));
        assert_equivalent(&left, &right, &trace)?;
    }
}
