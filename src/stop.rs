//! Verdicts for traces that end while a formula is still undecided.
//!
//! A finite trace can end before a residual has been settled. [`stop_default`] reports the
//! verdict such a residual leans toward if no further states arrive: obligations that only
//! future states could break (`always`, `next`) lean true, and obligations that only future
//! states could fulfil (`eventually`) lean false. Negated obligations lean like their duals, so
//! `!eventually(p)` leans the same way as `always(!p)`. The result is advisory,
//! [`run_check`](crate::run_check) still reports an undecided formula as inconclusive.

use crate::evaluate::{Derived, Node, Residual};
use crate::time::Time;
use crate::violation::{EventuallyViolation, Side, Violation};

/// Verdict a residual leans toward when the trace ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopDefault {
    True,
    False(Violation),
}

impl StopDefault {
    pub fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }
}

/// Decide the verdict `residual` leans toward if the trace ends at `time`.
///
/// ```rust
/// use std::time::Duration;
/// use ltl_monitor::{eventually, evaluate, pure, stop_default, Formula, StopDefault, Time};
///
/// let time = Time::new(0, Duration::ZERO);
/// let formula = Formula::from(eventually(pure(false, "done")));
/// let verdict = evaluate(&formula, time).unwrap();
/// let residual = verdict.residual().unwrap();
///
/// assert!(matches!(stop_default(residual, time), StopDefault::False(_)));
/// ```
pub fn stop_default(residual: &Residual, time: Time) -> StopDefault {
    lean(&residual.0, time)
}

fn lean(node: &Node, time: Time) -> StopDefault {
    match node {
        Node::True => StopDefault::True,
        Node::False(violation) => StopDefault::False(violation.clone()),
        Node::Derived(Derived::Next { .. } | Derived::Always { .. }) => StopDefault::True,
        Node::Derived(Derived::Eventually { window, subformula }) => {
            let violation = window.eventually_violation(subformula, EventuallyViolation::TestEnded);
            StopDefault::False(violation)
        }
        Node::And(left, right) => match (lean(left, time), lean(right, time)) {
            (StopDefault::False(violation), _) => StopDefault::False(Violation::And {
                side: Side::Left,
                violation: Box::new(violation),
            }),
            (_, StopDefault::False(violation)) => StopDefault::False(Violation::And {
                side: Side::Right,
                violation: Box::new(violation),
            }),
            (StopDefault::True, StopDefault::True) => StopDefault::True,
        },
        Node::Or(left, right) => match (lean(left, time), lean(right, time)) {
            (StopDefault::False(left), StopDefault::False(right)) => {
                StopDefault::False(Violation::Or {
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            _ => StopDefault::True,
        },
        Node::Implies {
            antecedent,
            left,
            right,
        } => match lean(right, time) {
            StopDefault::False(violation) if !holds(left, true) => {
                StopDefault::False(Violation::Implies {
                    antecedent: antecedent.to_string(),
                    violation: Box::new(violation),
                })
            }
            _ => StopDefault::True,
        },
        Node::Not { subformula, inner } => {
            if holds(inner, true) {
                StopDefault::True
            } else {
                StopDefault::False(Violation::Not {
                    description: subformula.to_string(),
                    time,
                })
            }
        }
        Node::AndAlways {
            subformula,
            window,
            pending,
            continuation,
        } => {
            for node in pending {
                if let StopDefault::False(violation) = lean(node, time) {
                    return StopDefault::False(window.always_violation(subformula, violation));
                }
            }

            lean(continuation, time)
        }
        Node::OrEventually {
            pending, continuation, ..
        } => {
            if pending.iter().any(|node| lean(node, time).is_true()) {
                StopDefault::True
            } else {
                lean(continuation, time)
            }
        }
    }
}

/// Truth value `node` leans toward, with the node negated when `negated` is set.
///
/// Negation is pushed down to the temporal operators instead of flipping their defaults, so a
/// negated `always` leans like an `eventually` and the other way around. `next` leans true under
/// either polarity.
fn holds(node: &Node, negated: bool) -> bool {
    match node {
        Node::True => !negated,
        Node::False(_) => negated,
        Node::Derived(Derived::Next { .. }) => true,
        Node::Derived(Derived::Always { .. }) => !negated,
        Node::Derived(Derived::Eventually { .. }) => negated,
        Node::And(left, right) => {
            if negated {
                holds(left, true) || holds(right, true)
            } else {
                holds(left, false) && holds(right, false)
            }
        }
        Node::Or(left, right) => {
            if negated {
                holds(left, true) && holds(right, true)
            } else {
                holds(left, false) || holds(right, false)
            }
        }
        Node::AndAlways {
            pending, continuation, ..
        } => {
            let mut conjuncts = pending.iter().chain(Some(&**continuation));

            if negated {
                conjuncts.any(|node| holds(node, true))
            } else {
                conjuncts.all(|node| holds(node, false))
            }
        }
        Node::OrEventually {
            pending, continuation, ..
        } => {
            let mut disjuncts = pending.iter().chain(Some(&**continuation));

            if negated {
                disjuncts.all(|node| holds(node, true))
            } else {
                disjuncts.any(|node| holds(node, false))
            }
        }
        Node::Implies { left, right, .. } => {
            if negated {
                holds(left, false) && holds(right, true)
            } else {
                holds(left, true) || holds(right, false)
            }
        }
        Node::Not { inner, .. } => holds(inner, !negated),
    }
}
