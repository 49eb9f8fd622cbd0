use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::evaluate::{Node, Residual, Verdict};
use crate::formula::Formula;
use crate::time::Time;
use crate::violation::{Side, Violation};

/// First-order operator that inverts its subformula, written `!`, or `not`.
///
/// A satisfied subformula becomes a violation that names the subformula and the time it held, a
/// violated subformula becomes satisfied, and an undecided subformula stays undecided with the
/// negation carried into the remaining obligation.
///
/// | subformula | not      |
/// | ---------- | -------- |
/// | true       | false    |
/// | false      | true     |
/// | residual   | residual |
///
/// ```rust
/// use ltl_monitor::pure;
/// use ltl_monitor::operators::Not;
///
/// let formula = Not::new(pure(false, "door open"));
/// ```
#[derive(Debug, Clone)]
pub struct Not {
    subformula: Rc<Formula>,
}

impl Not {
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

impl Display for Not {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "!({})", self.subformula)
    }
}

pub(crate) fn negation(subformula: &Rc<Formula>, verdict: Verdict, time: Time) -> Verdict {
    match verdict {
        Verdict::True => Verdict::False(Violation::Not {
            description: subformula.to_string(),
            time,
        }),
        Verdict::False(_) => Verdict::True,
        Verdict::Residual(Residual(inner)) => Verdict::Residual(Residual(Node::Not {
            subformula: Rc::clone(subformula),
            inner: Box::new(inner),
        })),
    }
}

#[derive(Debug, Clone)]
struct Binop {
    left: Rc<Formula>,
    right: Rc<Formula>,
}

impl Binop {
    fn new<L, R>(left: L, right: R) -> Self
    where
        L: Into<Formula>,
        R: Into<Formula>,
    {
        Self {
            left: Rc::new(left.into()),
            right: Rc::new(right.into()),
        }
    }
}

/// First-order operator that requires both of its subformulas to hold, written `&&` or `and`.
///
/// Both subformulas are evaluated against the same state. The first violated operand (checking
/// the left operand first) violates the conjunction, a satisfied operand drops out of the
/// remaining obligation, and two undecided operands remain as a conjunction.
///
/// | left     | right    | and                  |
/// | -------- | -------- | -------------------- |
/// | true     | true     | true                 |
/// | false    | any      | false (left)         |
/// | any      | false    | false (right)        |
/// | true     | residual | right residual       |
/// | residual | residual | residual conjunction |
///
/// ```rust
/// use ltl_monitor::pure;
/// use ltl_monitor::operators::And;
///
/// let formula = And::new(pure(true, "engine on"), pure(true, "doors closed"));
/// ```
#[derive(Debug, Clone)]
pub struct And(Binop);

impl And {
    pub fn new<L, R>(left: L, right: R) -> Self
    where
        L: Into<Formula>,
        R: Into<Formula>,
    {
        Self(Binop::new(left, right))
    }

    pub fn left(&self) -> &Formula {
        &self.0.left
    }

    pub fn right(&self) -> &Formula {
        &self.0.right
    }
}

impl Display for And {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}) && ({})", self.0.left, self.0.right)
    }
}

pub(crate) fn conjunction(left: Verdict, right: Verdict) -> Verdict {
    match (left, right) {
        (Verdict::False(violation), _) => Verdict::False(Violation::And {
            side: Side::Left,
            violation: Box::new(violation),
        }),
        (_, Verdict::False(violation)) => Verdict::False(Violation::And {
            side: Side::Right,
            violation: Box::new(violation),
        }),
        (Verdict::True, right) => right,
        (left, Verdict::True) => left,
        (Verdict::Residual(Residual(left)), Verdict::Residual(Residual(right))) => {
            Verdict::Residual(Residual(Node::And(Box::new(left), Box::new(right))))
        }
    }
}

/// First-order operator that requires either of its subformulas to hold, written `||` or `or`.
///
/// The dual of [`And`]: any satisfied operand satisfies the disjunction, a violated operand drops
/// out of the remaining obligation, and the disjunction is only violated when both operands are.
///
/// | left     | right    | or                   |
/// | -------- | -------- | -------------------- |
/// | true     | any      | true                 |
/// | any      | true     | true                 |
/// | false    | false    | false (both)         |
/// | false    | residual | right residual       |
/// | residual | residual | residual disjunction |
///
/// ```rust
/// use ltl_monitor::pure;
/// use ltl_monitor::operators::Or;
///
/// let formula = Or::new(pure(false, "cached"), pure(true, "fetched"));
/// ```
#[derive(Debug, Clone)]
pub struct Or(Binop);

impl Or {
    pub fn new<L, R>(left: L, right: R) -> Self
    where
        L: Into<Formula>,
        R: Into<Formula>,
    {
        Self(Binop::new(left, right))
    }

    pub fn left(&self) -> &Formula {
        &self.0.left
    }

    pub fn right(&self) -> &Formula {
        &self.0.right
    }
}

impl Display for Or {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}) || ({})", self.0.left, self.0.right)
    }
}

pub(crate) fn disjunction(left: Verdict, right: Verdict) -> Verdict {
    match (left, right) {
        (Verdict::True, _) | (_, Verdict::True) => Verdict::True,
        (Verdict::False(left), Verdict::False(right)) => Verdict::False(Violation::Or {
            left: Box::new(left),
            right: Box::new(right),
        }),
        (Verdict::False(_), right) => right,
        (left, Verdict::False(_)) => left,
        (Verdict::Residual(Residual(left)), Verdict::Residual(Residual(right))) => {
            Verdict::Residual(Residual(Node::Or(Box::new(left), Box::new(right))))
        }
    }
}

/// First-order operator that requires its right subformula to hold whenever its left subformula
/// holds, written `->` or `implies`.
///
/// Semantically this is `Or(Not(left), right)`. The operator is kept as its own node so that a
/// violation names the antecedent that held, and so that an undecided implication remains an
/// implication in the remaining obligation.
///
/// ```rust
/// use ltl_monitor::pure;
/// use ltl_monitor::operators::Implies;
///
/// let formula = Implies::new(pure(true, "gear = 3"), pure(false, "gear = 4"));
/// ```
#[derive(Debug, Clone)]
pub struct Implies(Binop);

impl Implies {
    pub fn new<L, R>(left: L, right: R) -> Self
    where
        L: Into<Formula>,
        R: Into<Formula>,
    {
        Self(Binop::new(left, right))
    }

    pub fn left(&self) -> &Formula {
        &self.0.left
    }

    pub fn right(&self) -> &Formula {
        &self.0.right
    }

    pub(crate) fn antecedent(&self) -> &Rc<Formula> {
        &self.0.left
    }
}

impl Display for Implies {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}).implies({})", self.0.left, self.0.right)
    }
}

pub(crate) fn implication(antecedent: &Rc<Formula>, left: Verdict, right: Verdict) -> Verdict {
    let pending = |left: Node, right: Node| {
        Verdict::Residual(Residual(Node::Implies {
            antecedent: Rc::clone(antecedent),
            left: Box::new(left),
            right: Box::new(right),
        }))
    };

    match (left, right) {
        (Verdict::False(_), _) | (_, Verdict::True) => Verdict::True,
        (Verdict::True, Verdict::False(violation)) => Verdict::False(Violation::Implies {
            antecedent: antecedent.to_string(),
            violation: Box::new(violation),
        }),
        (Verdict::True, Verdict::Residual(Residual(right))) => pending(Node::True, right),
        (Verdict::Residual(Residual(left)), Verdict::False(violation)) => {
            pending(left, Node::False(violation))
        }
        (Verdict::Residual(Residual(left)), Verdict::Residual(Residual(right))) => {
            pending(left, right)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;
    use std::time::Duration;

    use super::{conjunction, disjunction, implication, negation};
    use crate::evaluate::{Derived, Node, Residual, Verdict};
    use crate::formula::{pure, Formula};
    use crate::time::Time;
    use crate::violation::{Side, Violation, ViolationKind};

    fn time() -> Time {
        Time::new(0, Duration::ZERO)
    }

    fn violated(description: &str) -> Verdict {
        Verdict::False(Violation::False {
            description: description.to_string(),
            time: time(),
        })
    }

    fn pending() -> Verdict {
        let subformula = Rc::new(pure(true, "later"));
        let derived = Derived::Next { subformula };

        Verdict::Residual(Residual(Node::Derived(derived)))
    }

    #[test]
    fn conjunction_blames_left_first() {
        let verdict = conjunction(violated("a"), violated("b"));

        match verdict {
            Verdict::False(Violation::And { side, violation }) => {
                assert_eq!(side, Side::Left);
                assert_eq!(violation.description(), "a");
            }
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn conjunction_drops_satisfied_operand() {
        let derived =
            |verdict: Verdict| matches!(verdict, Verdict::Residual(Residual(Node::Derived(_))));

        assert!(derived(conjunction(Verdict::True, pending())));
        assert!(derived(conjunction(pending(), Verdict::True)));
        assert!(matches!(
            conjunction(pending(), pending()),
            Verdict::Residual(Residual(Node::And(..)))
        ));
        assert!(matches!(conjunction(pending(), violated("b")), Verdict::False(_)));
    }

    #[test]
    fn disjunction_rules() {
        assert!(matches!(disjunction(pending(), Verdict::True), Verdict::True));
        assert!(matches!(
            disjunction(violated("a"), pending()),
            Verdict::Residual(Residual(Node::Derived(_)))
        ));
        assert!(matches!(
            disjunction(pending(), pending()),
            Verdict::Residual(Residual(Node::Or(..)))
        ));

        match disjunction(violated("a"), violated("b")) {
            Verdict::False(violation) => assert_eq!(violation.kind(), ViolationKind::Or),
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn negation_names_subformula() {
        let subformula = Rc::new(Formula::literal(true, "door open"));

        match negation(&subformula, Verdict::True, time()) {
            Verdict::False(Violation::Not { description, .. }) => {
                assert_eq!(description, "door open")
            }
            other => panic!("unexpected verdict {:?}", other),
        }

        assert!(matches!(negation(&subformula, violated("x"), time()), Verdict::True));
        assert!(matches!(
            negation(&subformula, pending(), time()),
            Verdict::Residual(Residual(Node::Not { .. }))
        ));
    }

    #[test]
    fn implication_rules() {
        let antecedent = Rc::new(pure(true, "gear = 3"));

        assert!(matches!(implication(&antecedent, violated("a"), violated("b")), Verdict::True));
        assert!(matches!(implication(&antecedent, pending(), Verdict::True), Verdict::True));
        assert!(matches!(
            implication(&antecedent, Verdict::True, pending()),
            Verdict::Residual(Residual(Node::Implies { .. }))
        ));

        match implication(&antecedent, Verdict::True, violated("gear = 4")) {
            Verdict::False(Violation::Implies { antecedent, violation }) => {
                assert_eq!(antecedent, "gear = 3");
                assert_eq!(violation.description(), "gear = 4");
            }
            other => panic!("unexpected verdict {:?}", other),
        }
    }
}
