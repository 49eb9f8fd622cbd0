//! Incremental evaluation of formulas.
//!
//! A formula is evaluated against the first state of a trace with [`evaluate`], and each
//! [`Residual`] it leaves behind is advanced against the following state with [`step`]. Both
//! entry points share a single set of rules, so stepping a residual behaves exactly as
//! evaluating the formula it stands for.
//!
//! ```text
//!  register(S1) -> evaluate(phi, T1) -> Residual r1
//!  register(S2) -> step(r1, T2)      -> Residual r2
//!  register(S3) -> step(r2, T3)      -> False(violation)
//! ```
//!
//! Evaluation never inspects states directly. It runs the predicates of the formula, which read
//! the current state of a [`Registry`](crate::Registry) through [`Cell`](crate::Cell)s, so the
//! state of interest must be registered before evaluating at its time.

use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::formula::Formula;
use crate::operators::{
    absorb_conjunct, absorb_disjunct, always, always_pending, conjunction, disjunction, eventually,
    eventually_pending, implication, negation, Window,
};
use crate::time::Time;
use crate::violation::Violation;
use crate::EvaluationError;

/// Outcome of evaluating a formula at a single time.
#[derive(Debug, Clone)]
pub enum Verdict {
    /// The formula holds regardless of any future state.
    True,

    /// The formula is violated regardless of any future state.
    False(Violation),

    /// The formula depends on future states.
    Residual(Residual),
}

impl Verdict {
    pub fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Self::False(_))
    }

    pub fn is_residual(&self) -> bool {
        matches!(self, Self::Residual(_))
    }

    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Self::False(violation) => Some(violation),
            _ => None,
        }
    }

    pub fn residual(&self) -> Option<&Residual> {
        match self {
            Self::Residual(residual) => Some(residual),
            _ => None,
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False(violation) => write!(f, "false: {}", violation),
            Self::Residual(residual) => write!(f, "pending: {}", residual),
        }
    }
}

/// Obligation left over from evaluating a formula that depends on future states.
///
/// Residuals can only be created by [`evaluate`] and [`step`], and always denote an undecided
/// formula.
#[derive(Debug, Clone)]
pub struct Residual(pub(crate) Node);

/// Operator at the root of a [`Residual`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidualKind {
    /// A temporal operator that has not evaluated its subformula at a pending state yet.
    Derived,
    And,
    Or,
    Implies,
    Not,
    /// An `always` operator with a pending evaluation of its subformula.
    Always,
    /// An `eventually` operator with a pending evaluation of its subformula.
    Eventually,
}

impl ResidualKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Derived => "derived",
            Self::And => "and",
            Self::Or => "or",
            Self::Implies => "implies",
            Self::Not => "not",
            Self::Always => "always",
            Self::Eventually => "eventually",
        }
    }
}

impl Display for ResidualKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Residual {
    pub fn kind(&self) -> ResidualKind {
        match &self.0 {
            // Settled nodes only appear beneath a combinator.
            Node::True | Node::False(_) | Node::Derived(_) => ResidualKind::Derived,
            Node::And(..) => ResidualKind::And,
            Node::Or(..) => ResidualKind::Or,
            Node::Implies { .. } => ResidualKind::Implies,
            Node::Not { .. } => ResidualKind::Not,
            Node::AndAlways { .. } => ResidualKind::Always,
            Node::OrEventually { .. } => ResidualKind::Eventually,
        }
    }
}

impl Display for Residual {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Temporal operators waiting for the next state.
#[derive(Debug, Clone)]
pub(crate) enum Derived {
    Next { subformula: Rc<Formula> },
    Always { window: Window, subformula: Rc<Formula> },
    Eventually { window: Window, subformula: Rc<Formula> },
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    True,
    False(Violation),
    Derived(Derived),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Implies {
        antecedent: Rc<Formula>,
        left: Box<Node>,
        right: Box<Node>,
    },
    Not {
        subformula: Rc<Formula>,
        inner: Box<Node>,
    },
    /// Pending evaluations of an `always` subformula, all of which must hold, and the operator
    /// itself at the following states.
    AndAlways {
        subformula: Rc<Formula>,
        window: Window,
        pending: Vec<Node>,
        continuation: Box<Node>,
    },
    /// Pending evaluations of an `eventually` subformula, one of which must hold, and the
    /// operator itself at the following states.
    OrEventually {
        subformula: Rc<Formula>,
        window: Window,
        pending: Vec<Node>,
        continuation: Box<Node>,
    },
}

impl Node {
    /// Determine if every continuation of the trace satisfying `self` also satisfies `other`.
    ///
    /// Only structural entailment is detected, `false` does not mean the opposite holds.
    pub(crate) fn entails(&self, other: &Node) -> bool {
        use Derived::{Always, Eventually, Next};

        match (self, other) {
            (_, Node::True) | (Node::False(_), _) => true,
            (Node::Derived(Next { subformula: f }), Node::Derived(Next { subformula: g })) => {
                Rc::ptr_eq(f, g)
            }
            (
                Node::Derived(Always { window: ours, subformula: f }),
                Node::Derived(Always { window: theirs, subformula: g }),
            ) => Rc::ptr_eq(f, g) && ours.outlasts(theirs),
            (
                Node::Derived(Eventually { window: ours, subformula: f }),
                Node::Derived(Eventually { window: theirs, subformula: g }),
            ) => Rc::ptr_eq(f, g) && theirs.outlasts(ours),
            (Node::And(a, b), Node::And(c, d)) | (Node::Or(a, b), Node::Or(c, d)) => {
                a.entails(c) && b.entails(d)
            }
            (Node::Implies { left: a, right: b, .. }, Node::Implies { left: c, right: d, .. }) => {
                c.entails(a) && b.entails(d)
            }
            (Node::Not { inner: a, .. }, Node::Not { inner: b, .. }) => b.entails(a),
            (
                Node::AndAlways { subformula: f, pending: ours, continuation: a, .. },
                Node::AndAlways { subformula: g, pending: theirs, continuation: b, .. },
            ) => {
                Rc::ptr_eq(f, g)
                    && a.entails(b)
                    && theirs.iter().all(|other| ours.iter().any(|node| node.entails(other)))
            }
            (
                Node::OrEventually { subformula: f, pending: ours, continuation: a, .. },
                Node::OrEventually { subformula: g, pending: theirs, continuation: b, .. },
            ) => {
                Rc::ptr_eq(f, g)
                    && a.entails(b)
                    && ours.iter().all(|node| theirs.iter().any(|other| node.entails(other)))
            }
            _ => false,
        }
    }

    fn fmt_joined(
        f: &mut Formatter<'_>,
        pending: &[Node],
        continuation: &Node,
        operator: &str,
    ) -> std::fmt::Result {
        for node in pending {
            write!(f, "({}) {} ", node, operator)?;
        }

        write!(f, "({})", continuation)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False(_) => write!(f, "false"),
            Self::Derived(Derived::Next { subformula }) => write!(f, "next({})", subformula),
            Self::Derived(Derived::Always { window, subformula }) => {
                write!(f, "always({}) in {}", subformula, window)
            }
            Self::Derived(Derived::Eventually { window, subformula }) => {
                write!(f, "eventually({}) in {}", subformula, window)
            }
            Self::And(left, right) => write!(f, "({}) && ({})", left, right),
            Self::Or(left, right) => write!(f, "({}) || ({})", left, right),
            Self::Implies { left, right, .. } => write!(f, "({}).implies({})", left, right),
            Self::Not { inner, .. } => write!(f, "!({})", inner),
            Self::AndAlways {
                pending, continuation, ..
            } => Self::fmt_joined(f, pending, continuation, "&&"),
            Self::OrEventually {
                pending, continuation, ..
            } => Self::fmt_joined(f, pending, continuation, "||"),
        }
    }
}

/// Evaluate a formula at `time`.
///
/// The state registered for `time` must be the current state of every registry the predicates of
/// the formula read from. Errors are only produced by predicates.
pub fn evaluate(formula: &Formula, time: Time) -> Result<Verdict, EvaluationError> {
    let verdict = match formula {
        Formula::Literal(literal) => match literal.violation(time) {
            None => Verdict::True,
            Some(violation) => Verdict::False(violation),
        },
        Formula::Predicate(predicate) => return evaluate(&predicate.apply()?, time),
        Formula::Not(operator) => {
            let inner = evaluate(operator.subformula(), time)?;
            negation(operator.shared(), inner, time)
        }
        Formula::And(operator) => {
            let left = evaluate(operator.left(), time)?;
            let right = evaluate(operator.right(), time)?;
            conjunction(left, right)
        }
        Formula::Or(operator) => {
            let left = evaluate(operator.left(), time)?;
            let right = evaluate(operator.right(), time)?;
            disjunction(left, right)
        }
        Formula::Implies(operator) => {
            let left = evaluate(operator.left(), time)?;
            let right = evaluate(operator.right(), time)?;
            implication(operator.antecedent(), left, right)
        }
        Formula::Next(operator) => Verdict::Residual(Residual(Node::Derived(Derived::Next {
            subformula: Rc::clone(operator.shared()),
        }))),
        Formula::Always(operator) => {
            let window = Window::open(time, operator.bound());
            always(operator.shared(), window, time)?
        }
        Formula::Eventually(operator) => {
            let window = Window::open(time, operator.bound());
            eventually(operator.shared(), window, time)?
        }
    };

    Ok(verdict)
}

/// Advance a residual to `time`.
///
/// `time` must come after the time the residual was produced at, and the state registered for it
/// must be current.
pub fn step(residual: &Residual, time: Time) -> Result<Verdict, EvaluationError> {
    step_node(&residual.0, time)
}

fn step_node(node: &Node, time: Time) -> Result<Verdict, EvaluationError> {
    let verdict = match node {
        Node::True => Verdict::True,
        Node::False(violation) => Verdict::False(violation.clone()),
        Node::Derived(Derived::Next { subformula }) => evaluate(subformula, time)?,
        Node::Derived(Derived::Always { window, subformula }) => always(subformula, *window, time)?,
        Node::Derived(Derived::Eventually { window, subformula }) => {
            eventually(subformula, *window, time)?
        }
        Node::And(left, right) => {
            let left = step_node(left, time)?;
            let right = step_node(right, time)?;
            conjunction(left, right)
        }
        Node::Or(left, right) => {
            let left = step_node(left, time)?;
            let right = step_node(right, time)?;
            disjunction(left, right)
        }
        Node::Implies {
            antecedent,
            left,
            right,
        } => {
            let left = step_node(left, time)?;
            let right = step_node(right, time)?;
            implication(antecedent, left, right)
        }
        Node::Not { subformula, inner } => negation(subformula, step_node(inner, time)?, time),
        Node::AndAlways {
            subformula,
            window,
            pending,
            continuation,
        } => {
            let mut remaining = Vec::with_capacity(pending.len());

            for node in pending {
                match step_node(node, time)? {
                    Verdict::False(violation) => {
                        return Ok(Verdict::False(window.always_violation(subformula, violation)))
                    }
                    Verdict::True => {}
                    Verdict::Residual(Residual(node)) => absorb_conjunct(&mut remaining, node),
                }
            }

            let continuation = step_node(continuation, time)?;
            always_pending(subformula, *window, remaining, continuation)
        }
        Node::OrEventually {
            subformula,
            window,
            pending,
            continuation,
        } => {
            let mut remaining = Vec::with_capacity(pending.len());

            for node in pending {
                match step_node(node, time)? {
                    Verdict::True => return Ok(Verdict::True),
                    Verdict::False(_) => {}
                    Verdict::Residual(Residual(node)) => absorb_disjunct(&mut remaining, node),
                }
            }

            let continuation = step_node(continuation, time)?;
            eventually_pending(subformula, *window, remaining, continuation)
        }
    };

    Ok(verdict)
}
