//! The formula tree.
//!
//! A [`Formula`] is an immutable tree built from [`Literal`]s and [`Predicate`]s combined with the
//! operators in the [`operators`](crate::operators) module. Children are shared behind [`Rc`],
//! so cloning a formula or reusing it inside a larger one is cheap.
//!
//! Formulas are usually built with the free functions in this module together with the
//! combinator methods on `Formula`:
//!
//! ```rust
//! use ltl_monitor::{always, eventually, next, not, pure, Formula};
//!
//! let p = pure(true, "p");
//! let q = pure(false, "q");
//!
//! let f1 = p.clone().and(q.clone());
//! let f2 = not(p.clone()).or(next(q.clone()));
//! let f3 = always(p.clone().implies(eventually(q.clone())));
//! let f4 = !Formula::from(f3);
//! ```
//!
//! No simplification is performed while building, the tree mirrors exactly what was written.

use std::fmt::{Display, Formatter};
use std::ops;

use crate::operators::{Always, And, Eventually, Implies, Next, Not, Or};
use crate::predicate::{Literal, Predicate, PredicateOutput};
use crate::EvaluationError;

/// A linear temporal logic formula.
#[derive(Debug, Clone)]
pub enum Formula {
    Literal(Literal),
    Predicate(Predicate),
    Not(Not),
    And(And),
    Or(Or),
    Implies(Implies),
    Next(Next),
    Always(Always),
    Eventually(Eventually),
}

impl Formula {
    /// Create a formula that is always `value`.
    pub fn literal<D>(value: bool, description: D) -> Self
    where
        D: Into<String>,
    {
        Self::Literal(Literal::new(value, description))
    }

    /// Create a formula from a function that is re-evaluated at every state.
    ///
    /// The function may return a `bool` or another [`Formula`] to evaluate in its place.
    pub fn predicate<D, F, R>(description: D, thunk: F) -> Self
    where
        D: Into<String>,
        F: Fn() -> Result<R, EvaluationError> + 'static,
        R: PredicateOutput,
    {
        Self::Predicate(Predicate::new(description, thunk))
    }

    pub fn and<F>(self, other: F) -> Self
    where
        F: Into<Formula>,
    {
        Self::And(And::new(self, other))
    }

    pub fn or<F>(self, other: F) -> Self
    where
        F: Into<Formula>,
    {
        Self::Or(Or::new(self, other))
    }

    pub fn implies<F>(self, consequent: F) -> Self
    where
        F: Into<Formula>,
    {
        Self::Implies(Implies::new(self, consequent))
    }
}

impl ops::Not for Formula {
    type Output = Formula;

    fn not(self) -> Self::Output {
        Self::Not(Not::new(self))
    }
}

impl From<bool> for Formula {
    fn from(value: bool) -> Self {
        Self::literal(value, value.to_string())
    }
}

impl From<Literal> for Formula {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl From<Predicate> for Formula {
    fn from(predicate: Predicate) -> Self {
        Self::Predicate(predicate)
    }
}

impl From<Not> for Formula {
    fn from(operator: Not) -> Self {
        Self::Not(operator)
    }
}

impl From<And> for Formula {
    fn from(operator: And) -> Self {
        Self::And(operator)
    }
}

impl From<Or> for Formula {
    fn from(operator: Or) -> Self {
        Self::Or(operator)
    }
}

impl From<Implies> for Formula {
    fn from(operator: Implies) -> Self {
        Self::Implies(operator)
    }
}

impl From<Next> for Formula {
    fn from(operator: Next) -> Self {
        Self::Next(operator)
    }
}

impl From<Always> for Formula {
    fn from(operator: Always) -> Self {
        Self::Always(operator)
    }
}

impl From<Eventually> for Formula {
    fn from(operator: Eventually) -> Self {
        Self::Eventually(operator)
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(inner) => inner.fmt(f),
            Self::Predicate(inner) => inner.fmt(f),
            Self::Not(inner) => inner.fmt(f),
            Self::And(inner) => inner.fmt(f),
            Self::Or(inner) => inner.fmt(f),
            Self::Implies(inner) => inner.fmt(f),
            Self::Next(inner) => inner.fmt(f),
            Self::Always(inner) => inner.fmt(f),
            Self::Eventually(inner) => inner.fmt(f),
        }
    }
}

/// Create a formula with a fixed truth value.
pub fn pure<D>(value: bool, description: D) -> Formula
where
    D: Into<String>,
{
    Formula::literal(value, description)
}

/// Negate a formula.
pub fn not<F>(subformula: F) -> Formula
where
    F: Into<Formula>,
{
    Formula::Not(Not::new(subformula))
}

/// Require a formula to hold at the following state.
pub fn next<F>(subformula: F) -> Formula
where
    F: Into<Formula>,
{
    Formula::Next(Next::new(subformula))
}

/// Require a formula to hold at every state. Use [`Always::within`] to add a time bound.
pub fn always<F>(subformula: F) -> Always
where
    F: Into<Formula>,
{
    Always::unbounded(subformula)
}

/// Require a formula to hold at some state. Use [`Eventually::within`] to add a time bound.
pub fn eventually<F>(subformula: F) -> Eventually
where
    F: Into<Formula>,
{
    Eventually::unbounded(subformula)
}
