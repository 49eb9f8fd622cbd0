//! Leaf expressions of a formula.
//!
//! Formulas bottom out in two kinds of expressions:
//!
//!   - a [`Literal`], which is a fixed truth value, and
//!   - a [`Predicate`], which is a zero-argument function that is re-evaluated at every time step
//!     and usually reads one or more [`Cell`](crate::Cell)s to inspect the current state.
//!
//! Both carry a human-readable description that only shows up in violations and residuals, it
//! never influences evaluation.
//!
//! # Examples
//!
//! A predicate is created from a description and a function returning either a `bool` or another
//! [`Formula`]. The function returns a `Result` so that reading a cell can be written with `?`:
//!
//! ```rust
//! use ltl_monitor::{Formula, Registry};
//!
//! let registry = Registry::new();
//! let count = registry.extract(|state: &usize| *state);
//!
//! let at_most_five = Formula::predicate("count <= 5", move || Ok(count.current()? <= 5));
//! ```
//!
//! The [`predicate!`](crate::predicate!) macro derives the description from the source text of
//! the expression:
//!
//! ```rust
//! use ltl_monitor::{predicate, Registry};
//!
//! let registry = Registry::new();
//! let count = registry.extract(|state: &usize| *state);
//!
//! let at_most_five = predicate!{ count.current()? <= 5 };
//! assert!(at_most_five.to_string().starts_with("count.current()"));
//! ```

use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

use crate::formula::Formula;
use crate::time::Time;
use crate::violation::Violation;
use crate::EvaluationError;

/// A fixed truth value with a description used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    value: bool,
    description: Rc<str>,
}

impl Literal {
    pub fn new<D>(value: bool, description: D) -> Self
    where
        D: Into<String>,
    {
        Self {
            value,
            description: Rc::from(description.into()),
        }
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// A literal is decided immediately: it either holds, or it is violated at `time`.
    pub(crate) fn violation(&self, time: Time) -> Option<Violation> {
        if self.value {
            None
        } else {
            Some(Violation::False {
                description: self.description.to_string(),
                time,
            })
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Values that a [`Predicate`] function may produce.
///
/// Booleans become a [`Literal`] carrying the description of the predicate that produced them,
/// formulas are evaluated in place of the predicate.
pub trait PredicateOutput {
    fn into_formula(self, description: &str) -> Formula;
}

impl PredicateOutput for bool {
    fn into_formula(self, description: &str) -> Formula {
        Formula::Literal(Literal::new(self, description))
    }
}

impl PredicateOutput for Formula {
    fn into_formula(self, _: &str) -> Formula {
        self
    }
}

type Thunk = Rc<dyn Fn() -> Result<Formula, EvaluationError>>;

/// A function re-evaluated once per time step.
///
/// See the [`predicate`](crate::predicate) module for more information.
#[derive(Clone)]
pub struct Predicate {
    description: Rc<str>,
    thunk: Thunk,
}

impl Predicate {
    pub fn new<D, F, R>(description: D, thunk: F) -> Self
    where
        D: Into<String>,
        F: Fn() -> Result<R, EvaluationError> + 'static,
        R: PredicateOutput,
    {
        let description: Rc<str> = Rc::from(description.into());
        let label = Rc::clone(&description);
        let thunk = move || thunk().map(|output| output.into_formula(&label));

        Self {
            description,
            thunk: Rc::new(thunk),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Run the predicate function against the current state.
    pub fn apply(&self) -> Result<Formula, EvaluationError> {
        (self.thunk)()
    }
}

impl Debug for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Predicate").field(&self.description).finish()
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Create a predicate [`Formula`] from an expression.
///
/// The expression becomes the body of a `move` closure returning
/// `Result<_, EvaluationError>`, so `?` may be used to read cells. Its source text is used as the
/// description of the predicate unless a description is given explicitly before a `=>`. Derived
/// descriptions are a debugging aid only and follow whatever formatting `stringify!` produces.
///
/// # Example
///
/// ```rust
/// use ltl_monitor::{always, predicate, Registry};
///
/// let registry = Registry::new();
/// let rpm = registry.extract(|state: &f64| *state);
/// let gear = registry.extract(|state: &f64| *state / 1000.0);
///
/// let p1 = always(predicate!{ rpm.current()? <= 5000.0 });
/// let p2 = always(predicate!("gear below six" => gear.current()? < 6.0));
/// ```
#[macro_export]
macro_rules! predicate {
    ($description:literal => $($body:tt)+) => {
        $crate::Formula::Predicate($crate::Predicate::new($description, move || Ok({ $($body)+ })))
    };
    ($($body:tt)+) => {
        $crate::Formula::Predicate($crate::Predicate::new(
            stringify!($($body)+),
            move || Ok({ $($body)+ }),
        ))
    };
}
