//! Combinatorial operators for constructing formulas.
//!
//! Operators do not inspect states themselves. They delegate to their operands and combine the
//! verdicts the operands produce, so a formula must bottom out in a
//! [`Literal`](crate::Literal) or a [`Predicate`](crate::Predicate).
//!
//! # First Order Operators
//!
//!   - [`Not`]
//!   - [`And`]
//!   - [`Or`]
//!   - [`Implies`]
//!
//! Each of these operators is time-invariant: both operands are evaluated against the same
//! state. When one operand is decided and the other is still waiting on future states, the
//! decided operand either settles the result on its own (a false conjunct, a true disjunct) or
//! drops out and leaves the undecided operand as the remaining obligation.
//!
//! # Forward Operators
//!
//! Forward operators depend on states after the current one.
//!
//!   - [`Next`] defers its subformula to the following state without looking at the current one.
//!   - [`Always`] requires its subformula to hold at every state. A single failure is fatal.
//!   - [`Eventually`] requires its subformula to hold at some state. A single success settles it.
//!
//! `Always` and `Eventually` may be bounded with `within`, which limits the obligation to the
//! states whose elapsed time falls inside `[start, start + bound]`, where `start` is the time the
//! operator was first evaluated:
//!
//! ```text
//! T1 T2 T3 T4 T5 T6
//! S1 S2 S3 S4 S5 S6
//!     |-----|
//!     start + bound
//! ```
//!
//! A bounded `Always` whose window closes while its subformula held throughout is satisfied, and
//! a bounded `Eventually` whose window closes without its subformula holding is violated. An
//! unbounded `Always` can only ever be violated, and an unbounded `Eventually` can only ever be
//! satisfied.
//!
//! # Examples
//!
//! ```rust
//! use ltl_monitor::{always, eventually, predicate, Formula, Registry, TimeUnit};
//! use ltl_monitor::operators::{And, Not};
//!
//! let registry = Registry::new();
//! let gear = registry.extract(|state: &(u8, f64)| state.0);
//! let rpm = registry.extract(|state: &(u8, f64)| state.1);
//!
//! let is_gear_4 = {
//!     let gear = gear.clone();
//!     predicate!{ gear.current()? == 4 }
//! };
//! let is_gear_3 = predicate!{ gear.current()? == 3 };
//! let rpm_high = predicate!{ rpm.current()? >= 4000.0 };
//!
//! let shift = eventually(is_gear_4).within(3, TimeUnit::Seconds).unwrap();
//! let phi = always(Formula::from(And::new(is_gear_3, rpm_high)).implies(shift));
//! let psi = Not::new(phi.clone());
//! ```

mod first_order;
mod forward;

pub use first_order::{And, Implies, Not, Or};
pub use forward::{Always, BoundError, Eventually, Next};

pub(crate) use first_order::{conjunction, disjunction, implication, negation};
pub(crate) use forward::{
    absorb_conjunct, absorb_disjunct, always, always_pending, eventually, eventually_pending,
    Window,
};
