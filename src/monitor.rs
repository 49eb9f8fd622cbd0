//! Monitoring several named properties against a single live trace.
//!
//! A [`Monitor`] owns a [`Registry`] and a list of named formulas. Each call to
//! [`Monitor::step`] registers a state and advances every property: properties that have not
//! seen a state yet are evaluated, undecided properties are stepped, and properties that have
//! already been settled keep their verdict without being evaluated again.
//!
//! ```rust
//! use ltl_monitor::{always, eventually, predicate, Formula, Monitor};
//!
//! let mut monitor = Monitor::new();
//! let count = monitor.registry().extract(|state: &u32| *state);
//!
//! let bounded = {
//!     let count = count.clone();
//!     Formula::from(always(predicate!{ count.current()? <= 5 }))
//! };
//! let reaches = Formula::from(eventually(predicate!{ count.current()? == 3 }));
//!
//! monitor.add("bounded", bounded).unwrap();
//! monitor.add("reaches_three", reaches).unwrap();
//!
//! for state in [1, 2, 3] {
//!     monitor.step(state).unwrap();
//! }
//!
//! let results = monitor.finish();
//! assert!(results[0].1.is_inconclusive());
//! assert!(results[1].1.is_passed());
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::check::CheckResult;
use crate::evaluate::{evaluate, step, Residual, ResidualKind, Verdict};
use crate::formula::Formula;
use crate::registry::Registry;
use crate::time::Time;
use crate::violation::Violation;
use crate::EvaluationError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    #[error("Property `{0}` is already being monitored")]
    DuplicateProperty(String),
}

/// Progress of a single property.
#[derive(Debug, Clone)]
pub enum PropertyState {
    /// No state has been observed yet.
    Initial(Formula),
    Residual(Residual),
    DefinitelyTrue,
    DefinitelyFalse(Violation),
}

impl PropertyState {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::DefinitelyTrue | Self::DefinitelyFalse(_))
    }
}

#[derive(Debug, Clone)]
struct Property {
    name: String,
    formula: Formula,
    state: PropertyState,
}

impl Property {
    fn verdict(&self, time: Time) -> Result<Verdict, EvaluationError> {
        match &self.state {
            PropertyState::Initial(formula) => evaluate(formula, time),
            PropertyState::Residual(residual) => step(residual, time),
            PropertyState::DefinitelyTrue => Ok(Verdict::True),
            PropertyState::DefinitelyFalse(violation) => Ok(Verdict::False(violation.clone())),
        }
    }

    fn record(&mut self, verdict: &Verdict, time: Time) {
        if self.state.is_settled() {
            return;
        }

        self.state = match verdict {
            Verdict::True => {
                tracing::debug!(property = %self.name, tick = time.tick(), "property satisfied");
                PropertyState::DefinitelyTrue
            }
            Verdict::False(violation) => {
                tracing::debug!(
                    property = %self.name,
                    tick = time.tick(),
                    %violation,
                    "property violated"
                );
                PropertyState::DefinitelyFalse(violation.clone())
            }
            Verdict::Residual(residual) => PropertyState::Residual(residual.clone()),
        };
    }

    fn result(&self) -> CheckResult {
        match &self.state {
            PropertyState::DefinitelyTrue => CheckResult::Passed,
            PropertyState::DefinitelyFalse(violation) => CheckResult::Failed(violation.clone()),
            PropertyState::Residual(residual) => CheckResult::Inconclusive(residual.kind()),
            PropertyState::Initial(_) => CheckResult::Inconclusive(ResidualKind::Derived),
        }
    }
}

/// A set of named properties evaluated against the same trace.
///
/// See the [`monitor`](crate::monitor) module for more information.
#[derive(Debug)]
pub struct Monitor<S> {
    registry: Registry<S>,
    properties: Vec<Property>,
}

impl<S> Default for Monitor<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Monitor<S> {
    /// Create a monitor with a fresh registry.
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    /// Create a monitor that registers states into an existing registry.
    pub fn with_registry(registry: Registry<S>) -> Self {
        Self {
            registry,
            properties: Vec::new(),
        }
    }

    /// The registry states are registered into. Use it to create the cells read by properties.
    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }

    /// Start monitoring `formula` under `name`.
    ///
    /// Properties added after states have been observed start from the next state.
    pub fn add<N, F>(&mut self, name: N, formula: F) -> Result<(), MonitorError>
    where
        N: Into<String>,
        F: Into<Formula>,
    {
        let name = name.into();

        if self.properties.iter().any(|property| property.name == name) {
            return Err(MonitorError::DuplicateProperty(name));
        }

        let formula = formula.into();

        self.properties.push(Property {
            name,
            state: PropertyState::Initial(formula.clone()),
            formula,
        });

        Ok(())
    }

    /// Names of the monitored properties, in the order they were added.
    pub fn properties(&self) -> impl Iterator<Item = &str> + '_ {
        self.properties.iter().map(|property| property.name.as_str())
    }

    /// Current progress of the property called `name`.
    pub fn state(&self, name: &str) -> Option<&PropertyState> {
        self.properties
            .iter()
            .find(|property| property.name == name)
            .map(|property| &property.state)
    }

    /// Determine if every property has been settled.
    pub fn is_settled(&self) -> bool {
        self.properties.iter().all(|property| property.state.is_settled())
    }

    /// Register `state` using the registry clock and advance every property.
    ///
    /// If a predicate fails the error is returned and no property advances. The state remains
    /// registered, and the following step is evaluated against the state after it.
    pub fn step(&mut self, state: S) -> Result<Vec<(String, Verdict)>, EvaluationError> {
        let time = self.registry.register(state);
        self.advance(time)
    }

    /// Register `state` at a caller-measured offset from the start of the trace and advance every
    /// property.
    pub fn step_at(
        &mut self,
        state: S,
        elapsed: Duration,
    ) -> Result<Vec<(String, Verdict)>, EvaluationError> {
        let time = self.registry.register_at(state, elapsed)?;
        self.advance(time)
    }

    /// Evaluate every property at `time`, then record the verdicts.
    ///
    /// Nothing is recorded unless every property could be evaluated, so a failing predicate
    /// leaves all properties where they were and the next state is observed by all of them.
    fn advance(&mut self, time: Time) -> Result<Vec<(String, Verdict)>, EvaluationError> {
        let verdicts = self
            .properties
            .iter()
            .map(|property| property.verdict(time))
            .collect::<Result<Vec<_>, _>>()?;

        let results = self
            .properties
            .iter_mut()
            .zip(verdicts)
            .map(|(property, verdict)| {
                property.record(&verdict, time);
                (property.name.clone(), verdict)
            })
            .collect();

        Ok(results)
    }

    /// Report the outcome of every property as if the trace ended now.
    ///
    /// Undecided properties are inconclusive.
    pub fn finish(&self) -> Vec<(String, CheckResult)> {
        self.properties
            .iter()
            .map(|property| (property.name.clone(), property.result()))
            .collect()
    }

    /// Return every property to its initial state and clear the registry.
    pub fn reset(&mut self) {
        self.registry.reset();

        for property in &mut self.properties {
            property.state = PropertyState::Initial(property.formula.clone());
        }
    }
}
