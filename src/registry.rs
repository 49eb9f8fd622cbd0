//! The source of the current state for a single trace.
//!
//! A [`Registry`] holds at most one current state along with the [`Time`] it was registered at.
//! Registering a new state replaces the current one and advances time, and every
//! [`Cell`](crate::Cell) bound to the registry observes the new state from then on. The
//! registry is a cheap handle: clones share the same underlying state, which is how cells and
//! the caller feeding states refer to the same trace.
//!
//! Independent traces require independent registries, there is no process-wide default.
//!
//! # Examples
//!
//! ```rust
//! use ltl_monitor::Registry;
//!
//! let registry = Registry::new();
//! assert!(registry.time().is_err());
//!
//! let t0 = registry.register(10);
//! let t1 = registry.register(20);
//!
//! assert!(t0 < t1);
//! assert_eq!(registry.current().unwrap(), (20, t1));
//!
//! registry.reset();
//! assert!(registry.current().is_err());
//! ```

use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

use crate::cell::Cell;
use crate::time::{Clock, Time};

/// Errors produced by reading from or registering into a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Registry has no current state")]
    NoCurrentState,

    #[error("Registration at {requested:?} precedes the previous registration at {previous:?}")]
    NonMonotonicTime { previous: Duration, requested: Duration },
}

struct Current<S> {
    state: S,
    time: Time,
    serial: u64,
}

struct Inner<S> {
    current: Option<Current<S>>,
    next_tick: u64,
    serial: u64,
    clock: Clock,
}

impl<S> Inner<S> {
    fn install(&mut self, state: S, elapsed: Duration) -> Time {
        let time = Time::new(self.next_tick, elapsed);

        // The serial is never reset so cached cell values from a previous trace are never
        // mistaken for values of the same tick in the next one.
        self.serial += 1;
        self.next_tick += 1;
        self.current = Some(Current {
            state,
            time,
            serial: self.serial,
        });

        time
    }
}

/// Holder of the current state of a trace.
///
/// See the [`registry`](crate::registry) module for more information.
pub struct Registry<S>(Rc<RefCell<Inner<S>>>);

impl<S> Clone for Registry<S> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Debug for Registry<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let inner = self.0.borrow();

        f.debug_struct("Registry")
            .field("time", &inner.current.as_ref().map(|current| current.time))
            .field("next_tick", &inner.next_tick)
            .field("clock", &inner.clock)
            .finish()
    }
}

impl<S> Registry<S> {
    /// Create an empty registry using the default [`Clock`].
    pub fn new() -> Self {
        Self::with_clock(Clock::default())
    }

    /// Create an empty registry that stamps states registered with [`Registry::register`] using
    /// the given clock.
    pub fn with_clock(clock: Clock) -> Self {
        let inner = Inner {
            current: None,
            next_tick: 0,
            serial: 0,
            clock,
        };

        Self(Rc::new(RefCell::new(inner)))
    }

    pub fn clock(&self) -> Clock {
        self.0.borrow().clock
    }

    /// Make `state` the current state and return the new time.
    ///
    /// The elapsed offset of the returned time is computed by the registry clock. The first
    /// state of a trace is always registered at offset zero.
    pub fn register(&self, state: S) -> Time {
        let mut inner = self.0.borrow_mut();
        let previous = inner.current.as_ref().map(|current| current.time.elapsed());
        let elapsed = inner.clock.advance(previous);
        let time = inner.install(state, elapsed);

        tracing::trace!(tick = time.tick(), elapsed = ?time.elapsed(), "registered state");
        time
    }

    /// Make `state` the current state using a caller-measured offset from the start of the trace.
    ///
    /// Offsets may repeat but must never decrease, otherwise a
    /// [`RegistryError::NonMonotonicTime`] is returned and the current state is left unchanged.
    pub fn register_at(&self, state: S, elapsed: Duration) -> Result<Time, RegistryError> {
        let mut inner = self.0.borrow_mut();

        if let Some(current) = &inner.current {
            let previous = current.time.elapsed();

            if elapsed < previous {
                return Err(RegistryError::NonMonotonicTime {
                    previous,
                    requested: elapsed,
                });
            }
        }

        let time = inner.install(state, elapsed);

        tracing::trace!(tick = time.tick(), elapsed = ?time.elapsed(), "registered timed state");
        Ok(time)
    }

    /// Return the registry to its empty state so that a fresh trace can be registered.
    pub fn reset(&self) {
        let mut inner = self.0.borrow_mut();

        inner.current = None;
        inner.next_tick = 0;
    }

    /// Determine if a state has been registered since creation or the last reset.
    pub fn has_state(&self) -> bool {
        self.0.borrow().current.is_some()
    }

    /// Time of the current state.
    pub fn time(&self) -> Result<Time, RegistryError> {
        self.0
            .borrow()
            .current
            .as_ref()
            .map(|current| current.time)
            .ok_or(RegistryError::NoCurrentState)
    }

    /// A copy of the current state along with its time.
    pub fn current(&self) -> Result<(S, Time), RegistryError>
    where
        S: Clone,
    {
        self.with_current(|state, time| (state.clone(), time))
    }

    /// Apply a function to the current state without copying it.
    ///
    /// The registry must not be modified from inside `f`.
    pub fn with_current<F, T>(&self, f: F) -> Result<T, RegistryError>
    where
        F: FnOnce(&S, Time) -> T,
    {
        let inner = self.0.borrow();
        let current = inner.current.as_ref().ok_or(RegistryError::NoCurrentState)?;

        Ok(f(&current.state, current.time))
    }

    pub(crate) fn read<F, T>(&self, f: F) -> Result<T, RegistryError>
    where
        F: FnOnce(&S, u64) -> T,
    {
        let inner = self.0.borrow();
        let current = inner.current.as_ref().ok_or(RegistryError::NoCurrentState)?;

        Ok(f(&current.state, current.serial))
    }

    /// Create a [`Cell`] that evaluates `query` against the current state of this registry.
    ///
    /// ```rust
    /// use ltl_monitor::Registry;
    ///
    /// let registry = Registry::new();
    /// let doubled = registry.extract(|state: &i32| state * 2);
    ///
    /// registry.register(21);
    /// assert_eq!(doubled.current(), Ok(42));
    /// ```
    pub fn extract<T, F>(&self, query: F) -> Cell<S, T>
    where
        F: Fn(&S) -> T + 'static,
    {
        Cell::new(self, query)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Registry, RegistryError};
    use crate::time::Clock;

    #[test]
    fn empty_registry() {
        let registry: Registry<u32> = Registry::new();

        assert!(!registry.has_state());
        assert_eq!(registry.time(), Err(RegistryError::NoCurrentState));
        assert_eq!(registry.current(), Err(RegistryError::NoCurrentState));
    }

    #[test]
    fn register_advances_time() -> Result<(), RegistryError> {
        let registry = Registry::with_clock(Clock::with_period(Duration::from_millis(10)));
        let t0 = registry.register("a");
        let t1 = registry.register("b");
        let t2 = registry.register("c");

        assert_eq!((t0.tick(), t1.tick(), t2.tick()), (0, 1, 2));
        assert_eq!(t0.elapsed(), Duration::ZERO);
        assert_eq!(t2.elapsed(), Duration::from_millis(20));
        assert_eq!(registry.time()?, t2);
        assert_eq!(registry.current()?, ("c", t2));

        Ok(())
    }

    #[test]
    fn register_at_rejects_earlier_offsets() -> Result<(), RegistryError> {
        let registry = Registry::new();

        registry.register_at(1, Duration::from_secs(2))?;
        registry.register_at(2, Duration::from_secs(2))?;

        let result = registry.register_at(3, Duration::from_secs(1));

        assert_eq!(
            result,
            Err(RegistryError::NonMonotonicTime {
                previous: Duration::from_secs(2),
                requested: Duration::from_secs(1),
            })
        );
        assert_eq!(registry.current()?.0, 2);

        Ok(())
    }

    #[test]
    fn reset_restarts_ticks() {
        let registry = Registry::new();

        registry.register(1);
        registry.register(2);
        registry.reset();

        assert!(!registry.has_state());
        assert_eq!(registry.register(3).tick(), 0);
    }

    #[test]
    fn clones_share_state() {
        let registry = Registry::new();
        let handle = registry.clone();

        registry.register(7);

        assert_eq!(handle.with_current(|state, _| *state), Ok(7));
    }
}
