//! Lazy views of the current state.
//!
//! A [`Cell`] pairs a [`Registry`] with a pure query over the state type. Reading the cell
//! evaluates the query against whatever state is current in the registry at that moment, which
//! makes cells the channel through which predicates observe the system being monitored.
//!
//! The value of a cell is cached for each registered state. Because queries are required to be
//! pure this is indistinguishable from evaluating the query on every read.

use std::cell::RefCell;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

use crate::registry::{Registry, RegistryError};

/// A pure query bound to the current state of a [`Registry`].
///
/// Cells are usually created with [`Registry::extract`]. Clones share the query and its cached
/// value, so a cell can be cloned into as many predicates as needed.
///
/// ```rust
/// use ltl_monitor::{Registry, RegistryError};
///
/// let registry = Registry::new();
/// let length = registry.extract(|state: &Vec<u8>| state.len());
///
/// assert_eq!(length.current(), Err(RegistryError::NoCurrentState));
///
/// registry.register(vec![1, 2, 3]);
/// assert_eq!(length.current(), Ok(3));
/// ```
pub struct Cell<S, T> {
    registry: Registry<S>,
    query: Rc<dyn Fn(&S) -> T>,
    cache: Rc<RefCell<Option<(u64, T)>>>,
}

impl<S, T> Cell<S, T> {
    pub fn new<F>(registry: &Registry<S>, query: F) -> Self
    where
        F: Fn(&S) -> T + 'static,
    {
        Self {
            registry: registry.clone(),
            query: Rc::new(query),
            cache: Rc::new(RefCell::new(None)),
        }
    }

    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }
}

impl<S, T> Cell<S, T>
where
    T: Clone,
{
    /// Evaluate the query against the current state of the registry.
    ///
    /// Returns [`RegistryError::NoCurrentState`] if no state has been registered.
    pub fn current(&self) -> Result<T, RegistryError> {
        self.registry.read(|state, serial| {
            let mut cache = self.cache.borrow_mut();

            match cache.as_ref() {
                Some((cached, value)) if *cached == serial => value.clone(),
                _ => {
                    let value = (self.query)(state);
                    *cache = Some((serial, value.clone()));
                    value
                }
            }
        })
    }
}

impl<S, T> Clone for Cell<S, T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            query: Rc::clone(&self.query),
            cache: Rc::clone(&self.cache),
        }
    }
}

impl<S, T> Debug for Cell<S, T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("registry", &self.registry)
            .field("cached", &self.cache.borrow().as_ref().map(|(_, value)| value))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell as Counter;
    use std::rc::Rc;

    use crate::registry::{Registry, RegistryError};

    #[test]
    fn read_before_registration() {
        let registry: Registry<i32> = Registry::new();
        let cell = registry.extract(|state| *state);

        assert_eq!(cell.current(), Err(RegistryError::NoCurrentState));
    }

    #[test]
    fn observes_latest_state() -> Result<(), RegistryError> {
        let registry = Registry::new();
        let cell = registry.extract(|state: &(i32, i32)| state.0 + state.1);

        registry.register((1, 2));
        assert_eq!(cell.current()?, 3);

        registry.register((10, 20));
        assert_eq!(cell.current()?, 30);

        Ok(())
    }

    #[test]
    fn query_runs_once_per_state() -> Result<(), RegistryError> {
        let calls = Rc::new(Counter::new(0));
        let registry = Registry::new();
        let cell = {
            let calls = Rc::clone(&calls);
            registry.extract(move |state: &i32| {
                calls.set(calls.get() + 1);
                *state
            })
        };
        let copy = cell.clone();

        registry.register(5);
        cell.current()?;
        copy.current()?;
        assert_eq!(calls.get(), 1);

        registry.register(6);
        assert_eq!(copy.current()?, 6);
        assert_eq!(calls.get(), 2);

        Ok(())
    }

    #[test]
    fn cache_does_not_survive_reset() -> Result<(), RegistryError> {
        let registry = Registry::new();
        let cell = registry.extract(|state: &i32| *state);

        registry.register(1);
        assert_eq!(cell.current()?, 1);

        registry.reset();
        assert_eq!(cell.current(), Err(RegistryError::NoCurrentState));

        registry.register(2);
        assert_eq!(cell.current()?, 2);

        Ok(())
    }
}
