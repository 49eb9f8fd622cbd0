//! A set of states where each state is associated with a time.
//!
//! A [`Trace`] is an associative map representing a recorded sequence of states, where the key
//! for each state is the time in seconds when it was observed. Traces are the input of
//! [`run_timed_check`](crate::run_timed_check), which replays the states in chronological order
//! and uses their times to measure temporal bounds.
//!
//! # Panics
//!
//! `f64` values do not implement `Ord` because of NaN, which makes them unsuitable as map keys.
//! Times are therefore checked when they are inserted, and using a NaN value as a time in any
//! method will result in a panic.
//!
//! # Examples
//!
//! ```rust
//! use ltl_monitor::Trace;
//!
//! let mut trace = Trace::from([
//!     (0.0, "idle"),
//!     (1.5, "running"),
//! ]);
//!
//! trace.insert(3.0, "stopped");
//!
//! assert_eq!(trace.len(), 3);
//! assert_eq!(trace.at_time(1.5), Some(&"running"));
//! assert_eq!(trace.times().collect::<Vec<_>>(), vec![0.0, 1.5, 3.0]);
//!
//! for (time, state) in &trace {  // (f64, &&str)
//!     // ...
//! }
//! ```
//!
//! Traces can be collected from iterators that yield `(time, state)` pairs.
//!
//! ```rust
//! use ltl_monitor::Trace;
//!
//! let trace: Trace<_> = (0..5).map(|i| (i as f64 * 0.1, i)).collect();
//! ```

use std::collections::BTreeMap;

use ordered_float::NotNan;

fn key(time: f64) -> NotNan<f64> {
    NotNan::new(time).expect("trace times must not be NaN")
}

/// A set of states where each state is associated with a time.
///
/// See the [`trace`](crate::trace) module for more information.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Trace<T>(BTreeMap<NotNan<f64>, T>);

impl<T> Default for Trace<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, T> FromIterator<(A, T)> for Trace<T>
where
    A: Into<f64>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (A, T)>,
    {
        let elements = iter
            .into_iter()
            .map(|(time, state)| (key(time.into()), state))
            .collect();

        Self(elements)
    }
}

impl<A, T, const N: usize> From<[(A, T); N]> for Trace<T>
where
    A: Into<f64>,
{
    #[inline]
    fn from(values: [(A, T); N]) -> Self {
        Self::from_iter(values)
    }
}

impl<A, T> From<Vec<(A, T)>> for Trace<T>
where
    A: Into<f64>,
{
    #[inline]
    fn from(values: Vec<(A, T)>) -> Self {
        Self::from_iter(values)
    }
}

impl<T> Trace<T> {
    /// Create a new empty trace. Equivalent to [`Trace::default()`]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Number of states in the trace
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Determine if the trace contains any states
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the state for a given time. Returns None if the time is not present in the trace.
    ///
    /// # Panics
    ///
    /// This method will panic if the provided time is NaN
    pub fn at_time(&self, time: f64) -> Option<&T> {
        self.0.get(&key(time))
    }

    /// Insert a state for a given time into the trace. Returns the prior state if it exists.
    ///
    /// # Panics
    ///
    /// This method will panic if the provided time is NaN
    pub fn insert(&mut self, time: f64, state: T) -> Option<T> {
        self.0.insert(key(time), state)
    }

    /// Iterate over the times of the trace in chronological order
    pub fn times(&self) -> impl DoubleEndedIterator<Item = f64> + ExactSizeIterator + '_ {
        self.0.keys().map(|time| time.into_inner())
    }

    /// Iterate over the states of the trace in chronological order
    pub fn states(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.0.values()
    }

    /// Iterate over the `(time, state)` pairs of the trace in chronological order
    pub fn iter(&self) -> Iter<'_, T> {
        Iter(self.0.iter())
    }
}

/// Iterator over references to the `(time, state)` pairs of a trace.
pub struct Iter<'a, T>(std::collections::btree_map::Iter<'a, NotNan<f64>, T>);

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (f64, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(time, state)| (time.into_inner(), state))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(time, state)| (time.into_inner(), state))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> IntoIterator for &'a Trace<T> {
    type Item = (f64, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the owned `(time, state)` pairs of a trace.
pub struct IntoIter<T>(std::collections::btree_map::IntoIter<NotNan<f64>, T>);

impl<T> Iterator for IntoIter<T> {
    type Item = (f64, T);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(time, state)| (time.into_inner(), state))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(time, state)| (time.into_inner(), state))
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for Trace<T> {
    type Item = (f64, T);
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.0.into_iter())
    }
}
