//! Base trait for UI state.

use std::fmt::Debug;
use std::hash::Hash;

/// An immutable UI snapshot owned by a state machine.
///
/// States should be:
/// - Immutable (every transition produces a new value)
/// - Self-contained (all data needed to render the view)
///
/// `shape()` identifies which variant the state is in, so the same event
/// can be routed differently depending on where it arrives. Aggregates with
/// a single shape use `()`.
pub trait State: Clone + Send + Sync + 'static {
    type Shape: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn shape(&self) -> Self::Shape;
}
