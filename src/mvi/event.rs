//! Base trait for events (user intents and system notifications).

use std::fmt::Debug;
use std::hash::Hash;

/// An event dispatched into a state machine.
///
/// Events represent:
/// - User actions (pull to refresh, scrolling to the end, typing a query)
/// - System notifications emitted by reducers (loading flags, page loads)
///
/// `kind()` names the variant; reducers are registered per kind.
pub trait Event: Debug + Send + 'static {
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;
}
