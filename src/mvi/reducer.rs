//! Reducer trait and the value it returns.

use std::time::Duration;

use async_trait::async_trait;

use super::event::Event;
use super::state::State;

/// Follow-up work requested by a reducer, executed by the runtime.
#[derive(Debug)]
pub enum Effect<E> {
    /// Process `E` next, ahead of anything submitted from outside.
    Dispatch(E),
    /// Submit `event` after `delay`, replacing any pending timer under `key`.
    Debounce {
        key: &'static str,
        delay: Duration,
        event: E,
    },
    /// Drop the pending timer under `key`, if any.
    CancelDebounce(&'static str),
}

/// The next state plus the effects a reducer wants run.
#[derive(Debug)]
pub struct Reduction<S, E> {
    pub state: S,
    pub effects: Vec<Effect<E>>,
}

impl<S, E> Reduction<S, E> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    /// Chain `event` after this reduction.
    pub fn then(mut self, event: E) -> Self {
        self.effects.push(Effect::Dispatch(event));
        self
    }

    pub fn debounce(mut self, key: &'static str, delay: Duration, event: E) -> Self {
        self.effects.push(Effect::Debounce { key, delay, event });
        self
    }

    pub fn cancel_debounce(mut self, key: &'static str) -> Self {
        self.effects.push(Effect::CancelDebounce(key));
        self
    }

    /// Events chained with `then`, in emission order.
    pub fn dispatched(&self) -> impl Iterator<Item = &E> {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::Dispatch(event) => Some(event),
            _ => None,
        })
    }
}

/// Transforms state for one registered (state shape, event kind) pair.
///
/// Failures from collaborators must be folded into the returned state; the
/// runtime has no error channel.
#[async_trait]
pub trait Reducer<S: State, E: Event>: Send + Sync {
    async fn reduce(&self, state: S, event: E) -> Reduction<S, E>;
}
