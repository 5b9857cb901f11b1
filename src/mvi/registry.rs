//! Reducer lookup table keyed by (state shape, event kind).
//!
//! Built once per feature scope and read-only afterwards. Duplicate pairs are
//! rejected when building; pairs declared with `require` must be present.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::event::Event;
use super::reducer::Reducer;
use super::state::State;
use crate::error::RegistryError;

/// What the runtime does with an event that has no reducer for the current
/// state shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Drop silently.
    Ignore,
    /// Drop and emit a warning.
    #[default]
    Log,
    /// Treat as a programming error.
    Panic,
}

type Key<S, E> = (<S as State>::Shape, <E as Event>::Kind);

pub struct ReducerRegistry<S: State, E: Event> {
    reducers: HashMap<Key<S, E>, Arc<dyn Reducer<S, E>>>,
    unmatched: UnmatchedPolicy,
}

impl<S: State, E: Event> ReducerRegistry<S, E> {
    pub fn builder() -> RegistryBuilder<S, E> {
        RegistryBuilder {
            reducers: HashMap::new(),
            duplicates: Vec::new(),
            required: Vec::new(),
            unmatched: UnmatchedPolicy::default(),
        }
    }

    pub fn resolve(&self, shape: S::Shape, kind: E::Kind) -> Option<Arc<dyn Reducer<S, E>>> {
        self.reducers.get(&(shape, kind)).cloned()
    }

    pub fn unmatched_policy(&self) -> UnmatchedPolicy {
        self.unmatched
    }

    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

pub struct RegistryBuilder<S: State, E: Event> {
    reducers: HashMap<Key<S, E>, Arc<dyn Reducer<S, E>>>,
    duplicates: Vec<Key<S, E>>,
    required: Vec<Key<S, E>>,
    unmatched: UnmatchedPolicy,
}

impl<S: State, E: Event> RegistryBuilder<S, E> {
    /// Register `reducer` for events of `kind` arriving while the state has `shape`.
    pub fn on<R>(mut self, shape: S::Shape, kind: E::Kind, reducer: R) -> Self
    where
        R: Reducer<S, E> + 'static,
    {
        if self
            .reducers
            .insert((shape, kind), Arc::new(reducer))
            .is_some()
        {
            self.duplicates.push((shape, kind));
        }
        self
    }

    /// Fail `build` unless a reducer exists for this pair.
    pub fn require(mut self, shape: S::Shape, kind: E::Kind) -> Self {
        self.required.push((shape, kind));
        self
    }

    pub fn unmatched(mut self, policy: UnmatchedPolicy) -> Self {
        self.unmatched = policy;
        self
    }

    pub fn build(self) -> Result<ReducerRegistry<S, E>, RegistryError> {
        if let Some((shape, kind)) = self.duplicates.first() {
            return Err(RegistryError::Duplicate {
                state: format!("{shape:?}"),
                event: format!("{kind:?}"),
            });
        }

        if let Some((shape, kind)) = self
            .required
            .iter()
            .find(|key| !self.reducers.contains_key(*key))
        {
            return Err(RegistryError::Missing {
                state: format!("{shape:?}"),
                event: format!("{kind:?}"),
            });
        }

        Ok(ReducerRegistry {
            reducers: self.reducers,
            unmatched: self.unmatched,
        })
    }
}

impl<S: State<Shape = ()>, E: Event> RegistryBuilder<S, E> {
    /// Register for single-shape states.
    pub fn on_event<R>(self, kind: E::Kind, reducer: R) -> Self
    where
        R: Reducer<S, E> + 'static,
    {
        self.on((), kind, reducer)
    }

    /// Require a reducer for every kind in `kinds`.
    pub fn require_all(mut self, kinds: impl IntoIterator<Item = E::Kind>) -> Self {
        self.required.extend(kinds.into_iter().map(|kind| ((), kind)));
        self
    }
}
