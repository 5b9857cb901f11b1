//! Event-driven state machine primitives.
//!
//! # Architecture
//!
//! ```text
//! Event ──→ StateMachine ──→ Reducer ──→ State ──→ observers
//!   ↑            │              │
//!   │            └── chained ←──┤ (Effect::Dispatch)
//!   └──── debounced timers ←────┘ (Effect::Debounce)
//! ```
//!
//! - **State**: immutable UI snapshot, tagged by shape
//! - **Event**: user intent or system notification, tagged by kind
//! - **Reducer**: async transformation for one (shape, kind) pair
//! - **StateMachine**: owns the state and a sequential event queue

mod debounce;
mod dispatcher;
mod event;
mod reducer;
mod registry;
mod state;

pub use debounce::Debouncer;
pub use dispatcher::StateMachine;
pub use event::Event;
pub use reducer::{Effect, Reducer, Reduction};
pub use registry::{ReducerRegistry, RegistryBuilder, UnmatchedPolicy};
pub use state::State;
