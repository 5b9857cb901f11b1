//! Sequential event dispatcher.
//!
//! One worker per machine drains events strictly one at a time. Events
//! chained by a reducer run before anything submitted from outside; debounced
//! events re-enter through the external queue when their timer fires.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use super::debounce::Debouncer;
use super::event::Event;
use super::reducer::Effect;
use super::registry::{ReducerRegistry, UnmatchedPolicy};
use super::state::State;
use crate::session::{SessionHandle, SessionScope};

pub struct StateMachine<S: State, E: Event> {
    inner: Arc<Inner<S, E>>,
}

impl<S: State, E: Event> Clone for StateMachine<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<S: State, E: Event> {
    state: watch::Sender<S>,
    events: mpsc::UnboundedSender<E>,
    queue: Mutex<Option<mpsc::UnboundedReceiver<E>>>,
    start_events: Mutex<Vec<E>>,
    registry: ReducerRegistry<S, E>,
    pending: Arc<watch::Sender<usize>>,
    session: SessionHandle,
    debouncer: Debouncer<&'static str>,
    started: AtomicBool,
}

impl<S: State, E: Event> StateMachine<S, E> {
    /// Build a machine bound to `session`; closing the session stops the
    /// worker, drops queued events and cancels pending timers.
    pub fn new(initial: S, registry: ReducerRegistry<S, E>, session: &SessionScope) -> Self {
        let (state, _) = watch::channel(initial);
        let (events, queue) = mpsc::unbounded_channel();
        let session = session.handle();

        Self {
            inner: Arc::new(Inner {
                state,
                events,
                queue: Mutex::new(Some(queue)),
                start_events: Mutex::new(Vec::new()),
                registry,
                pending: Arc::new(watch::channel(0).0),
                debouncer: Debouncer::new(session.clone()),
                session,
                started: AtomicBool::new(false),
            }),
        }
    }

    /// Events submitted once when processing starts.
    pub fn with_start_events(self, events: impl IntoIterator<Item = E>) -> Self {
        self.inner.start_events.lock().extend(events);
        self
    }

    /// Enqueue `event`. Never blocks.
    pub fn dispatch(&self, event: E) {
        if self.inner.session.is_closed() {
            tracing::debug!(?event, "Dropping event for closed session");
            return;
        }
        self.inner.pending.send_modify(|pending| *pending += 1);
        if self.inner.events.send(event).is_err() {
            self.inner.pending.send_modify(|pending| *pending = pending.saturating_sub(1));
            tracing::debug!("Event queue closed");
        }
    }

    /// Begin draining the queue. Calling it again has no effect.
    pub fn start(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(mut queue) = self.inner.queue.lock().take() else {
            return;
        };

        // Start events go ahead of anything dispatched before start.
        let mut buffered = Vec::new();
        while let Ok(event) = queue.try_recv() {
            buffered.push(event);
        }
        for event in std::mem::take(&mut *self.inner.start_events.lock()) {
            self.dispatch(event);
        }
        for event in buffered {
            if self.inner.events.send(event).is_err() {
                self.inner.pending.send_modify(|pending| *pending = pending.saturating_sub(1));
            }
        }

        tracing::debug!("State machine started");
        let inner = Arc::clone(&self.inner);
        let session = self.inner.session.clone();
        session.spawn(run(inner, queue));
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst)
    }

    /// Observe the state. The receiver holds the current value immediately
    /// and is notified after every processed event. Starts the machine.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        let receiver = self.inner.state.subscribe();
        self.start();
        receiver
    }

    /// The latest state.
    pub fn state(&self) -> S {
        self.inner.state.borrow().clone()
    }

    /// Wait until no event is queued or being processed. Debounce timers
    /// that have not fired yet do not count. Returns immediately once the
    /// session is closed.
    ///
    /// Events buffered before `start` keep this pending until the machine
    /// is started.
    pub async fn settled(&self) {
        let mut pending = self.inner.pending.subscribe();
        tokio::select! {
            _ = pending.wait_for(|pending| *pending == 0) => {}
            _ = self.inner.session.closed() => {}
        }
    }
}

async fn run<S: State, E: Event>(inner: Arc<Inner<S, E>>, mut queue: mpsc::UnboundedReceiver<E>) {
    let mut chained: VecDeque<E> = VecDeque::new();

    loop {
        let event = match chained.pop_front() {
            Some(event) => event,
            None => match queue.recv().await {
                Some(event) => event,
                None => break,
            },
        };

        let current = inner.state.borrow().clone();
        let (shape, kind) = (current.shape(), event.kind());

        let Some(reducer) = inner.registry.resolve(shape, kind) else {
            inner.pending.send_modify(|pending| *pending = pending.saturating_sub(1));
            match inner.registry.unmatched_policy() {
                UnmatchedPolicy::Ignore => {
                    tracing::trace!(?shape, ?kind, "No reducer, event ignored")
                }
                UnmatchedPolicy::Log => {
                    tracing::warn!(?shape, ?kind, "No reducer registered, event dropped")
                }
                UnmatchedPolicy::Panic => {
                    panic!("no reducer registered for state {shape:?} and event {kind:?}")
                }
            }
            continue;
        };

        tracing::debug!(?event, ?shape, "Processing event");
        let reduction = reducer.reduce(current, event).await;
        if inner.session.is_closed() {
            break;
        }
        inner.state.send_replace(reduction.state);

        for effect in reduction.effects {
            match effect {
                Effect::Dispatch(next) => {
                    inner.pending.send_modify(|pending| *pending += 1);
                    chained.push_back(next);
                }
                Effect::Debounce { key, delay, event } => {
                    let events = inner.events.clone();
                    let pending = Arc::clone(&inner.pending);
                    inner.debouncer.schedule(key, delay, move || {
                        pending.send_modify(|pending| *pending += 1);
                        if events.send(event).is_err() {
                            pending.send_modify(|pending| *pending = pending.saturating_sub(1));
                        }
                    });
                }
                Effect::CancelDebounce(key) => inner.debouncer.cancel(&key),
            }
        }
        inner.pending.send_modify(|pending| *pending = pending.saturating_sub(1));
    }

    inner.debouncer.cancel_all();
    tracing::debug!("State machine stopped");
}
