//! Ordering, routing and lifecycle of the state machine runtime.

use std::time::Duration;

use async_trait::async_trait;
use newsfeed::error::RegistryError;
use newsfeed::mvi::{Event, Reducer, ReducerRegistry, Reduction, State, StateMachine, UnmatchedPolicy};
use newsfeed::session::SessionScope;

#[derive(Debug, Clone, Default, PartialEq)]
struct Trace {
    log: Vec<String>,
    locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TraceShape {
    Open,
    Locked,
}

impl State for Trace {
    type Shape = TraceShape;

    fn shape(&self) -> TraceShape {
        if self.locked {
            TraceShape::Locked
        } else {
            TraceShape::Open
        }
    }
}

#[derive(Debug)]
enum TraceEvent {
    Record(&'static str),
    /// Record the name, then chain a `Record` for each follow-up.
    Chain(&'static str, Vec<&'static str>),
    /// Record the name after a delay.
    Slow(&'static str),
    Lock,
    Debounced(&'static str),
    CancelPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TraceKind {
    Record,
    Chain,
    Slow,
    Lock,
    Debounced,
    CancelPending,
}

impl Event for TraceEvent {
    type Kind = TraceKind;

    fn kind(&self) -> TraceKind {
        match self {
            Self::Record(_) => TraceKind::Record,
            Self::Chain(..) => TraceKind::Chain,
            Self::Slow(_) => TraceKind::Slow,
            Self::Lock => TraceKind::Lock,
            Self::Debounced(_) => TraceKind::Debounced,
            Self::CancelPending => TraceKind::CancelPending,
        }
    }
}

type TraceReduction = Reduction<Trace, TraceEvent>;

fn record(mut state: Trace, entry: String) -> Trace {
    state.log.push(entry);
    state
}

struct RecordReducer;

#[async_trait]
impl Reducer<Trace, TraceEvent> for RecordReducer {
    async fn reduce(&self, state: Trace, event: TraceEvent) -> TraceReduction {
        match event {
            TraceEvent::Record(name) => Reduction::new(record(state, name.to_string())),
            _ => Reduction::new(state),
        }
    }
}

struct LockedRecordReducer;

#[async_trait]
impl Reducer<Trace, TraceEvent> for LockedRecordReducer {
    async fn reduce(&self, state: Trace, event: TraceEvent) -> TraceReduction {
        match event {
            TraceEvent::Record(name) => Reduction::new(record(state, format!("locked:{name}"))),
            _ => Reduction::new(state),
        }
    }
}

struct ChainReducer;

#[async_trait]
impl Reducer<Trace, TraceEvent> for ChainReducer {
    async fn reduce(&self, state: Trace, event: TraceEvent) -> TraceReduction {
        let TraceEvent::Chain(name, follow_ups) = event else {
            return Reduction::new(state);
        };
        follow_ups
            .into_iter()
            .fold(Reduction::new(record(state, name.to_string())), |reduction, next| {
                reduction.then(TraceEvent::Record(next))
            })
    }
}

struct SlowReducer;

#[async_trait]
impl Reducer<Trace, TraceEvent> for SlowReducer {
    async fn reduce(&self, state: Trace, event: TraceEvent) -> TraceReduction {
        tokio::time::sleep(Duration::from_secs(1)).await;
        match event {
            TraceEvent::Slow(name) => Reduction::new(record(state, name.to_string())),
            _ => Reduction::new(state),
        }
    }
}

struct LockReducer;

#[async_trait]
impl Reducer<Trace, TraceEvent> for LockReducer {
    async fn reduce(&self, state: Trace, _event: TraceEvent) -> TraceReduction {
        Reduction::new(Trace {
            locked: true,
            ..state
        })
    }
}

struct DebouncedReducer;

#[async_trait]
impl Reducer<Trace, TraceEvent> for DebouncedReducer {
    async fn reduce(&self, state: Trace, event: TraceEvent) -> TraceReduction {
        match event {
            TraceEvent::Debounced(name) => Reduction::new(state).debounce(
                "trace",
                Duration::from_millis(500),
                TraceEvent::Record(name),
            ),
            _ => Reduction::new(state),
        }
    }
}

struct CancelReducer;

#[async_trait]
impl Reducer<Trace, TraceEvent> for CancelReducer {
    async fn reduce(&self, state: Trace, _event: TraceEvent) -> TraceReduction {
        Reduction::new(state).cancel_debounce("trace")
    }
}

fn registry() -> ReducerRegistry<Trace, TraceEvent> {
    ReducerRegistry::builder()
        .on(TraceShape::Open, TraceKind::Record, RecordReducer)
        .on(TraceShape::Locked, TraceKind::Record, LockedRecordReducer)
        .on(TraceShape::Open, TraceKind::Chain, ChainReducer)
        .on(TraceShape::Open, TraceKind::Slow, SlowReducer)
        .on(TraceShape::Open, TraceKind::Lock, LockReducer)
        .on(TraceShape::Open, TraceKind::Debounced, DebouncedReducer)
        .on(TraceShape::Open, TraceKind::CancelPending, CancelReducer)
        .require(TraceShape::Locked, TraceKind::Record)
        .unmatched(UnmatchedPolicy::Log)
        .build()
        .unwrap()
}

fn machine(session: &SessionScope) -> StateMachine<Trace, TraceEvent> {
    StateMachine::new(Trace::default(), registry(), session)
}

fn log(machine: &StateMachine<Trace, TraceEvent>) -> Vec<String> {
    machine.state().log
}

#[tokio::test]
async fn chained_events_run_before_later_events() {
    let session = SessionScope::new();
    let machine = machine(&session);

    machine.dispatch(TraceEvent::Chain("e1", vec!["e2a", "e2b"]));
    machine.dispatch(TraceEvent::Record("e3"));
    let _states = machine.subscribe();
    machine.settled().await;

    assert_eq!(log(&machine), vec!["e1", "e2a", "e2b", "e3"]);
}

#[tokio::test(start_paused = true)]
async fn events_wait_for_a_suspended_reducer() {
    let session = SessionScope::new();
    let machine = machine(&session);
    let _states = machine.subscribe();

    machine.dispatch(TraceEvent::Slow("slow"));
    tokio::time::sleep(Duration::from_millis(100)).await;
    machine.dispatch(TraceEvent::Record("fast"));
    assert!(log(&machine).is_empty());

    machine.settled().await;
    assert_eq!(log(&machine), vec!["slow", "fast"]);
}

#[tokio::test]
async fn subscribers_get_latest_state_first() {
    let session = SessionScope::new();
    let machine = machine(&session);
    let mut states = machine.subscribe();
    assert_eq!(*states.borrow_and_update(), Trace::default());

    machine.dispatch(TraceEvent::Record("a"));
    states.changed().await.unwrap();
    assert_eq!(states.borrow().log, vec!["a"]);

    let late = machine.subscribe();
    assert_eq!(late.borrow().log, vec!["a"]);
}

#[tokio::test]
async fn routes_by_state_shape() {
    let session = SessionScope::new();
    let machine = machine(&session);
    let _states = machine.subscribe();

    machine.dispatch(TraceEvent::Record("a"));
    machine.dispatch(TraceEvent::Lock);
    machine.dispatch(TraceEvent::Record("b"));
    machine.settled().await;

    assert_eq!(log(&machine), vec!["a", "locked:b"]);
    assert!(machine.state().locked);
}

#[tokio::test]
async fn unmatched_event_is_dropped_without_state_change() {
    let session = SessionScope::new();
    let machine = machine(&session);
    let mut states = machine.subscribe();

    machine.dispatch(TraceEvent::Lock);
    machine.settled().await;
    let locked = states.borrow_and_update().clone();

    // No reducer for these while locked.
    machine.dispatch(TraceEvent::Lock);
    machine.dispatch(TraceEvent::Chain("x", vec!["y"]));
    machine.settled().await;
    assert!(!states.has_changed().unwrap());
    assert_eq!(machine.state(), locked);

    machine.dispatch(TraceEvent::Record("after"));
    machine.settled().await;
    assert_eq!(log(&machine), vec!["locked:after"]);
}

#[tokio::test]
async fn events_before_start_are_buffered() {
    let session = SessionScope::new();
    let machine = machine(&session);

    machine.dispatch(TraceEvent::Record("early"));
    tokio::task::yield_now().await;
    assert!(!machine.is_started());
    assert!(log(&machine).is_empty());

    machine.start();
    machine.settled().await;
    assert_eq!(log(&machine), vec!["early"]);
}

#[tokio::test]
async fn start_events_run_before_buffered_events() {
    let session = SessionScope::new();
    let machine = machine(&session).with_start_events([TraceEvent::Record("boot")]);

    machine.dispatch(TraceEvent::Record("early"));
    machine.dispatch(TraceEvent::Record("later"));
    machine.start();
    machine.settled().await;

    assert_eq!(log(&machine), vec!["boot", "early", "later"]);
}

#[tokio::test]
async fn start_is_idempotent() {
    let session = SessionScope::new();
    let machine = machine(&session).with_start_events([TraceEvent::Record("boot")]);

    machine.start();
    machine.start();
    let _states = machine.subscribe();
    machine.settled().await;

    assert!(machine.is_started());
    assert_eq!(log(&machine), vec!["boot"]);
}

#[tokio::test(start_paused = true)]
async fn debounce_keeps_only_the_last_event() {
    let session = SessionScope::new();
    let machine = machine(&session);
    let _states = machine.subscribe();

    machine.dispatch(TraceEvent::Debounced("a"));
    tokio::time::sleep(Duration::from_millis(100)).await;
    machine.dispatch(TraceEvent::Debounced("b"));
    machine.settled().await;
    assert!(log(&machine).is_empty());

    tokio::time::sleep(Duration::from_millis(600)).await;
    machine.settled().await;
    assert_eq!(log(&machine), vec!["b"]);
}

#[tokio::test(start_paused = true)]
async fn cancelled_debounce_never_fires() {
    let session = SessionScope::new();
    let machine = machine(&session);
    let _states = machine.subscribe();

    machine.dispatch(TraceEvent::Debounced("a"));
    machine.dispatch(TraceEvent::CancelPending);
    tokio::time::sleep(Duration::from_secs(1)).await;
    machine.settled().await;

    assert!(log(&machine).is_empty());
}

#[tokio::test(start_paused = true)]
async fn closing_the_session_discards_work() {
    let session = SessionScope::new();
    let machine = machine(&session);
    let _states = machine.subscribe();

    machine.dispatch(TraceEvent::Slow("interrupted"));
    machine.dispatch(TraceEvent::Record("queued"));
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.close();

    tokio::time::sleep(Duration::from_secs(2)).await;
    machine.dispatch(TraceEvent::Record("late"));
    machine.settled().await;

    assert_eq!(machine.state(), Trace::default());
}

#[test]
fn missing_required_pair_fails_to_build() {
    let result = ReducerRegistry::<Trace, TraceEvent>::builder()
        .on(TraceShape::Open, TraceKind::Record, RecordReducer)
        .require(TraceShape::Locked, TraceKind::Record)
        .build();

    assert_eq!(
        result.err(),
        Some(RegistryError::Missing {
            state: "Locked".to_string(),
            event: "Record".to_string(),
        })
    );
}
