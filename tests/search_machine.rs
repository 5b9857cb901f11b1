//! Search driven through the state machine.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use newsfeed::mvi::{StateMachine, UnmatchedPolicy};
use newsfeed::paging::{PageNumber, PagingState};
use newsfeed::search::{self, SearchEvent, SearchResults, SearchState, SEARCH_FAILED};
use newsfeed::session::SessionScope;

const DEBOUNCE: Duration = Duration::from_millis(500);

fn launch(feed: &Arc<ScriptedFeed>, session: &SessionScope) -> StateMachine<SearchState, SearchEvent> {
    let registry = search::registry(feed.clone(), 20, DEBOUNCE, UnmatchedPolicy::Panic).unwrap();
    let machine = search::launch(registry, session);
    machine.start();
    machine
}

/// Type `query` and wait out the debounce window.
async fn search_for(machine: &StateMachine<SearchState, SearchEvent>, query: &str) {
    machine.dispatch(SearchEvent::QueryChanged(query.to_string()));
    machine.settled().await;
    tokio::time::sleep(DEBOUNCE + Duration::from_millis(10)).await;
    machine.settled().await;
}

#[tokio::test(start_paused = true)]
async fn kotlin_search_pages_to_the_end_and_refreshes() {
    let feed = ScriptedFeed::new();
    feed.push_ok(articles(1..=3));
    feed.push_ok(Vec::new());
    feed.push_ok(articles(11..=15));
    let session = SessionScope::new();
    let machine = launch(&feed, &session);

    search_for(&machine, "kotlin").await;
    assert_eq!(
        machine.state().results,
        SearchResults::Success {
            articles: articles(1..=3),
            paging: PagingState::Idle {
                current_page: PageNumber::FIRST
            },
        }
    );

    machine.dispatch(SearchEvent::LoadMore);
    machine.settled().await;
    assert_eq!(
        machine.state().results,
        SearchResults::Success {
            articles: articles(1..=3),
            paging: PagingState::EndReached,
        }
    );

    machine.dispatch(SearchEvent::Refresh);
    machine.settled().await;
    assert_eq!(
        machine.state().results,
        SearchResults::Success {
            articles: articles(11..=15),
            paging: PagingState::Idle {
                current_page: PageNumber::FIRST
            },
        }
    );

    let calls = feed.calls();
    assert_eq!(feed.pages(), vec![1, 2, 1]);
    assert!(calls
        .iter()
        .all(|query| query.query.as_deref() == Some("kotlin")));
}

#[tokio::test(start_paused = true)]
async fn only_the_settled_query_is_searched() {
    let feed = ScriptedFeed::new();
    feed.push_ok(articles(1..=2));
    let session = SessionScope::new();
    let machine = launch(&feed, &session);

    for query in ["k", "ko", "kot"] {
        machine.dispatch(SearchEvent::QueryChanged(query.to_string()));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    search_for(&machine, "kotlin ").await;

    let calls = feed.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query.as_deref(), Some("kotlin"));
    assert_eq!(machine.state().query, "kotlin ");
    assert_eq!(machine.state().results.articles().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn clearing_cancels_the_pending_search() {
    let feed = ScriptedFeed::new();
    let session = SessionScope::new();
    let machine = launch(&feed, &session);

    machine.dispatch(SearchEvent::QueryChanged("rust".to_string()));
    machine.dispatch(SearchEvent::ClearSearch);
    tokio::time::sleep(Duration::from_secs(1)).await;
    machine.settled().await;

    assert_eq!(machine.state(), SearchState::default());
    assert!(feed.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn blanking_the_query_returns_to_idle() {
    let feed = ScriptedFeed::new();
    feed.push_ok(articles(1..=2));
    let session = SessionScope::new();
    let machine = launch(&feed, &session);

    search_for(&machine, "kotlin").await;
    search_for(&machine, "   ").await;

    assert_eq!(machine.state().results, SearchResults::Idle);
    assert_eq!(feed.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn no_results_is_empty() {
    let feed = ScriptedFeed::new();
    let session = SessionScope::new();
    let machine = launch(&feed, &session);

    search_for(&machine, "nothing matches").await;

    assert_eq!(machine.state().results, SearchResults::Empty);
    assert!(!machine.state().results.can_load_more());
}

#[tokio::test(start_paused = true)]
async fn failures_surface_as_error_or_inline() {
    let feed = ScriptedFeed::new();
    feed.push_err("");
    feed.push_ok(articles(1..=3));
    feed.push_err("rate limited");
    let session = SessionScope::new();
    let machine = launch(&feed, &session);

    search_for(&machine, "kotlin").await;
    assert_eq!(
        machine.state().results,
        SearchResults::Error(SEARCH_FAILED.to_string())
    );

    machine.dispatch(SearchEvent::Refresh);
    machine.settled().await;
    assert_eq!(machine.state().results.articles().len(), 3);

    machine.dispatch(SearchEvent::LoadMore);
    machine.settled().await;
    let results = machine.state().results;
    assert_eq!(results.articles(), articles(1..=3).as_slice());
    assert_eq!(
        results,
        SearchResults::Success {
            articles: articles(1..=3),
            paging: PagingState::Error {
                message: "rate limited".to_string(),
                current_page: PageNumber::FIRST,
            },
        }
    );
}
