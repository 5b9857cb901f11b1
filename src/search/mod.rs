//! Article search by free-text query.
//!
//! Query changes are debounced; only the text that is still current once
//! typing settles gets searched.

mod event;
mod feed;
mod reducer;
mod state;

use std::sync::Arc;
use std::time::Duration;

use strum::IntoEnumIterator;

use crate::error::RegistryError;
use crate::mvi::{ReducerRegistry, StateMachine, UnmatchedPolicy};
use crate::news::ArticleFeed;
use crate::session::SessionScope;

pub use event::{SearchEvent, SearchEventKind};
pub use feed::SearchFeed;
pub use reducer::{
    ClearSearchReducer, LoadArticlesReducer, LoadMoreReducer, PerformSearchReducer,
    QueryChangedReducer, RefreshReducer, SetPagingLoadingReducer, QUERY_DEBOUNCE, SEARCH_FAILED,
};
pub use state::{SearchResults, SearchState};

pub fn registry(
    feed: Arc<dyn ArticleFeed>,
    page_size: u32,
    debounce: Duration,
    unmatched: UnmatchedPolicy,
) -> Result<ReducerRegistry<SearchState, SearchEvent>, RegistryError> {
    ReducerRegistry::builder()
        .on_event(
            SearchEventKind::QueryChanged,
            QueryChangedReducer::new(debounce),
        )
        .on_event(SearchEventKind::PerformSearch, PerformSearchReducer)
        .on_event(SearchEventKind::ClearSearch, ClearSearchReducer)
        .on_event(SearchEventKind::Refresh, RefreshReducer)
        .on_event(SearchEventKind::LoadMore, LoadMoreReducer)
        .on_event(SearchEventKind::SetPagingLoading, SetPagingLoadingReducer)
        .on_event(
            SearchEventKind::LoadArticles,
            LoadArticlesReducer::new(feed, page_size),
        )
        .require_all(SearchEventKind::iter())
        .unmatched(unmatched)
        .build()
}

/// A search state machine bound to `session`, starting with an empty query.
pub fn launch(
    registry: ReducerRegistry<SearchState, SearchEvent>,
    session: &SessionScope,
) -> StateMachine<SearchState, SearchEvent> {
    StateMachine::new(SearchState::default(), registry, session)
}
