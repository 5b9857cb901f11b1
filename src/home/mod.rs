//! Home feed: top headlines, optionally filtered by one source.
//!
//! Two renditions share the same collaborators:
//! - `launch` builds a `StateMachine` driven by `HomeEvent`s
//! - `HomeFeed` wraps a `Pager` directly

mod event;
mod feed;
mod reducer;
mod state;

use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::error::RegistryError;
use crate::mvi::{ReducerRegistry, StateMachine, UnmatchedPolicy};
use crate::news::{ArticleFeed, SourceCatalog};
use crate::paging::PageNumber;
use crate::session::SessionScope;

pub use event::{HomeEvent, HomeEventKind};
pub use feed::HomeFeed;
pub use reducer::{
    LoadArticlesReducer, LoadMoreReducer, LoadSourcesReducer, RefreshReducer,
    SelectSourceReducer, SetPagingLoadingReducer, SetRefreshLoadingReducer, LOAD_NEWS_FAILED,
    LOAD_SOURCES_FAILED,
};
pub use state::{ArticlesState, HomeState, RefreshState, SourcesState};

/// Reducer table for the home feed. Every event kind must be covered.
pub fn registry(
    feed: Arc<dyn ArticleFeed>,
    catalog: Arc<dyn SourceCatalog>,
    page_size: u32,
    unmatched: UnmatchedPolicy,
) -> Result<ReducerRegistry<HomeState, HomeEvent>, RegistryError> {
    ReducerRegistry::builder()
        .on_event(
            HomeEventKind::LoadArticles,
            LoadArticlesReducer::new(feed, page_size),
        )
        .on_event(HomeEventKind::LoadSources, LoadSourcesReducer::new(catalog))
        .on_event(HomeEventKind::SelectSource, SelectSourceReducer)
        .on_event(HomeEventKind::Refresh, RefreshReducer)
        .on_event(HomeEventKind::LoadMore, LoadMoreReducer)
        .on_event(HomeEventKind::SetPagingLoading, SetPagingLoadingReducer)
        .on_event(HomeEventKind::SetRefreshLoading, SetRefreshLoadingReducer)
        .require_all(HomeEventKind::iter())
        .unmatched(unmatched)
        .build()
}

/// A home state machine bound to `session`. Sources and the first page load
/// when it is first observed.
pub fn launch(
    registry: ReducerRegistry<HomeState, HomeEvent>,
    session: &SessionScope,
) -> StateMachine<HomeState, HomeEvent> {
    StateMachine::new(HomeState::default(), registry, session).with_start_events([
        HomeEvent::LoadSources,
        HomeEvent::LoadArticles {
            page: PageNumber::FIRST,
        },
    ])
}
