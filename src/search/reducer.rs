//! Reducers for article search.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::event::SearchEvent;
use super::state::{SearchResults, SearchState};
use crate::error::FetchError;
use crate::mvi::{Reducer, Reduction};
use crate::news::{Article, ArticleFeed, ArticleQuery};
use crate::paging::{PageNumber, PagingState};

pub const SEARCH_FAILED: &str = "Search failed";

/// Debounce key for query changes.
pub const QUERY_DEBOUNCE: &str = "search.query";

type SearchReduction = Reduction<SearchState, SearchEvent>;

pub struct QueryChangedReducer {
    debounce: Duration,
}

impl QueryChangedReducer {
    pub fn new(debounce: Duration) -> Self {
        Self { debounce }
    }
}

#[async_trait]
impl Reducer<SearchState, SearchEvent> for QueryChangedReducer {
    async fn reduce(&self, state: SearchState, event: SearchEvent) -> SearchReduction {
        let SearchEvent::QueryChanged(query) = event else {
            return Reduction::new(state);
        };
        if query == state.query {
            return Reduction::new(state);
        }

        if query.trim().is_empty() {
            return Reduction::new(SearchState {
                query,
                results: SearchResults::Idle,
            })
            .cancel_debounce(QUERY_DEBOUNCE);
        }

        Reduction::new(SearchState { query, ..state }).debounce(
            QUERY_DEBOUNCE,
            self.debounce,
            SearchEvent::PerformSearch,
        )
    }
}

pub struct PerformSearchReducer;

#[async_trait]
impl Reducer<SearchState, SearchEvent> for PerformSearchReducer {
    async fn reduce(&self, state: SearchState, _event: SearchEvent) -> SearchReduction {
        if !state.has_query() {
            return Reduction::new(SearchState {
                results: SearchResults::Idle,
                ..state
            });
        }

        Reduction::new(SearchState {
            results: SearchResults::Loading,
            ..state
        })
        .then(SearchEvent::LoadArticles {
            page: PageNumber::FIRST,
        })
    }
}

pub struct ClearSearchReducer;

#[async_trait]
impl Reducer<SearchState, SearchEvent> for ClearSearchReducer {
    async fn reduce(&self, _state: SearchState, _event: SearchEvent) -> SearchReduction {
        Reduction::new(SearchState::default()).cancel_debounce(QUERY_DEBOUNCE)
    }
}

pub struct RefreshReducer;

#[async_trait]
impl Reducer<SearchState, SearchEvent> for RefreshReducer {
    async fn reduce(&self, state: SearchState, _event: SearchEvent) -> SearchReduction {
        if !state.has_query() {
            return Reduction::new(state);
        }
        Reduction::new(state).then(SearchEvent::LoadArticles {
            page: PageNumber::FIRST,
        })
    }
}

pub struct LoadMoreReducer;

#[async_trait]
impl Reducer<SearchState, SearchEvent> for LoadMoreReducer {
    async fn reduce(&self, state: SearchState, _event: SearchEvent) -> SearchReduction {
        let resume = match &state.results {
            SearchResults::Success { paging, .. } => paging.resumable_page(),
            _ => None,
        };
        match resume {
            Some(current_page) if state.has_query() => Reduction::new(state)
                .then(SearchEvent::SetPagingLoading)
                .then(SearchEvent::LoadArticles {
                    page: current_page.next(),
                }),
            _ => Reduction::new(state),
        }
    }
}

pub struct SetPagingLoadingReducer;

#[async_trait]
impl Reducer<SearchState, SearchEvent> for SetPagingLoadingReducer {
    async fn reduce(&self, mut state: SearchState, _event: SearchEvent) -> SearchReduction {
        if let SearchResults::Success { paging, .. } = &mut state.results {
            *paging = PagingState::Loading;
        }
        Reduction::new(state)
    }
}

pub struct LoadArticlesReducer {
    feed: Arc<dyn ArticleFeed>,
    page_size: u32,
}

impl LoadArticlesReducer {
    pub fn new(feed: Arc<dyn ArticleFeed>, page_size: u32) -> Self {
        Self { feed, page_size }
    }
}

#[async_trait]
impl Reducer<SearchState, SearchEvent> for LoadArticlesReducer {
    async fn reduce(&self, mut state: SearchState, event: SearchEvent) -> SearchReduction {
        let SearchEvent::LoadArticles { page } = event else {
            return Reduction::new(state);
        };
        if !state.has_query() {
            state.results = SearchResults::Idle;
            return Reduction::new(state);
        }

        let query = ArticleQuery::headlines(page, self.page_size).with_query(state.query.trim());
        let result = self.feed.fetch_page(query).await;

        state.results = apply_page(std::mem::take(&mut state.results), page, result);
        Reduction::new(state)
    }
}

fn apply_page(
    results: SearchResults,
    page: PageNumber,
    result: Result<Vec<Article>, FetchError>,
) -> SearchResults {
    let appending = page > PageNumber::FIRST;

    match (result, results) {
        (Ok(loaded), _) if !appending && loaded.is_empty() => SearchResults::Empty,
        (Ok(loaded), _) if !appending => SearchResults::Success {
            articles: loaded,
            paging: PagingState::Idle { current_page: page },
        },
        (Ok(loaded), SearchResults::Success { mut articles, .. }) => {
            let paging = PagingState::after_page(page, loaded.is_empty());
            articles.extend(loaded);
            SearchResults::Success { articles, paging }
        }
        // A late page for a list that is gone.
        (Ok(_), results) => results,
        (Err(error), SearchResults::Success { articles, .. }) if appending => {
            tracing::debug!(%page, %error, "Search append failed");
            SearchResults::Success {
                articles,
                paging: PagingState::failed(page, error.message_or(SEARCH_FAILED)),
            }
        }
        (Err(error), _) => SearchResults::Error(error.message_or(SEARCH_FAILED)),
    }
}
