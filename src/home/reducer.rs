//! Reducers for the home feed, one per event kind.

use std::sync::Arc;

use async_trait::async_trait;

use super::event::HomeEvent;
use super::state::{ArticlesState, HomeState, RefreshState, SourcesState};
use crate::error::FetchError;
use crate::mvi::{Reducer, Reduction};
use crate::news::{Article, ArticleFeed, ArticleQuery, SourceCatalog};
use crate::paging::{PageNumber, PagingState};

pub const LOAD_NEWS_FAILED: &str = "Failed to load news";
pub const LOAD_SOURCES_FAILED: &str = "Failed to load sources";

type HomeReduction = Reduction<HomeState, HomeEvent>;

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
impl Reducer<HomeState, HomeEvent> for LoadArticlesReducer {
    async fn reduce(&self, mut state: HomeState, event: HomeEvent) -> HomeReduction {
        let HomeEvent::LoadArticles { page } = event else {
            return Reduction::new(state);
        };

        let source_id = state.selected_source.as_ref().map(|source| source.id.clone());
        let query = ArticleQuery::headlines(page, self.page_size).with_source(source_id);
        let result = self.feed.fetch_page(query).await;

        state.articles = apply_page(std::mem::take(&mut state.articles), page, result);
        Reduction::new(state)
    }
}

/// Fold one page result into the article list.
fn apply_page(
    articles: ArticlesState,
    page: PageNumber,
    result: Result<Vec<Article>, FetchError>,
) -> ArticlesState {
    let appending = page > PageNumber::FIRST;

    match (result, articles) {
        (Ok(loaded), ArticlesState::Success { mut articles, .. }) if appending => {
            let paging = PagingState::after_page(page, loaded.is_empty());
            articles.extend(loaded);
            ArticlesState::Success { articles, paging }
        }
        (Ok(loaded), _) => ArticlesState::Success {
            paging: PagingState::after_page(page, loaded.is_empty()),
            articles: loaded,
        },
        (Err(error), ArticlesState::Success { articles, .. }) if appending => {
            tracing::debug!(%page, %error, "Append failed");
            ArticlesState::Success {
                articles,
                paging: PagingState::failed(page, error.message_or(LOAD_NEWS_FAILED)),
            }
        }
        (Err(error), _) => ArticlesState::Error(error.message_or(LOAD_NEWS_FAILED)),
    }
}

pub struct LoadSourcesReducer {
    catalog: Arc<dyn SourceCatalog>,
}

impl LoadSourcesReducer {
    pub fn new(catalog: Arc<dyn SourceCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Reducer<HomeState, HomeEvent> for LoadSourcesReducer {
    async fn reduce(&self, mut state: HomeState, _event: HomeEvent) -> HomeReduction {
        state.sources = match self.catalog.fetch_sources(None).await {
            Ok(sources) => SourcesState::Success(sources),
            Err(error) => SourcesState::Error(error.message_or(LOAD_SOURCES_FAILED)),
        };
        Reduction::new(state)
    }
}

pub struct SelectSourceReducer;

#[async_trait]
impl Reducer<HomeState, HomeEvent> for SelectSourceReducer {
    async fn reduce(&self, mut state: HomeState, event: HomeEvent) -> HomeReduction {
        let HomeEvent::SelectSource(source) = event else {
            return Reduction::new(state);
        };

        let current_id = state.selected_source.as_ref().map(|source| source.id.clone());
        let next = source.filter(|source| {
            state.sources.items().is_some() && current_id.as_deref() != Some(source.id.as_str())
        });
        let changed = next.as_ref().map(|source| &source.id) != current_id.as_ref();

        state.selected_source = next;
        let reduction = Reduction::new(state);
        if changed {
            reduction.then(HomeEvent::LoadArticles {
                page: PageNumber::FIRST,
            })
        } else {
            reduction
        }
    }
}

pub struct RefreshReducer;

#[async_trait]
impl Reducer<HomeState, HomeEvent> for RefreshReducer {
    async fn reduce(&self, state: HomeState, _event: HomeEvent) -> HomeReduction {
        Reduction::new(state)
            .then(HomeEvent::SetRefreshLoading(true))
            .then(HomeEvent::LoadArticles {
                page: PageNumber::FIRST,
            })
            .then(HomeEvent::SetRefreshLoading(false))
    }
}

pub struct LoadMoreReducer;

#[async_trait]
impl Reducer<HomeState, HomeEvent> for LoadMoreReducer {
    async fn reduce(&self, state: HomeState, _event: HomeEvent) -> HomeReduction {
        let resume = match &state.articles {
            ArticlesState::Success { paging, .. } => paging.resumable_page(),
            _ => None,
        };
        let Some(current_page) = resume else {
            return Reduction::new(state);
        };

        Reduction::new(state)
            .then(HomeEvent::SetPagingLoading)
            .then(HomeEvent::LoadArticles {
                page: current_page.next(),
            })
    }
}

pub struct SetPagingLoadingReducer;

#[async_trait]
impl Reducer<HomeState, HomeEvent> for SetPagingLoadingReducer {
    async fn reduce(&self, mut state: HomeState, _event: HomeEvent) -> HomeReduction {
        if let ArticlesState::Success { paging, .. } = &mut state.articles {
            *paging = PagingState::Loading;
        }
        Reduction::new(state)
    }
}

pub struct SetRefreshLoadingReducer;

#[async_trait]
impl Reducer<HomeState, HomeEvent> for SetRefreshLoadingReducer {
    async fn reduce(&self, mut state: HomeState, event: HomeEvent) -> HomeReduction {
        if let HomeEvent::SetRefreshLoading(refreshing) = event {
            state.refresh = if refreshing {
                RefreshState::Refreshing
            } else {
                RefreshState::Idle
            };
        }
        Reduction::new(state)
    }
}
