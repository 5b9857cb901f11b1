//! State for the home feed.

use crate::mvi::State;
use crate::news::{Article, SourceItem};
use crate::paging::PagingState;

/// Everything the home screen renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeState {
    /// Outlet the article list is filtered by, if any.
    pub selected_source: Option<SourceItem>,
    pub sources: SourcesState,
    pub articles: ArticlesState,
    pub refresh: RefreshState,
}

impl State for HomeState {
    type Shape = ();

    fn shape(&self) {}
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SourcesState {
    #[default]
    Loading,
    Success(Vec<SourceItem>),
    Error(String),
}

impl SourcesState {
    pub fn items(&self) -> Option<&[SourceItem]> {
        match self {
            Self::Success(sources) => Some(sources),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ArticlesState {
    #[default]
    Loading,
    Success {
        articles: Vec<Article>,
        paging: PagingState,
    },
    Error(String),
}

impl ArticlesState {
    pub fn is_loading_more(&self) -> bool {
        matches!(
            self,
            Self::Success {
                paging: PagingState::Loading,
                ..
            }
        )
    }

    pub fn can_load_more(&self) -> bool {
        match self {
            Self::Success { paging, .. } => paging.resumable_page().is_some(),
            _ => false,
        }
    }

    pub fn articles(&self) -> &[Article] {
        match self {
            Self::Success { articles, .. } => articles,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    Refreshing,
}
