//! State for article search.

use crate::paging::PagingState;
use crate::mvi::State;
use crate::news::Article;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchState {
    /// Text as typed, untrimmed.
    pub query: String,
    pub results: SearchResults,
}

impl SearchState {
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }
}

impl State for SearchState {
    type Shape = ();

    fn shape(&self) {}
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchResults {
    /// No search has been run for the current query.
    #[default]
    Idle,
    Loading,
    Success {
        articles: Vec<Article>,
        paging: PagingState,
    },
    /// The first page came back empty.
    Empty,
    Error(String),
}

impl SearchResults {
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
