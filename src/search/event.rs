//! Events for article search.

use strum_macros::{EnumDiscriminants, EnumIter};

use crate::mvi::Event;
use crate::paging::PageNumber;

#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(SearchEventKind), derive(Hash, EnumIter))]
pub enum SearchEvent {
    /// The search box text changed.
    QueryChanged(String),

    /// Run the search for the current query. Fired once typing settles.
    PerformSearch,

    ClearSearch,

    /// Reload the first page, keeping the list visible meanwhile.
    Refresh,

    LoadMore,

    /// Internal: an append is about to start.
    SetPagingLoading,

    /// Internal: fetch `page` for the current query.
    LoadArticles { page: PageNumber },
}

impl Event for SearchEvent {
    type Kind = SearchEventKind;

    fn kind(&self) -> SearchEventKind {
        self.into()
    }
}
