//! Events for the home feed.

use strum_macros::{EnumDiscriminants, EnumIter};

use crate::mvi::Event;
use crate::news::SourceItem;
use crate::paging::PageNumber;

#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(HomeEventKind), derive(Hash, EnumIter))]
pub enum HomeEvent {
    /// Fetch `page` for the selected source.
    LoadArticles { page: PageNumber },

    LoadSources,

    /// Toggle the source filter. Selecting the current source clears it.
    SelectSource(Option<SourceItem>),

    /// Pull to refresh.
    Refresh,

    /// Scrolled to the end of the list.
    LoadMore,

    /// Internal: an append is about to start.
    SetPagingLoading,

    /// Internal: refresh indicator on/off.
    SetRefreshLoading(bool),
}

impl Event for HomeEvent {
    type Kind = HomeEventKind;

    fn kind(&self) -> HomeEventKind {
        self.into()
    }
}
