//! Paging progress as rendered by the feature states.

use super::page::PageNumber;

/// Paging progress of a list that already shows items.
#[derive(Debug, Clone, PartialEq)]
pub enum PagingState {
    /// `current_page` is the last page that loaded.
    Idle { current_page: PageNumber },
    Loading,
    /// The last append failed; the list is intact and `current_page` is
    /// still the last page that loaded.
    Error {
        message: String,
        current_page: PageNumber,
    },
    EndReached,
}

impl PagingState {
    /// The page to resume from, when another page may be requested.
    pub fn resumable_page(&self) -> Option<PageNumber> {
        match self {
            Self::Idle { current_page } | Self::Error { current_page, .. } => Some(*current_page),
            Self::Loading | Self::EndReached => None,
        }
    }

    /// `EndReached` for an empty page, otherwise `Idle` at `page`.
    pub fn after_page(page: PageNumber, was_empty: bool) -> Self {
        if was_empty {
            Self::EndReached
        } else {
            Self::Idle { current_page: page }
        }
    }

    /// Error state for a failed fetch of `page` (which must be past the first).
    pub fn failed(page: PageNumber, message: String) -> Self {
        let current_page = PageNumber::try_from(page.get().saturating_sub(1)).unwrap_or(page);
        Self::Error {
            message,
            current_page,
        }
    }
}
