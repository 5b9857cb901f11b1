//! Value types describing where a paged list is and what it holds.

use std::fmt;
use std::num::NonZeroU32;

use thiserror::Error;

/// A 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageNumber(NonZeroU32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("page number must be >= 1, got {0}")]
pub struct InvalidPageNumber(pub u32);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(NonZeroU32::MIN);

    /// Panics when `value` is 0. Use `PageNumber::try_from` for untrusted input.
    pub fn new(value: u32) -> Self {
        match NonZeroU32::new(value) {
            Some(value) => Self(value),
            None => panic!("PageNumber must be >= 1"),
        }
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl TryFrom<u32> for PageNumber {
    type Error = InvalidPageNumber;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        NonZeroU32::new(value)
            .map(Self)
            .ok_or(InvalidPageNumber(value))
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether another page can be requested right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageState {
    #[default]
    Idle,
    Loading,
    EndReached,
}

impl PageState {
    pub fn is_loading(self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// The displayable content of a paged list.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DataState<T> {
    #[default]
    Loading,
    Success(Vec<T>),
    Error(String),
}

impl<T> DataState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn items(&self) -> Option<&[T]> {
        match self {
            Self::Success(items) => Some(items),
            _ => None,
        }
    }
}

/// Everything the UI needs to render a paged list at one instant.
///
/// `current_page` stays `None` until a page loads successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot<T> {
    pub current_page: Option<PageNumber>,
    pub page_state: PageState,
    pub data_state: DataState<T>,
}

impl<T> Default for PageSnapshot<T> {
    fn default() -> Self {
        Self {
            current_page: None,
            page_state: PageState::Idle,
            data_state: DataState::Loading,
        }
    }
}

impl<T> PageSnapshot<T> {
    /// True when a `load_more` issued now would be accepted.
    pub fn can_load_more(&self) -> bool {
        !matches!(self.page_state, PageState::Loading | PageState::EndReached)
    }

    pub fn items(&self) -> &[T] {
        self.data_state.items().unwrap_or(&[])
    }
}
