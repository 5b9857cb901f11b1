//! Page-by-page loading turned into one consistent list snapshot.

mod page;
mod pager;
mod progress;

pub use page::{DataState, InvalidPageNumber, PageNumber, PageSnapshot, PageState};
pub use pager::{
    PageFuture, PageLoader, PageRequest, Pager, PagerOptions, SnapshotSubscription,
};
pub use progress::PagingState;
