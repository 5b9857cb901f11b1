//! News reader core: an incremental pager and an event-driven state machine,
//! with home feed and search features built on both.

pub mod config;
pub mod error;
pub mod fixture;
pub mod home;
pub mod logging;
pub mod mvi;
pub mod news;
pub mod paging;
pub mod search;
pub mod session;
