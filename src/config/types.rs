use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::mvi::UnmatchedPolicy;
use crate::paging::{PageNumber, PagerOptions};

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paging: PagingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Pagination settings shared by every feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Items requested per page (default: 20).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Page requested by a refresh (default: 1).
    #[serde(default = "default_first_page")]
    pub first_page: u32,
    /// How long a pager keeps its data after its last observer leaves (default: 5000).
    #[serde(default = "default_teardown_grace_ms")]
    pub teardown_grace_ms: u64,
}

/// Search box behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before searching (default: 500).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// State machine runtime settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// What to do with events that have no reducer: "ignore", "log" or "panic".
    #[serde(default)]
    pub unmatched: UnmatchedPolicy,
}

fn default_page_size() -> u32 {
    20
}

fn default_first_page() -> u32 {
    1
}

fn default_teardown_grace_ms() -> u64 {
    5000
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            first_page: default_first_page(),
            teardown_grace_ms: default_teardown_grace_ms(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl PagingConfig {
    /// Pager options derived from this section. Call after `Config::validate`.
    pub fn pager_options(&self) -> PagerOptions {
        PagerOptions {
            first_page: PageNumber::try_from(self.first_page).unwrap_or(PageNumber::FIRST),
            teardown_grace: Duration::from_millis(self.teardown_grace_ms),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
