//! TOML configuration for pagination, search and dispatch.

mod loader;
mod types;

pub use loader::{ConfigError, MAX_PAGE_SIZE};
pub use types::{Config, DispatchConfig, PagingConfig, SearchConfig};
