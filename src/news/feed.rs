//! Contracts the core consumes from the data-access layer.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::news::{Article, SourceItem};
use crate::paging::PageNumber;

/// Arguments of one page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub query: Option<String>,
    pub source_id: Option<String>,
    pub page_size: u32,
    pub page: PageNumber,
}

impl ArticleQuery {
    pub fn headlines(page: PageNumber, page_size: u32) -> Self {
        Self {
            query: None,
            source_id: None,
            page_size,
            page,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_source(mut self, source_id: Option<String>) -> Self {
        self.source_id = source_id;
        self
    }
}

/// Fetches pages of articles.
#[async_trait]
pub trait ArticleFeed: Send + Sync {
    async fn fetch_page(&self, query: ArticleQuery) -> Result<Vec<Article>, FetchError>;
}

/// Lists the outlets a reader can filter by.
#[async_trait]
pub trait SourceCatalog: Send + Sync {
    async fn fetch_sources(&self, category: Option<&str>) -> Result<Vec<SourceItem>, FetchError>;
}
