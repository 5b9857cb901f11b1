//! Offline news data loaded from a JSON file.
//!
//! ```json
//! { "sources": [ ... ], "articles": [ ... ] }
//! ```
//!
//! Articles use the upstream field names (`urlToImage`, `publishedAt`).

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FetchError;
use crate::news::{Article, ArticleFeed, ArticleQuery, SourceCatalog, SourceItem};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse fixture: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureStore {
    #[serde(default)]
    pub sources: Vec<SourceItem>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl FixtureStore {
    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let content = fs::read_to_string(path).map_err(|e| FixtureError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let store: FixtureStore = serde_json::from_str(json)?;
        tracing::debug!(
            sources = store.sources.len(),
            articles = store.articles.len(),
            "Fixture loaded"
        );
        Ok(store)
    }

    fn matching<'a>(&'a self, query: &'a ArticleQuery) -> impl Iterator<Item = &'a Article> + 'a {
        self.articles.iter().filter(move |article| {
            let source_matches = query
                .source_id
                .as_deref()
                .map_or(true, |id| article.source.id.as_deref() == Some(id));
            let text_matches = query
                .query
                .as_deref()
                .map_or(true, |needle| article.mentions(needle));
            source_matches && text_matches
        })
    }
}

#[async_trait]
impl ArticleFeed for FixtureStore {
    async fn fetch_page(&self, query: ArticleQuery) -> Result<Vec<Article>, FetchError> {
        if query.page_size == 0 {
            return Err(FetchError::new("pageSize must be at least 1"));
        }
        let size = query.page_size as usize;
        let skip = (query.page.get() as usize - 1).saturating_mul(size);

        Ok(self.matching(&query).skip(skip).take(size).cloned().collect())
    }
}

#[async_trait]
impl SourceCatalog for FixtureStore {
    async fn fetch_sources(&self, category: Option<&str>) -> Result<Vec<SourceItem>, FetchError> {
        Ok(self
            .sources
            .iter()
            .filter(|source| category.map_or(true, |category| source.category == category))
            .cloned()
            .collect())
    }
}
