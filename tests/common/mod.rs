//! Shared test utilities and scripted collaborators.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use newsfeed::error::FetchError;
use newsfeed::news::{Article, ArticleFeed, ArticleQuery, ArticleSource, SourceCatalog, SourceItem};
use newsfeed::paging::{PageNumber, Pager, PagerOptions};

pub fn article(n: u32) -> Article {
    Article {
        source: ArticleSource {
            id: Some("wire".to_string()),
            name: "Wire".to_string(),
        },
        author: None,
        title: format!("Story {n}"),
        description: Some(format!("Body of story {n}")),
        url: format!("https://news.example.com/{n}"),
        url_to_image: None,
        published_at: "2024-05-01T08:00:00Z".to_string(),
        content: None,
    }
}

pub fn articles(range: std::ops::RangeInclusive<u32>) -> Vec<Article> {
    range.map(article).collect()
}

pub fn source(id: &str) -> SourceItem {
    SourceItem {
        id: id.to_string(),
        name: id.to_uppercase(),
        description: format!("{id} news"),
        url: format!("https://{id}.example.com"),
        category: "general".to_string(),
        language: "en".to_string(),
        country: "us".to_string(),
    }
}

/// An `ArticleFeed` that replays queued responses and records every query.
///
/// An exhausted script answers with an empty page. A gated feed holds each
/// fetch until `release` hands out a permit.
pub struct ScriptedFeed {
    responses: Mutex<VecDeque<Result<Vec<Article>, FetchError>>>,
    calls: Mutex<Vec<ArticleQuery>>,
    gate: Semaphore,
}

impl ScriptedFeed {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::with_permits(Semaphore::MAX_PERMITS))
    }

    pub fn gated() -> Arc<Self> {
        Arc::new(Self::with_permits(0))
    }

    fn with_permits(permits: usize) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: Semaphore::new(permits),
        }
    }

    pub fn push_ok(&self, items: Vec<Article>) {
        self.responses.lock().push_back(Ok(items));
    }

    pub fn push_err(&self, message: &str) {
        self.responses.lock().push_back(Err(FetchError::new(message)));
    }

    /// Let `count` held fetches through.
    pub fn release(&self, count: usize) {
        self.gate.add_permits(count);
    }

    pub fn calls(&self) -> Vec<ArticleQuery> {
        self.calls.lock().clone()
    }

    pub fn pages(&self) -> Vec<u32> {
        self.calls.lock().iter().map(|query| query.page.get()).collect()
    }
}

#[async_trait]
impl ArticleFeed for ScriptedFeed {
    async fn fetch_page(&self, query: ArticleQuery) -> Result<Vec<Article>, FetchError> {
        self.calls.lock().push(query);
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        self.responses.lock().pop_front().unwrap_or(Ok(Vec::new()))
    }
}

pub struct StaticCatalog {
    result: Result<Vec<SourceItem>, FetchError>,
}

impl StaticCatalog {
    pub fn with(sources: Vec<SourceItem>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(sources),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(FetchError::new(message)),
        })
    }
}

#[async_trait]
impl SourceCatalog for StaticCatalog {
    async fn fetch_sources(&self, _category: Option<&str>) -> Result<Vec<SourceItem>, FetchError> {
        self.result.clone()
    }
}

/// A pager over `feed` requesting pages of 20 headlines.
pub fn pager_over(feed: &Arc<ScriptedFeed>, options: PagerOptions) -> Pager<Article> {
    let feed = Arc::clone(feed);
    Pager::new(
        move |page: PageNumber| {
            let feed = Arc::clone(&feed);
            async move { feed.fetch_page(ArticleQuery::headlines(page, 20)).await }
        },
        options,
    )
}

/// Let spawned tasks run until they block.
pub async fn drain_tasks() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
