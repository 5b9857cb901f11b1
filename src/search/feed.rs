//! Search built on a `Pager` instead of the state machine.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::reducer::QUERY_DEBOUNCE;
use crate::mvi::Debouncer;
use crate::news::{Article, ArticleFeed, ArticleQuery};
use crate::paging::{PageNumber, PageRequest, Pager, PagerOptions, SnapshotSubscription};
use crate::session::SessionScope;

pub struct SearchFeed {
    pager: Pager<Article>,
    /// The query the pager is currently showing, after debouncing.
    query: Arc<Mutex<String>>,
    debouncer: Debouncer<&'static str>,
    debounce: Duration,
    session: SessionScope,
}

impl SearchFeed {
    pub fn new(
        feed: Arc<dyn ArticleFeed>,
        page_size: u32,
        debounce: Duration,
        options: PagerOptions,
    ) -> Self {
        let query = Arc::new(Mutex::new(String::new()));

        let loader = {
            let query = Arc::clone(&query);
            move |page: PageNumber| {
                let feed = Arc::clone(&feed);
                let text = query.lock().trim().to_string();
                async move {
                    if text.is_empty() {
                        return Ok(Vec::new());
                    }
                    let query = ArticleQuery::headlines(page, page_size).with_query(text);
                    feed.fetch_page(query).await
                }
            }
        };

        let session = SessionScope::new();
        Self {
            pager: Pager::new(loader, options),
            query,
            debouncer: Debouncer::new(session.handle()),
            debounce,
            session,
        }
    }

    pub fn subscribe(&self) -> SnapshotSubscription<Article> {
        self.pager.subscribe()
    }

    pub fn query(&self) -> String {
        self.query.lock().clone()
    }

    /// Search for `text` once typing has been quiet for the debounce window.
    /// Only the last text inside the window is searched.
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        let query = Arc::clone(&self.query);
        let pager = self.pager.clone();

        self.debouncer
            .schedule(QUERY_DEBOUNCE, self.debounce, move || {
                {
                    let mut current = query.lock();
                    if *current == text {
                        return;
                    }
                    *current = text;
                }
                tracing::debug!("Search query settled");
                let _ = pager.refresh();
            });
    }

    /// Search for `text` right away, dropping any pending debounced query.
    pub fn submit(&self, text: impl Into<String>) -> PageRequest {
        self.debouncer.cancel(&QUERY_DEBOUNCE);
        *self.query.lock() = text.into();
        self.pager.refresh()
    }

    /// Drop the query and any pending search.
    pub fn clear(&self) -> PageRequest {
        self.debouncer.cancel(&QUERY_DEBOUNCE);
        self.query.lock().clear();
        self.pager.refresh()
    }

    /// Next page of results. Nothing to page through without a query.
    pub fn load_more(&self) -> PageRequest {
        if self.query.lock().trim().is_empty() {
            return PageRequest::skipped();
        }
        self.pager.load_more()
    }

    pub fn refresh(&self) -> PageRequest {
        self.pager.refresh()
    }

    pub fn retry(&self) -> PageRequest {
        self.pager.retry()
    }

    pub fn close(&self) {
        self.debouncer.cancel_all();
        self.session.close();
        self.pager.close();
    }
}
