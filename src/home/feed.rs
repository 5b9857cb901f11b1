//! Home feed built on a `Pager` instead of the state machine.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use super::reducer::LOAD_SOURCES_FAILED;
use super::state::{RefreshState, SourcesState};
use crate::news::{Article, ArticleFeed, ArticleQuery, SourceCatalog, SourceItem};
use crate::paging::{PageNumber, PageRequest, Pager, PagerOptions, SnapshotSubscription};
use crate::session::SessionScope;

pub struct HomeFeed {
    pager: Pager<Article>,
    selected: Arc<Mutex<Option<SourceItem>>>,
    catalog: Arc<dyn SourceCatalog>,
    sources: Arc<watch::Sender<SourcesState>>,
    refresh: watch::Sender<RefreshState>,
    refreshes: AtomicUsize,
    sources_requested: AtomicBool,
    session: SessionScope,
}

impl HomeFeed {
    pub fn new(
        feed: Arc<dyn ArticleFeed>,
        catalog: Arc<dyn SourceCatalog>,
        page_size: u32,
        options: PagerOptions,
    ) -> Self {
        let selected: Arc<Mutex<Option<SourceItem>>> = Arc::new(Mutex::new(None));

        let loader = {
            let selected = Arc::clone(&selected);
            move |page: PageNumber| {
                let feed = Arc::clone(&feed);
                let source_id = selected.lock().as_ref().map(|source| source.id.clone());
                let query = ArticleQuery::headlines(page, page_size).with_source(source_id);
                async move { feed.fetch_page(query).await }
            }
        };

        Self {
            pager: Pager::new(loader, options),
            selected,
            catalog,
            sources: Arc::new(watch::channel(SourcesState::Loading).0),
            refresh: watch::channel(RefreshState::Idle).0,
            refreshes: AtomicUsize::new(0),
            sources_requested: AtomicBool::new(false),
            session: SessionScope::new(),
        }
    }

    /// Observe the article list. The first subscriber also loads sources.
    pub fn subscribe(&self) -> SnapshotSubscription<Article> {
        if !self.sources_requested.swap(true, Ordering::SeqCst) {
            let catalog = Arc::clone(&self.catalog);
            let sources = Arc::clone(&self.sources);
            self.session
                .handle()
                .spawn(async move { load_sources(catalog.as_ref(), &sources).await });
        }
        self.pager.subscribe()
    }

    pub fn sources(&self) -> watch::Receiver<SourcesState> {
        self.sources.subscribe()
    }

    pub fn refresh_state(&self) -> watch::Receiver<RefreshState> {
        self.refresh.subscribe()
    }

    pub fn selected_source(&self) -> Option<SourceItem> {
        self.selected.lock().clone()
    }

    /// Toggle the source filter and reload from the first page.
    pub fn select_source(&self, source: Option<SourceItem>) -> PageRequest {
        {
            let mut selected = self.selected.lock();
            let same = matches!(
                (selected.as_ref(), source.as_ref()),
                (Some(current), Some(next)) if current.id == next.id
            );
            *selected = if same { None } else { source };
            tracing::debug!(source = ?selected.as_ref().map(|source| &source.id), "Source selected");
        }
        self.pager.retry()
    }

    /// Reload sources and the first page. The refresh state stays
    /// `Refreshing` until every overlapping refresh has finished.
    pub async fn refresh(&self) {
        let _in_flight = RefreshGuard::enter(&self.refreshes, &self.refresh);
        let request = self.pager.refresh();
        load_sources(self.catalog.as_ref(), &self.sources).await;
        request.finished().await;
    }

    pub fn load_more(&self) -> PageRequest {
        self.pager.load_more()
    }

    pub fn retry(&self) -> PageRequest {
        self.pager.retry()
    }

    pub fn close(&self) {
        self.session.close();
        self.pager.close();
    }
}

struct RefreshGuard<'a> {
    count: &'a AtomicUsize,
    state: &'a watch::Sender<RefreshState>,
}

impl<'a> RefreshGuard<'a> {
    fn enter(count: &'a AtomicUsize, state: &'a watch::Sender<RefreshState>) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        state.send_replace(RefreshState::Refreshing);
        Self { count, state }
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.state.send_replace(RefreshState::Idle);
        }
    }
}

async fn load_sources(catalog: &dyn SourceCatalog, sources: &watch::Sender<SourcesState>) {
    let next = match catalog.fetch_sources(None).await {
        Ok(items) => SourcesState::Success(items),
        Err(error) => {
            tracing::debug!(%error, "Loading sources failed");
            SourcesState::Error(error.message_or(LOAD_SOURCES_FAILED))
        }
    };
    sources.send_replace(next);
}
