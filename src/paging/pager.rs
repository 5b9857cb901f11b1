//! Incremental pagination controller.
//!
//! A `Pager` owns one `PageSnapshot` and serialises every fetch behind an
//! async mutex, so at most one fetch-and-merge cycle runs at a time. Requests
//! issued while another is in flight queue behind the lock.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::page::{DataState, PageNumber, PageSnapshot, PageState};
use crate::error::FetchError;
use crate::session::SessionScope;

pub type PageFuture<T> = Pin<Box<dyn Future<Output = Result<Vec<T>, FetchError>> + Send>>;

/// Loads one page of items.
pub trait PageLoader<T>: Send + Sync {
    fn load(&self, page: PageNumber) -> PageFuture<T>;
}

impl<T, F, Fut> PageLoader<T> for F
where
    F: Fn(PageNumber) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<T>, FetchError>> + Send + 'static,
{
    fn load(&self, page: PageNumber) -> PageFuture<T> {
        Box::pin(self(page))
    }
}

#[derive(Debug, Clone)]
pub struct PagerOptions {
    pub first_page: PageNumber,
    /// How long the pager keeps its data after the last subscriber leaves.
    pub teardown_grace: Duration,
}

impl Default for PagerOptions {
    fn default() -> Self {
        Self {
            first_page: PageNumber::FIRST,
            teardown_grace: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Reset,
    Append,
}

/// Handle to a page request. Skipped requests never touched the snapshot.
#[must_use = "a PageRequest can be awaited with `finished`"]
pub struct PageRequest {
    task: Option<JoinHandle<Option<()>>>,
}

impl PageRequest {
    pub(crate) fn skipped() -> Self {
        Self { task: None }
    }

    pub fn is_skipped(&self) -> bool {
        self.task.is_none()
    }

    /// Wait until the request has been applied or cancelled.
    pub async fn finished(self) {
        if let Some(task) = self.task {
            let _ = task.await;
        }
    }
}

pub struct Pager<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Pager<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T> {
    loader: Box<dyn PageLoader<T>>,
    options: PagerOptions,
    snapshot: watch::Sender<PageSnapshot<T>>,
    fetch_lock: tokio::sync::Mutex<()>,
    append_pending: AtomicBool,
    run: Mutex<SessionScope>,
    lifecycle: Mutex<Lifecycle>,
    closed: AtomicBool,
}

#[derive(Default)]
struct Lifecycle {
    subscribers: usize,
    started: bool,
    teardown: Option<JoinHandle<()>>,
}

impl<T> Pager<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(loader: impl PageLoader<T> + 'static, options: PagerOptions) -> Self {
        let (snapshot, _) = watch::channel(PageSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                loader: Box::new(loader),
                options,
                snapshot,
                fetch_lock: tokio::sync::Mutex::new(()),
                append_pending: AtomicBool::new(false),
                run: Mutex::new(SessionScope::new()),
                lifecycle: Mutex::new(Lifecycle::default()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Fetch the first page and replace every item with it.
    pub fn refresh(&self) -> PageRequest {
        self.request(RequestKind::Reset)
    }

    /// Same as `refresh`.
    pub fn retry(&self) -> PageRequest {
        self.refresh()
    }

    /// Fetch the page after `current_page` and append it.
    ///
    /// Skipped unless the page state is `Idle`, and while another append is
    /// still pending.
    pub fn load_more(&self) -> PageRequest {
        let page_state = self.inner.snapshot.borrow().page_state;
        if page_state != PageState::Idle {
            tracing::debug!(?page_state, "load_more skipped");
            return PageRequest::skipped();
        }
        if self.inner.append_pending.swap(true, Ordering::SeqCst) {
            tracing::debug!("load_more skipped, append already pending");
            return PageRequest::skipped();
        }
        let request = self.request(RequestKind::Append);
        if request.is_skipped() {
            self.inner.append_pending.store(false, Ordering::SeqCst);
        }
        request
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> PageSnapshot<T> {
        self.inner.snapshot.borrow().clone()
    }

    /// Observe snapshots. The first subscriber triggers the initial refresh;
    /// once the last one leaves, the pager resets after the teardown grace
    /// period and the next subscriber starts fresh.
    pub fn subscribe(&self) -> SnapshotSubscription<T> {
        let first = {
            let mut lifecycle = self.inner.lifecycle.lock();
            lifecycle.subscribers += 1;
            if let Some(teardown) = lifecycle.teardown.take() {
                teardown.abort();
            }
            !std::mem::replace(&mut lifecycle.started, true)
        };

        let receiver = self.inner.snapshot.subscribe();
        if first {
            tracing::debug!("First subscriber, starting pager");
            let _ = self.refresh();
        }

        SnapshotSubscription {
            receiver,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Cancel in-flight work and refuse further requests.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            self.inner.run.lock().close();
            tracing::debug!("Pager closed");
        }
    }

    fn request(&self, kind: RequestKind) -> PageRequest {
        if self.inner.closed.load(Ordering::SeqCst) {
            return PageRequest::skipped();
        }
        let session = self.inner.run.lock().handle();
        let inner = Arc::clone(&self.inner);
        PageRequest {
            task: Some(session.spawn(async move { inner.execute(kind).await })),
        }
    }
}

impl<T> Inner<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn execute(&self, kind: RequestKind) {
        let _append = (kind == RequestKind::Append).then(|| AppendGuard(&self.append_pending));
        let _lock = self.fetch_lock.lock().await;

        let before = self.snapshot.borrow().clone();
        let (page, reset) = match kind {
            RequestKind::Reset => (self.options.first_page, true),
            RequestKind::Append => {
                // A refresh queued ahead of us may have reached the end.
                if before.page_state != PageState::Idle {
                    return;
                }
                let page = before
                    .current_page
                    .map_or(self.options.first_page, PageNumber::next);
                (page, false)
            }
        };
        let has_previous_data = matches!(before.data_state, DataState::Success(_));

        tracing::debug!(%page, reset, "Requesting page");
        self.snapshot
            .send_replace(loading_snapshot(&before, has_previous_data, reset));

        let next = match self.loader.load(page).await {
            Ok(items) => loaded_snapshot(before, items, page, reset),
            Err(error) => {
                tracing::debug!(%page, %error, "Page request failed");
                failed_snapshot(before, has_previous_data, &error)
            }
        };
        self.snapshot.send_replace(next);
    }

    async fn teardown(&self, previous: SessionScope) {
        previous.close();
        let _lock = self.fetch_lock.lock().await;
        // A subscriber that arrived meanwhile owns the snapshot now.
        if self.lifecycle.lock().started {
            return;
        }
        self.append_pending.store(false, Ordering::SeqCst);
        self.snapshot.send_replace(PageSnapshot::default());
        tracing::debug!("Pager torn down after last subscriber left");
    }
}

struct AppendGuard<'a>(&'a AtomicBool);

impl Drop for AppendGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn loading_snapshot<T: Clone>(
    before: &PageSnapshot<T>,
    has_previous_data: bool,
    reset: bool,
) -> PageSnapshot<T> {
    if has_previous_data && !reset {
        PageSnapshot {
            page_state: PageState::Loading,
            ..before.clone()
        }
    } else {
        PageSnapshot {
            current_page: before.current_page,
            page_state: PageState::Idle,
            data_state: DataState::Loading,
        }
    }
}

fn loaded_snapshot<T>(
    before: PageSnapshot<T>,
    new_items: Vec<T>,
    page: PageNumber,
    reset: bool,
) -> PageSnapshot<T> {
    let reached_end = new_items.is_empty();
    let items = if reset {
        new_items
    } else {
        let mut items = match before.data_state {
            DataState::Success(items) => items,
            _ => Vec::new(),
        };
        items.extend(new_items);
        items
    };

    let current_page = if reached_end && !reset {
        before.current_page
    } else {
        Some(page)
    };

    PageSnapshot {
        current_page,
        page_state: if reached_end {
            PageState::EndReached
        } else {
            PageState::Idle
        },
        data_state: DataState::Success(items),
    }
}

fn failed_snapshot<T>(
    before: PageSnapshot<T>,
    has_previous_data: bool,
    error: &FetchError,
) -> PageSnapshot<T> {
    if has_previous_data {
        PageSnapshot {
            page_state: PageState::Idle,
            ..before
        }
    } else {
        PageSnapshot {
            current_page: before.current_page,
            page_state: PageState::Idle,
            data_state: DataState::Error(error.message_or("Paging failed")),
        }
    }
}

/// A live view of a pager's snapshots.
///
/// Dropping the last subscription schedules the pager's teardown.
pub struct SnapshotSubscription<T: Clone + Send + Sync + 'static> {
    receiver: watch::Receiver<PageSnapshot<T>>,
    inner: Arc<Inner<T>>,
}

impl<T> SnapshotSubscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn current(&self) -> PageSnapshot<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next snapshot. Intermediate values may be coalesced.
    pub async fn changed(&mut self) -> Option<PageSnapshot<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until a snapshot satisfies `predicate`.
    pub async fn wait_for(
        &mut self,
        predicate: impl FnMut(&PageSnapshot<T>) -> bool,
    ) -> Option<PageSnapshot<T>> {
        self.receiver
            .wait_for(predicate)
            .await
            .ok()
            .map(|snapshot| snapshot.clone())
    }
}

impl<T> Drop for SnapshotSubscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        let mut lifecycle = self.inner.lifecycle.lock();
        lifecycle.subscribers = lifecycle.subscribers.saturating_sub(1);
        if lifecycle.subscribers > 0 || !lifecycle.started {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            // No timer to wait on, tear down right away.
            lifecycle.started = false;
            let previous = std::mem::take(&mut *self.inner.run.lock());
            previous.close();
            self.inner.append_pending.store(false, Ordering::SeqCst);
            self.inner.snapshot.send_replace(PageSnapshot::default());
            tracing::debug!("Pager torn down outside a runtime");
            return;
        };

        let inner = Arc::clone(&self.inner);
        let grace = self.inner.options.teardown_grace;
        lifecycle.teardown = Some(runtime.spawn(async move {
            tokio::time::sleep(grace).await;
            let previous = {
                let mut lifecycle = inner.lifecycle.lock();
                if lifecycle.subscribers > 0 {
                    return;
                }
                lifecycle.started = false;
                lifecycle.teardown = None;
                std::mem::take(&mut *inner.run.lock())
            };
            inner.teardown(previous).await;
        }));
    }
}
