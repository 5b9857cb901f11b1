//! Owned cancellation context for one screen session.
//!
//! A `SessionScope` is created by whoever owns a screen (a pager, a state
//! machine, a feature). Work spawned through its handles is cancelled when
//! the scope is closed or dropped, so nothing commits after teardown.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub struct SessionScope {
    handle: SessionHandle,
}

impl SessionScope {
    pub fn new() -> Self {
        Self {
            handle: SessionHandle {
                closed: Arc::new(AtomicBool::new(false)),
                notify: Arc::new(Notify::new()),
            },
        }
    }

    /// Close the session, cancelling everything spawned through its handles.
    pub fn close(&self) {
        if !self.handle.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("Session scope closed");
            self.handle.notify.notify_waiters();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Create a handle for sharing with spawned work.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }
}

impl Default for SessionScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionScope {
    fn drop(&mut self) {
        self.close();
    }
}

/// Lightweight handle for observing a session and spawning work inside it.
#[derive(Clone)]
pub struct SessionHandle {
    closed: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl SessionHandle {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Resolves once the owning scope is closed.
    pub async fn closed(&self) {
        // Register with Notify before checking the flag, otherwise a close()
        // landing between the check and the await would be lost.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_closed() {
            return;
        }
        notified.await;
    }

    /// Spawn `future` so that it is dropped as soon as the session closes.
    ///
    /// The task yields `None` when it was cancelled.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let session = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = session.closed() => None,
                output = future => Some(output),
            }
        })
    }
}
