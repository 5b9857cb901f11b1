//! Keyed, cancellable deferred actions.
//!
//! Scheduling under a key that already has a pending timer cancels the old
//! one, so only the last action inside a quiet window runs.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::session::SessionHandle;

pub struct Debouncer<K> {
    session: SessionHandle,
    timers: Mutex<HashMap<K, JoinHandle<Option<()>>>>,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new(session: SessionHandle) -> Self {
        Self {
            session,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Run `action` after `delay` unless rescheduled or cancelled first.
    pub fn schedule<F>(&self, key: K, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let timer = self.session.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });

        let mut timers = self.timers.lock();
        timers.retain(|_, pending| !pending.is_finished());
        if let Some(previous) = timers.insert(key, timer) {
            previous.abort();
        }
    }

    pub fn cancel(&self, key: &K) {
        if let Some(pending) = self.timers.lock().remove(key) {
            pending.abort();
        }
    }

    pub fn cancel_all(&self) {
        for (_, pending) in self.timers.lock().drain() {
            pending.abort();
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.timers
            .lock()
            .get(key)
            .is_some_and(|pending| !pending.is_finished())
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        for (_, pending) in self.timers.get_mut().drain() {
            pending.abort();
        }
    }
}
