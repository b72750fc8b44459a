// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network monitor.
//!
//! [`NetworkMonitor`] is the single source of truth for "can this client
//! reach the network". It caches the last signal from a
//! [`ConnectivitySource`] and fans transitions out to subscribers.
//!
//! The signal is a heuristic: being online does not guarantee the remote API
//! is reachable, so writers and the sync engine still handle per-request
//! failures.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Callback invoked with the new connectivity state.
pub type ConnectivityListener = Arc<dyn Fn(bool) + Send + Sync>;

/// Platform connectivity signal.
pub trait ConnectivitySource: Send + Sync {
    /// Current connectivity according to the platform.
    fn is_online(&self) -> bool;

    /// Registers a listener called on every online/offline signal.
    fn listen(&self, listener: ConnectivityListener);
}

type Subscriber = (u64, ConnectivityListener);

struct MonitorInner {
    online: AtomicBool,
    next_id: AtomicU64,
    /// Subscription order.
    subscribers: Mutex<Vec<Subscriber>>,
}

impl MonitorInner {
    fn handle_signal(&self, online: bool) {
        let previous = self.online.swap(online, Ordering::AcqRel);
        if previous == online {
            return;
        }

        if online {
            tracing::info!("network: back online");
        } else {
            tracing::warn!("network: offline");
        }

        // Snapshot so callbacks may subscribe or unsubscribe without deadlocking.
        let subscribers: Vec<ConnectivityListener> = self
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in subscribers {
            callback(online);
        }
    }

    fn remove(&self, id: u64) {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(sub_id, _)| *sub_id != id);
    }
}

/// Cached connectivity state with subscriber fan-out.
///
/// Cloning yields another handle to the same monitor.
#[derive(Clone)]
pub struct NetworkMonitor {
    inner: Arc<MonitorInner>,
    _source: Arc<dyn ConnectivitySource>,
}

impl NetworkMonitor {
    /// Creates a monitor and attaches its single listener to `source`.
    pub fn new(source: Arc<dyn ConnectivitySource>) -> Self {
        let inner = Arc::new(MonitorInner {
            online: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
            subscribers: Mutex::new(Vec::new()),
        });

        let weak: Weak<MonitorInner> = Arc::downgrade(&inner);
        source.listen(Arc::new(move |online| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_signal(online);
            }
        }));
        // Read after listening so a signal sent during registration is not lost.
        inner.online.store(source.is_online(), Ordering::Release);

        NetworkMonitor {
            inner,
            _source: source,
        }
    }

    /// Last known connectivity state.
    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::Acquire)
    }

    /// Registers `callback` for every online/offline transition.
    ///
    /// Callbacks run synchronously on the signalling thread, in subscription
    /// order. Dropping the returned [`Subscription`] unregisters the callback.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(callback)));

        Subscription {
            id,
            monitor: Arc::downgrade(&self.inner),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl std::fmt::Debug for NetworkMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkMonitor")
            .field("online", &self.is_online())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Disposer returned by [`NetworkMonitor::subscribe`].
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    monitor: Weak<MonitorInner>,
}

impl Subscription {
    /// Stops delivery to this subscriber.
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.monitor.upgrade() {
            inner.remove(self.id);
        }
    }
}

/// Connectivity source driven by explicit signals.
///
/// Embedders that receive platform online/offline events forward them with
/// [`ManualConnectivity::set_online`]; tests use it to simulate transitions.
pub struct ManualConnectivity {
    online: AtomicBool,
    listeners: Mutex<Vec<ConnectivityListener>>,
}

impl ManualConnectivity {
    pub fn new(online: bool) -> Arc<Self> {
        Arc::new(ManualConnectivity {
            online: AtomicBool::new(online),
            listeners: Mutex::new(Vec::new()),
        })
    }

    /// Emits an online/offline signal to every listener.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
        let listeners: Vec<ConnectivityListener> = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for listener in listeners {
            listener(online);
        }
    }
}

impl ConnectivitySource for ManualConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    fn listen(&self, listener: ConnectivityListener) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
