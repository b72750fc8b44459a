// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! TCP reachability probe.
//!
//! The connectivity source for targets without a platform online/offline
//! event. A background task connects to a `host:port` on a fixed interval
//! and signals listeners when reachability changes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::Result;
use crate::network::{ConnectivityListener, ConnectivitySource};

/// Connectivity source backed by periodic TCP connects.
///
/// The probe task stops when the last handle is dropped.
pub struct TcpProbe {
    addr: String,
    online: Arc<AtomicBool>,
    listeners: Arc<Mutex<Vec<ConnectivityListener>>>,
    cancel_token: CancellationToken,
}

impl TcpProbe {
    /// Probes `addr` once for the initial state, then keeps probing every
    /// `interval` on a background task.
    pub async fn start(addr: String, interval: Duration, timeout: Duration) -> Arc<Self> {
        let initial = probe_once(&addr, timeout).await;
        tracing::debug!(addr = %addr, online = initial, "connectivity probe started");

        let probe = Arc::new(TcpProbe {
            addr,
            online: Arc::new(AtomicBool::new(initial)),
            listeners: Arc::new(Mutex::new(Vec::new())),
            cancel_token: CancellationToken::new(),
        });

        tokio::spawn(run_probe_loop(
            probe.addr.clone(),
            interval,
            timeout,
            Arc::clone(&probe.online),
            Arc::clone(&probe.listeners),
            probe.cancel_token.clone(),
        ));

        probe
    }

    /// Starts a probe using the `[connectivity]` section, falling back to
    /// the remote base URL's host and port.
    pub async fn from_config(config: &Config) -> Result<Arc<Self>> {
        let addr = config.probe_addr()?;
        Ok(Self::start(
            addr,
            config.connectivity.probe_interval(),
            config.connectivity.probe_timeout(),
        )
        .await)
    }

    /// The probed address.
    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl ConnectivitySource for TcpProbe {
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

impl Drop for TcpProbe {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn probe_once(addr: &str, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}

async fn run_probe_loop(
    addr: String,
    interval: Duration,
    timeout: Duration,
    online: Arc<AtomicBool>,
    listeners: Arc<Mutex<Vec<ConnectivityListener>>>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately; the initial probe already ran.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let reachable = probe_once(&addr, timeout).await;
        if online.swap(reachable, Ordering::AcqRel) == reachable {
            continue;
        }

        tracing::debug!(addr = %addr, online = reachable, "connectivity changed");
        let snapshot: Vec<ConnectivityListener> = listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for listener in snapshot {
            listener(reachable);
        }
    }

    tracing::debug!(addr = %addr, "connectivity probe stopped");
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
