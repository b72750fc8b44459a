// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the network monitor.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use std::sync::Mutex;

fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(bool) + Send + Sync>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let log_clone = Arc::clone(&log);
    let make = move |name: &str| -> Box<dyn Fn(bool) + Send + Sync> {
        let log = Arc::clone(&log_clone);
        let name = name.to_string();
        Box::new(move |online| log.lock().unwrap().push(format!("{name}:{online}")))
    };
    (log, make)
}

#[test]
fn initial_state_comes_from_source() {
    let online = NetworkMonitor::new(ManualConnectivity::new(true));
    let offline = NetworkMonitor::new(ManualConnectivity::new(false));
    assert!(online.is_online());
    assert!(!offline.is_online());
}

#[test]
fn signals_update_cached_state() {
    let source = ManualConnectivity::new(false);
    let monitor = NetworkMonitor::new(source.clone());

    source.set_online(true);
    assert!(monitor.is_online());
    source.set_online(false);
    assert!(!monitor.is_online());
}

#[test]
fn fan_out_in_subscription_order() {
    let source = ManualConnectivity::new(false);
    let monitor = NetworkMonitor::new(source.clone());
    let (log, make) = recorder();

    let _a = monitor.subscribe(make("a"));
    let _b = monitor.subscribe(make("b"));
    let _c = monitor.subscribe(make("c"));

    source.set_online(true);
    source.set_online(false);

    assert_eq!(
        *log.lock().unwrap(),
        vec!["a:true", "b:true", "c:true", "a:false", "b:false", "c:false"]
    );
}

#[test]
fn repeated_signal_is_not_a_transition() {
    let source = ManualConnectivity::new(true);
    let monitor = NetworkMonitor::new(source.clone());
    let (log, make) = recorder();
    let _sub = monitor.subscribe(make("a"));

    source.set_online(true);
    source.set_online(true);
    assert!(log.lock().unwrap().is_empty());

    source.set_online(false);
    source.set_online(false);
    assert_eq!(*log.lock().unwrap(), vec!["a:false"]);
}

#[test]
fn unsubscribe_stops_delivery() {
    let source = ManualConnectivity::new(false);
    let monitor = NetworkMonitor::new(source.clone());
    let (log, make) = recorder();

    let a = monitor.subscribe(make("a"));
    let _b = monitor.subscribe(make("b"));
    assert_eq!(monitor.subscriber_count(), 2);

    a.unsubscribe();
    assert_eq!(monitor.subscriber_count(), 1);

    source.set_online(true);
    assert_eq!(*log.lock().unwrap(), vec!["b:true"]);
}

#[test]
fn dropped_subscription_unsubscribes() {
    let source = ManualConnectivity::new(false);
    let monitor = NetworkMonitor::new(source.clone());
    let (log, make) = recorder();

    {
        let _scoped = monitor.subscribe(make("scoped"));
    }
    source.set_online(true);
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(monitor.subscriber_count(), 0);
}

#[test]
fn monitors_sharing_a_source_are_independent() {
    let source = ManualConnectivity::new(false);
    let first = NetworkMonitor::new(source.clone());
    let second = NetworkMonitor::new(source.clone());
    let (log, make) = recorder();

    let _a = first.subscribe(make("first"));
    let _b = second.subscribe(make("second"));
    drop(first);

    // The dropped monitor's listener is detached; only the live one fans out
    source.set_online(true);
    assert!(second.is_online());
    assert_eq!(*log.lock().unwrap(), vec!["second:true"]);
}

#[test]
fn callback_may_subscribe_during_fan_out() {
    let source = ManualConnectivity::new(false);
    let monitor = NetworkMonitor::new(source.clone());
    let late = Arc::new(Mutex::new(Vec::new()));

    let monitor_clone = monitor.clone();
    let late_clone = Arc::clone(&late);
    let _sub = monitor.subscribe(move |_| {
        let sub = monitor_clone.subscribe(|_| {});
        late_clone.lock().unwrap().push(sub);
    });

    source.set_online(true);
    assert_eq!(monitor.subscriber_count(), 2);
}

/// Source that comes online while a listener is being registered, before the
/// listener is stored, so the signal reaches nobody.
struct ComesOnlineDuringListen {
    online: AtomicBool,
    listeners: Mutex<Vec<ConnectivityListener>>,
}

impl ConnectivitySource for ComesOnlineDuringListen {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    fn listen(&self, listener: ConnectivityListener) {
        self.online.store(true, Ordering::Release);
        self.listeners.lock().unwrap().push(listener);
    }
}

#[test]
fn signal_during_registration_is_not_lost() {
    let source = Arc::new(ComesOnlineDuringListen {
        online: AtomicBool::new(false),
        listeners: Mutex::new(Vec::new()),
    });
    let monitor = NetworkMonitor::new(source.clone());

    assert!(monitor.is_online());
    assert_eq!(source.listeners.lock().unwrap().len(), 1);
}
