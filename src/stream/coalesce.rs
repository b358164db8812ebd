//! Request coalescing
//!
//! One in-flight computation per key; every concurrent caller for the
//! same key awaits the same result. The leader's work runs on a detached
//! task, so a caller going away never tears the result down for the
//! rest. The last waiter out cleans up the map entry.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

struct Flight<V> {
    tx: watch::Sender<Option<V>>,
    waiters: usize,
}

/// Map of key → in-flight computation
pub struct SingleFlight<K, V> {
    flights: Arc<Mutex<HashMap<K, Flight<V>>>>,
}

impl<K, V> Default for SingleFlight<K, V> {
    fn default() -> Self {
        SingleFlight {
            flights: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `work` for `key`, or join the in-flight run of it.
    ///
    /// Returns `None` only if the leader task died without producing a
    /// value (it panicked); callers map that to their own failure value.
    pub async fn run<F, Fut>(&self, key: K, work: F) -> Option<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let mut rx = {
            let mut flights = self.flights.lock().unwrap();
            if let Some(flight) = flights.get_mut(&key) {
                flight.waiters += 1;
                flight.tx.subscribe()
            } else {
                let (tx, rx) = watch::channel(None);
                flights.insert(
                    key.clone(),
                    Flight {
                        tx: tx.clone(),
                        waiters: 1,
                    },
                );
                let fut = work();
                tokio::spawn(async move {
                    let value = fut.await;
                    let _ = tx.send(Some(value));
                });
                rx
            }
        };

        let _guard = WaiterGuard {
            flights: Arc::clone(&self.flights),
            key,
        };

        let result = match rx.wait_for(|v| v.is_some()).await {
            Ok(value) => value.clone(),
            Err(_) => None,
        };
        result
    }

    /// Number of in-flight keys (for tests and introspection)
    pub fn in_flight(&self) -> usize {
        self.flights.lock().unwrap().len()
    }
}

struct WaiterGuard<K: Eq + Hash, V> {
    flights: Arc<Mutex<HashMap<K, Flight<V>>>>,
    key: K,
}

impl<K: Eq + Hash, V> Drop for WaiterGuard<K, V> {
    fn drop(&mut self) {
        let mut flights = self.flights.lock().unwrap();
        if let Some(flight) = flights.get_mut(&self.key) {
            flight.waiters -= 1;
            if flight.waiters == 0 {
                flights.remove(&self.key);
            }
        }
    }
}
