//! Single-flight cell: concurrent callers share one in-flight operation.
//!
//! Used for session activation so that overlapping `init()` calls await the
//! same outcome instead of racing to create duplicate sessions. Once the
//! flight completes the cell resets, so a later call starts a fresh
//! operation (re-activation is the retry path).

use std::future::Future;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

/// Shares one in-flight future between concurrent callers.
///
/// The first caller starts the operation; everyone arriving while it runs
/// awaits a shared handle to the same future and receives a clone of its
/// output.
pub struct SingleFlight<T: Clone + Send + Sync + 'static> {
    slot: Mutex<Option<Shared<BoxFuture<'static, T>>>>,
}

impl<T: Clone + Send + Sync + 'static> SingleFlight<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Join the in-flight operation, starting it if none is running.
    ///
    /// `start` is only invoked by the caller that begins a new flight; that
    /// caller also clears the cell once the result is in.
    pub async fn run<F, Fut>(&self, start: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (flight, leader) = {
            let mut slot = self.slot.lock().await;
            match slot.as_ref() {
                Some(flight) => (flight.clone(), false),
                None => {
                    let flight = start().boxed().shared();
                    *slot = Some(flight.clone());
                    (flight, true)
                }
            }
        };

        let output = flight.await;

        if leader {
            *self.slot.lock().await = None;
        }

        output
    }
}

impl<T: Clone + Send + Sync + 'static> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> std::fmt::Debug for SingleFlight<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight").finish_non_exhaustive()
    }
}
