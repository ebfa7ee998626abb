//! Periodic sweep of idle sessions

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::manager::SessionStore;

/// Background task that reaps expired sessions on a fixed interval
///
/// The store already reaps on every operation; the sweeper only frees memory
/// held by sessions nobody touches any more.
pub struct SessionReaper {
    store: Arc<SessionStore>,
    interval: Duration,
    cancel: CancellationToken,
}

impl SessionReaper {
    pub fn new(store: Arc<SessionStore>, interval: Duration) -> Self {
        Self {
            store,
            interval,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the sweep loop when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Start the sweep loop on the current tokio runtime
    pub fn spawn(self) -> JoinHandle<()> {
        info!("Session reaper started (every {:?})", self.interval);
        tokio::spawn(async move { self.run().await })
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Session reaper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let reaped = self.store.reap_expired();
                    if reaped > 0 {
                        debug!("Reaper removed {} expired sessions", reaped);
                    }
                }
            }
        }
    }
}
