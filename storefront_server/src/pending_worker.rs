use std::time::Duration;

use log::*;
use storefront_engine::{OrderQueryApi, SqliteDatabase};
use tokio::{sync::watch, task::JoinHandle};

/// The latest pending-order count, as seen by the badge endpoint.
#[derive(Clone, Debug)]
pub struct PendingBadge(watch::Receiver<i64>);

impl PendingBadge {
    pub fn new(receiver: watch::Receiver<i64>) -> Self {
        Self(receiver)
    }

    pub fn count(&self) -> i64 {
        *self.0.borrow()
    }
}

/// Starts the pending-order poll. Do not await the returned JoinHandle, as it will run indefinitely; abort it on
/// shutdown instead.
///
/// A failed count is logged and the previous value is kept until the next tick.
pub fn start_pending_worker(db: SqliteDatabase, interval: Duration) -> (JoinHandle<()>, PendingBadge) {
    let (sender, receiver) = watch::channel(0i64);
    let handle = tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = OrderQueryApi::new(db);
        info!("🕰️ Pending order worker started. Polling every {}s", interval.as_secs());
        loop {
            timer.tick().await;
            trace!("🕰️ Counting pending orders");
            match api.pending_count().await {
                Ok(count) => {
                    if sender.send(count).is_err() {
                        info!("🕰️ Nobody is watching the pending order count any more. Stopping.");
                        break;
                    }
                    debug!("🕰️ {count} orders are pending");
                },
                Err(e) => {
                    error!("🕰️ Could not count pending orders: {e}");
                },
            }
        }
    });
    (handle, PendingBadge::new(receiver))
}
