//! Bounded-concurrency, paced dispatch of remote query tasks.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore};
use tokio::time::{Instant, sleep};

/// Throttles remote lookups with two independent bounds: at most
/// `max_in_flight` tasks running at once, and at least `min_spacing` between
/// successive dispatch starts.
///
/// Permits are granted in FIFO order, so dispatch *start* order follows
/// submission order. Completion order is whatever the remote side makes it.
#[derive(Clone)]
pub struct Dispatcher {
    permits: Arc<Semaphore>,
    min_spacing: Duration,
    last_dispatch: Arc<Mutex<Option<Instant>>>,
}

impl Dispatcher {
    pub fn new(max_in_flight: usize, min_spacing: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
            min_spacing,
            last_dispatch: Arc::new(Mutex::new(None)),
        }
    }

    /// Runs `task` once a concurrency slot is free and the spacing gate has
    /// passed. The slot is held until the task settles.
    pub async fn dispatch<F>(&self, task: F) -> F::Output
    where
        F: Future,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("dispatcher semaphore is never closed");
        self.pace().await;
        task.await
    }

    async fn pace(&self) {
        let mut last = self.last_dispatch.lock().await;
        if let Some(t) = *last {
            let elapsed = t.elapsed();
            if elapsed < self.min_spacing {
                sleep(self.min_spacing - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
