use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{Duration, Instant};

/// Sliding-log admission control, one independent window per key.
///
/// Each key owns a time-ordered log of admission instants behind its own
/// mutex, so callers on different keys never block each other; the outer
/// registry lock is only held long enough to clone the key's handle.
pub struct RateLimiter {
    windows: RwLock<HashMap<String, Arc<Mutex<VecDeque<Instant>>>>>,
    rate: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(rate: usize, window: Duration) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            rate,
            window,
        }
    }

    /// Admits the call if fewer than `rate` admissions fall inside the
    /// window. Rejection records nothing, so a rejected burst does not
    /// extend its own penalty.
    pub async fn allow(&self, key: &str) -> bool {
        let log = self.window_handle(key).await;
        let mut log = log.lock().await;

        let now = Instant::now();
        while let Some(front) = log.front() {
            if now.duration_since(*front) > self.window {
                log.pop_front();
            } else {
                break;
            }
        }

        if log.len() < self.rate {
            log.push_back(now);
            true
        } else {
            tracing::warn!(key = %crate::domain::payment::redact_customer_id(key), "rate limit exceeded");
            false
        }
    }

    async fn window_handle(&self, key: &str) -> Arc<Mutex<VecDeque<Instant>>> {
        {
            let windows = self.windows.read().await;
            if let Some(handle) = windows.get(key) {
                return handle.clone();
            }
        }
        let mut windows = self.windows.write().await;
        windows.entry(key.to_string()).or_default().clone()
    }
}
