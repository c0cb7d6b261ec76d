//! Fixed-window rate limiter shared across all concurrent seed fetches.
//!
//! One budget of N requests per window. `acquire()` blocks until a slot is
//! free; hitting the window is an expected suspension point, not a failure.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::info;

struct WindowState {
    window_start: Instant,
    used: u32,
}

pub struct RateWindow {
    capacity: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

impl RateWindow {
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            window,
            state: Mutex::new(WindowState {
                window_start: Instant::now(),
                used: 0,
            }),
        }
    }

    /// Take one request slot, sleeping through window resets as needed.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                let elapsed = state.window_start.elapsed();
                if elapsed >= self.window {
                    state.window_start = Instant::now();
                    state.used = 0;
                }
                if state.used < self.capacity {
                    state.used += 1;
                    return;
                }
                self.window - state.window_start.elapsed().min(self.window)
            };

            info!(
                wait_secs = wait.as_secs(),
                "Rate window exhausted, waiting for reset"
            );
            tokio::time::sleep(wait).await;
        }
    }
}
