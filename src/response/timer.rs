use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Whole seconds since the survey was opened. Once stopped it never resumes.
#[derive(Debug, Default, Clone)]
pub struct Stopwatch {
    started: Option<Instant>,
    elapsed_secs: u64,
    stopped: bool,
}

impl Stopwatch {
    pub fn start(&mut self, now: Instant) {
        if self.started.is_none() && !self.stopped {
            self.started = Some(now);
            self.elapsed_secs = 0;
        }
    }

    pub fn tick(&mut self, now: Instant) -> u64 {
        if let (Some(started), false) = (self.started, self.stopped) {
            self.elapsed_secs = now.saturating_duration_since(started).as_secs();
        }
        self.elapsed_secs
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some() && !self.stopped
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }
}

/// Repeating task that ticks a shared [`Stopwatch`]. Ends on its own once the
/// stopwatch is stopped; dropping the handle cancels it as well.
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    pub fn spawn(stopwatch: Arc<Mutex<Stopwatch>>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let Ok(mut watch) = stopwatch.lock() else {
                    break;
                };
                if watch.is_stopped() {
                    break;
                }
                watch.tick(Instant::now());
            }
            tracing::debug!("elapsed-time ticker finished");
        });
        Self { handle }
    }

    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
