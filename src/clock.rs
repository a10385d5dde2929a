use tokio::time::{Duration, Instant};

/// Session stopwatch. Starting twice is a no-op and elapsed time never goes
/// backwards while running.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionClock {
    started_at: Option<Instant>,
    frozen: Option<Duration>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.frozen.is_none()
    }

    /// Freezes the reading at the current value.
    pub fn stop(&mut self) {
        if self.is_running() {
            self.frozen = Some(self.elapsed());
        }
    }

    pub fn elapsed(&self) -> Duration {
        if let Some(frozen) = self.frozen {
            return frozen;
        }
        self.started_at
            .map(|started_at| started_at.elapsed())
            .unwrap_or_default()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed().as_secs()
    }
}
