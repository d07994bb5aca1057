use log::debug;
use std::time::Duration;
use tokio::time::Instant;

/// Keeps at least `delay` between the end of one request and the start of the
/// next. Callers `wait` before a request and `mark` once it has finished.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    last_call: Option<Instant>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_call: None,
        }
    }

    pub async fn wait(&self) {
        if let Some(last_call) = self.last_call {
            let elapsed = last_call.elapsed();
            if elapsed < self.delay {
                let wait_time = self.delay - elapsed;
                debug!("Pacing wait: {}ms", wait_time.as_millis());
                tokio::time::sleep(wait_time).await;
            }
        }
    }

    /// Records that a request just completed.
    pub fn mark(&mut self) {
        self.last_call = Some(Instant::now());
    }
}
