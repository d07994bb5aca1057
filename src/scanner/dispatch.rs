use crate::config::PacingConfig;
use crate::error::Result;
use crate::telegram::Notifier;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Sends alerts one at a time and waits after each send: the message delay
/// after a success, the longer failure delay after an error.
pub struct AlertDispatcher {
    notifier: Arc<dyn Notifier>,
    message_delay: Duration,
    failure_delay: Duration,
    dry_run: bool,
}

impl AlertDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, pacing: &PacingConfig) -> Self {
        Self {
            notifier,
            message_delay: pacing.message_delay(),
            failure_delay: pacing.failure_delay(),
            dry_run: false,
        }
    }

    /// Logs messages instead of sending them.
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    pub async fn dispatch(&self, text: &str) -> Result<()> {
        if self.dry_run {
            info!("[dry-run] would send:\n{}", text);
            return Ok(());
        }

        match self.notifier.send(text).await {
            Ok(()) => {
                tokio::time::sleep(self.message_delay).await;
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Send failed, backing off for {}ms: {}",
                    self.failure_delay.as_millis(),
                    e
                );
                tokio::time::sleep(self.failure_delay).await;
                Err(e)
            }
        }
    }

    /// Unpaced one-off message such as the startup notice.
    pub async fn announce(&self, text: &str) -> Result<()> {
        if self.dry_run {
            info!("[dry-run] would announce:\n{}", text);
            return Ok(());
        }
        self.notifier.send(text).await
    }
}
