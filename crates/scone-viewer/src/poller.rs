//! Change poller: periodic `HEAD` probes of the displayed document.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::fetch::Fetcher;
use crate::viewer::Message;

/// Default probe period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Handle to a running poll loop bound to one file.
///
/// Dropping the handle stops the loop.
#[derive(Debug)]
pub struct ChangePoller {
    file: String,
    task: JoinHandle<()>,
}

impl ChangePoller {
    /// Start probing `file` every `period`, first tick one period from now.
    ///
    /// Each successful probe is reported as a message carrying the observed
    /// `Last-Modified` value. Failed probes are logged and skipped.
    pub(crate) fn start(
        file: &str,
        period: Duration,
        fetcher: Arc<dyn Fetcher>,
        messages: mpsc::UnboundedSender<Message>,
    ) -> Self {
        let owned = file.to_owned();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                match fetcher.probe(&owned).await {
                    Ok(last_modified) => {
                        let probe = Message::Probed {
                            file: owned.clone(),
                            last_modified,
                        };
                        if messages.send(probe).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(file = %owned, error = %e, "Change probe failed");
                    }
                }
            }
        });

        tracing::debug!(file, ?period, "Started change poller");
        Self {
            file: file.to_owned(),
            task,
        }
    }

    /// File being polled.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }
}

impl Drop for ChangePoller {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!(file = %self.file, "Stopped change poller");
    }
}
