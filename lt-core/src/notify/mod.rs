mod endpoint;

use clockabilly::Clockable;
pub use endpoint::HttpShutdownEndpoint;
#[cfg(any(test, feature = "mock"))]
pub use endpoint::MockShutdownEndpoint;
pub use endpoint::ShutdownEndpoint;
use tracing::*;

use crate::errors::*;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttemptOutcome {
    Delivered,
    Failed(String),
}

// One try at telling the log collector to stop.  The timestamp is when the attempt was made; for
// failed attempts the next one is scheduled at `ts + retry_delay_seconds`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShutdownAttempt {
    pub seq: u32,
    pub outcome: AttemptOutcome,
    pub ts: i64,
}

impl ShutdownAttempt {
    pub fn delivered(&self) -> bool {
        self.outcome == AttemptOutcome::Delivered
    }
}

// The notifier retries on a fixed (not exponential) delay up to a maximum number of attempts.  The
// terminator is a short-lived sidecar; if the collector hasn't answered after a handful of tries
// there's nothing better to do than give up loudly.
pub struct ShutdownNotifier {
    endpoint: Box<dyn ShutdownEndpoint + Send + Sync>,
    max_attempts: u32,
    retry_delay_seconds: i64,
    clock: Box<dyn Clockable + Send>,
    attempts: Vec<ShutdownAttempt>,
}

impl ShutdownNotifier {
    pub fn new(
        endpoint: Box<dyn ShutdownEndpoint + Send + Sync>,
        max_attempts: u32,
        retry_delay_seconds: i64,
        clock: Box<dyn Clockable + Send>,
    ) -> ShutdownNotifier {
        ShutdownNotifier {
            endpoint,
            max_attempts,
            retry_delay_seconds,
            clock,
            attempts: vec![],
        }
    }

    #[instrument(skip(self), fields(url = %self.endpoint.url()))]
    pub async fn notify(&mut self) -> anyhow::Result<ShutdownAttempt> {
        for seq in 1..=self.max_attempts {
            let ts = self.clock.now_ts();
            let outcome = match self.endpoint.interrupt().await {
                Ok(()) => AttemptOutcome::Delivered,
                Err(err) => AttemptOutcome::Failed(format!("{err:#}")),
            };
            let attempt = ShutdownAttempt { seq, outcome, ts };
            self.attempts.push(attempt.clone());

            match &attempt.outcome {
                AttemptOutcome::Delivered => {
                    info!("shutdown signal delivered on attempt {seq}/{}", self.max_attempts);
                    return Ok(attempt);
                },
                AttemptOutcome::Failed(msg) if seq < self.max_attempts => {
                    let next_ts = ts + self.retry_delay_seconds;
                    warn!("shutdown attempt {seq}/{} failed: {msg}; retrying at {next_ts}", self.max_attempts);
                    self.clock.sleep(self.retry_delay_seconds).await;
                },
                AttemptOutcome::Failed(msg) => {
                    error!("shutdown attempt {seq}/{} failed: {msg}; no attempts left", self.max_attempts);
                },
            }
        }

        Err(ShutdownError::delivery_failed(&self.endpoint.url(), self.max_attempts))
    }

    pub fn attempts(&self) -> &[ShutdownAttempt] {
        &self.attempts
    }
}

#[cfg(test)]
mod tests;
