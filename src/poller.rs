use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Terminal result of one polling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Passed,
    TimedOut,
}

/// Retries a probe on a fixed cadence until it reports true or the deadline
/// expires. Strictly sequential: one probe at a time, the interval sleep is
/// the only suspension point, and there is no cancellation hook mid-poll.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            interval: Duration::from_secs(2),
        }
    }
}

impl Poller {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Keeps calling `probe` every `interval` until it returns true or
    /// `timeout` elapses.
    ///
    /// The first probe fires immediately. A probe error propagates out of the
    /// loop; only "not yet converged" is retried. Because the interval sleep
    /// is coarse, elapsed time at TimedOut may overshoot the deadline by up
    /// to one interval.
    pub async fn wait_for<F, Fut>(&self, mut probe: F) -> Result<PollOutcome>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let start = Instant::now();
        loop {
            if probe().await? {
                return Ok(PollOutcome::Passed);
            }
            if start.elapsed() >= self.timeout {
                log::warn!("timeout occurred after {:?}", start.elapsed());
                return Ok(PollOutcome::TimedOut);
            }
            sleep(self.interval).await;
        }
    }
}
