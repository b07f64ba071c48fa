use std::future::Future;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::sleep;

/// Outcome of a single attempt, as classified by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt<T> {
    Success(T),
    /// Transient failure, the operation is invoked again after a delay.
    Retryable(String),
    /// Final failure carrying a fallback value, returned as is.
    Terminal(T),
}

/// Exponential backoff without cap and without attempt limit.
///
/// The first retry waits `initial_delay`, every further retry waits twice as
/// long as the previous one.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

impl RetryPolicy {
    pub fn new(initial_delay: Duration) -> Self {
        Self { initial_delay }
    }

    /// Delays slept before the 1st, 2nd, ... retry.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        std::iter::successors(Some(self.initial_delay), |d| Some(d.saturating_mul(2)))
    }

    /// Invokes `operation` until it yields `Success` or `Terminal`.
    ///
    /// `label` identifies the operation (page number, uid) in the log.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> T
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        let mut delays = self.delays();
        let mut attempt: u32 = 1;
        loop {
            debug!("{label}: attempt {attempt}");
            match operation().await {
                Attempt::Success(value) => {
                    if attempt > 1 {
                        info!("{label}: succeeded after {attempt} attempts");
                    }
                    return value;
                }
                Attempt::Terminal(value) => {
                    info!("{label}: terminal failure, not retrying");
                    return value;
                }
                Attempt::Retryable(reason) => {
                    // successors() never runs dry, the fallback is unreachable
                    let delay = delays.next().unwrap_or(Duration::MAX);
                    warn!("{label}: {reason}, retry in {delay:?}");
                    sleep(delay).await;
                }
            }
            attempt = attempt.saturating_add(1);
        }
    }
}
