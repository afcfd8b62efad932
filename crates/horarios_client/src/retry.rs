use crate::HorariosError;
use std::time::Duration;

/// A simple retry policy with exponential backoff and jitter.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Run `f` until it succeeds, fails with a non-transient error, or the
    /// retry budget is spent.
    pub async fn retry_async<F, Fut, T>(&self, mut f: F) -> Result<T, HorariosError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, HorariosError>>,
    {
        let mut attempt = 0u32;
        loop {
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries || !e.is_transient() {
                        return Err(e);
                    }
                    // exponential backoff with jitter
                    let max_delay = (self.base_delay * (1u32 << attempt.min(16))).as_millis() as u64;
                    let delay = if max_delay == 0 {
                        0
                    } else {
                        rand::random_range(0..max_delay)
                    };
                    tracing::debug!(attempt, delay_ms = delay, error = %e, "retrying request");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }
}
