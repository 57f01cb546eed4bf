use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

// ============================================================================
// Bounded Status Polling
// ============================================================================
//
// Asks a lookup for the current status up to `max_attempts` times, strictly
// one after another, and stops at the first terminal status. There is no
// sleep after the final attempt. A lookup error aborts polling.
//
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Total lookups, including the first. Always at least 1.
    pub max_attempts: u32,
    /// Pause between consecutive lookups
    pub delay: Duration,
}

impl PollConfig {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Customer creation: 15 lookups, 5 seconds apart
    pub fn create_flow() -> Self {
        Self::new(15, Duration::from_secs(5))
    }

    /// Customer update: 10 lookups, 5 seconds apart
    pub fn update_flow() -> Self {
        Self::new(10, Duration::from_secs(5))
    }
}

/// Anything that reports a backend status string
pub trait HasStatus {
    fn status(&self) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    /// A terminal status was observed
    Terminal { attempts: u32, last: T },
    /// Budget spent without a terminal status; `last` is the final observation
    Exhausted { attempts: u32, last: T },
}

impl<T> PollOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Terminal { attempts, .. } | PollOutcome::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn last(&self) -> &T {
        match self {
            PollOutcome::Terminal { last, .. } | PollOutcome::Exhausted { last, .. } => last,
        }
    }

    pub fn into_last(self) -> T {
        match self {
            PollOutcome::Terminal { last, .. } | PollOutcome::Exhausted { last, .. } => last,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, PollOutcome::Exhausted { .. })
    }
}

/// Poll `lookup` until it reports one of `terminal` or the budget runs out
pub async fn poll_until_terminal<F, Fut, T, E>(
    config: &PollConfig,
    terminal: &[&str],
    mut lookup: F,
) -> Result<PollOutcome<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    T: HasStatus,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let observation = match lookup(attempt).await {
            Ok(observation) => observation,
            Err(error) => {
                tracing::error!(
                    attempt = attempt,
                    max_attempts = max_attempts,
                    error = %error,
                    "Status lookup failed, polling aborted"
                );
                return Err(error);
            }
        };

        let status = observation.status();
        tracing::debug!(
            attempt = attempt,
            max_attempts = max_attempts,
            status = status.unwrap_or("N/A"),
            "Polled status"
        );

        if status.is_some_and(|s| terminal.contains(&s)) {
            return Ok(PollOutcome::Terminal {
                attempts: attempt,
                last: observation,
            });
        }

        if attempt >= max_attempts {
            tracing::warn!(
                attempts = attempt,
                status = status.unwrap_or("N/A"),
                "No terminal status before polling budget ran out"
            );
            return Ok(PollOutcome::Exhausted {
                attempts: attempt,
                last: observation,
            });
        }

        sleep(config.delay).await;
    }
}
