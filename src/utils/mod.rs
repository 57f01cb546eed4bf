pub mod poll;
pub mod retry;

pub use poll::{poll_until_terminal, HasStatus, PollConfig, PollOutcome};
pub use retry::{retry_on_transient, IsTransient, RetryConfig, RetryResult};
