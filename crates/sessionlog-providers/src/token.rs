use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cooperative cancellation handed to providers.
///
/// A flag plus an optional deadline. Clones share the flag, so a pipeline
/// controller and every task that captured its token observe the same
/// cancellation. Providers are expected to poll [`CancelToken::is_cancelled`]
/// or await [`CancelToken::cancelled`] and stop producing results.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: CancellationToken,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.flag.cancel();
    }

    /// True once cancelled explicitly or once the deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled() || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Resolves when the token is cancelled or its deadline passes.
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.flag.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.flag.cancelled().await,
        }
    }
}
