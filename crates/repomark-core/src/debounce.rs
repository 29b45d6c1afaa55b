// Trailing-edge debounce on the tokio clock
use std::time::Duration;
use tokio::time::Instant;

/// Holds back a changing value until it has been left alone for `delay`
///
/// Only the latest pushed value is kept; every push restarts the clock.
/// There is no background task: the pending value lives in the struct, so
/// dropping the debouncer is all the teardown there is.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Replace whatever is pending and restart the quiet period
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// Take the pending value if its quiet period is over
    pub fn poll_due(&mut self) -> Option<T> {
        match self.pending {
            Some((_, at)) if Instant::now() >= at => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Wait for the next emission
    ///
    /// Never resolves while nothing is pending. Cancel-safe: dropping the
    /// future (e.g. a losing `select!` branch) leaves the pending value in
    /// place for the next call.
    pub async fn settled(&mut self) -> T {
        loop {
            match self.deadline() {
                Some(at) => {
                    tokio::time::sleep_until(at).await;
                    if let Some(value) = self.poll_due() {
                        return value;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        }
    }
}
