//! Cancellation composition for a single upload.
//!
//! A [`CancelScope`] owns one internal [`CancellationToken`] that the network call
//! observes. Two writers may trigger it: a listener on the caller's token and a
//! one-shot timer. The first trigger wins and records its [`CancelSource`]; later
//! triggers are no-ops. Dropping the scope aborts both the timer and the listener,
//! so nothing outlives the operation it was created for.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use subtitler_core::CancelSource;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct CancelScope {
    token: CancellationToken,
    winner: Arc<OnceLock<CancelSource>>,
    watchers: Vec<JoinHandle<()>>,
}

impl CancelScope {
    /// Arm a scope from an optional external token and an optional timeout.
    ///
    /// Must be called from within a Tokio runtime. A zero timeout arms no timer.
    pub fn new(external: Option<&CancellationToken>, timeout: Option<Duration>) -> Self {
        let mut scope = Self {
            token: CancellationToken::new(),
            winner: Arc::new(OnceLock::new()),
            watchers: Vec::with_capacity(2),
        };

        if let Some(external) = external {
            if external.is_cancelled() {
                scope.trigger(CancelSource::External);
            } else {
                let external = external.clone();
                let token = scope.token.clone();
                let winner = Arc::clone(&scope.winner);
                scope.watchers.push(tokio::spawn(async move {
                    external.cancelled().await;
                    trigger(&token, &winner, CancelSource::External);
                }));
            }
        }

        if let Some(timeout) = timeout.filter(|t| !t.is_zero()) {
            let token = scope.token.clone();
            let winner = Arc::clone(&scope.winner);
            scope.watchers.push(tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                trigger(&token, &winner, CancelSource::Timeout);
            }));
        }

        scope
    }

    /// Token the in-flight request observes.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Source that won the race, if the scope has been cancelled.
    pub fn source(&self) -> Option<CancelSource> {
        self.winner.get().copied()
    }

    /// Trigger the scope directly. Returns false if it was already cancelled.
    pub fn trigger(&self, source: CancelSource) -> bool {
        trigger(&self.token, &self.winner, source)
    }

    /// Number of timer/listener tasks still pending.
    pub fn active_watchers(&self) -> usize {
        self.watchers.iter().filter(|w| !w.is_finished()).count()
    }
}

impl Drop for CancelScope {
    fn drop(&mut self) {
        for watcher in self.watchers.drain(..) {
            watcher.abort();
        }
    }
}

fn trigger(
    token: &CancellationToken,
    winner: &OnceLock<CancelSource>,
    source: CancelSource,
) -> bool {
    if winner.set(source).is_err() {
        return false;
    }
    tracing::debug!(source = ?source, "Cancelling upload");
    token.cancel();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_sources_never_cancels() {
        let scope = CancelScope::new(None, None);
        assert_eq!(scope.active_watchers(), 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!scope.is_cancelled());
        assert_eq!(scope.source(), None);
    }

    #[tokio::test]
    async fn test_pre_cancelled_external_triggers_immediately() {
        let external = CancellationToken::new();
        external.cancel();

        let scope = CancelScope::new(Some(&external), Some(Duration::from_secs(60)));
        assert!(scope.is_cancelled());
        assert_eq!(scope.source(), Some(CancelSource::External));
        // Only the timer was armed; no listener for an already-fired token.
        assert_eq!(scope.active_watchers(), 1);
    }

    #[tokio::test]
    async fn test_external_fires_first() {
        let external = CancellationToken::new();
        let scope = CancelScope::new(Some(&external), Some(Duration::from_secs(60)));

        external.cancel();
        tokio::time::timeout(Duration::from_secs(1), scope.token().cancelled())
            .await
            .expect("scope should be cancelled by the external token");
        assert_eq!(scope.source(), Some(CancelSource::External));
    }

    #[tokio::test]
    async fn test_timeout_fires_first() {
        let external = CancellationToken::new();
        let scope = CancelScope::new(Some(&external), Some(Duration::from_millis(10)));

        tokio::time::timeout(Duration::from_secs(1), scope.token().cancelled())
            .await
            .expect("scope should be cancelled by the timer");
        assert_eq!(scope.source(), Some(CancelSource::Timeout));

        // The losing source has no further effect.
        external.cancel();
        tokio::task::yield_now().await;
        assert_eq!(scope.source(), Some(CancelSource::Timeout));
    }

    #[tokio::test]
    async fn test_trigger_is_idempotent() {
        let scope = CancelScope::new(None, None);
        assert!(scope.trigger(CancelSource::External));
        assert!(!scope.trigger(CancelSource::Timeout));
        assert!(!scope.trigger(CancelSource::External));
        assert_eq!(scope.source(), Some(CancelSource::External));
    }

    #[tokio::test]
    async fn test_zero_timeout_arms_nothing() {
        let scope = CancelScope::new(None, Some(Duration::ZERO));
        assert_eq!(scope.active_watchers(), 0);
        assert!(!scope.is_cancelled());
    }

    #[tokio::test]
    async fn test_drop_clears_timer_and_detaches_listener() {
        let external = CancellationToken::new();
        let scope = CancelScope::new(Some(&external), Some(Duration::from_millis(10)));
        assert_eq!(scope.active_watchers(), 2);
        let inner = scope.token().clone();

        drop(scope);

        external.cancel();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!inner.is_cancelled());
    }
}
