//! Sticky offline tracker with a timed recovery window.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

/// Shared online/offline state for one backend domain.
///
/// The tracker is sticky: once a transport failure flips it offline, it
/// stays offline for `offline_timeout` so repeated requests during an
/// outage do not hammer the server. It recovers automatically: after the
/// window elapses the next dispatched request reopens a connection, and if
/// that fails the tracker flips offline again.
#[derive(Debug)]
pub struct OnlineState {
    offline_timeout: Duration,
    went_offline: Mutex<Option<Instant>>,
}

impl OnlineState {
    /// Create a tracker with the configured offline window.
    #[must_use]
    pub fn new(offline_timeout: Duration) -> Self {
        Self {
            offline_timeout,
            went_offline: Mutex::new(None),
        }
    }

    /// Record a transport failure.
    ///
    /// Calling this while an offline window is already open is a no-op:
    /// the recorded timestamp never moves backwards and the window is not
    /// extended.
    pub fn mark_offline(&self) {
        let mut guard = self
            .went_offline
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match *guard {
            Some(at) if at.elapsed() < self.offline_timeout => {},
            _ => {
                *guard = Some(Instant::now());
                warn!(
                    timeout_secs = self.offline_timeout.as_secs(),
                    "backend marked offline"
                );
            },
        }
    }

    /// Whether the backend is currently inside an offline window.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        let guard = self
            .went_offline
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        matches!(*guard, Some(at) if at.elapsed() < self.offline_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_starts_online() {
        let state = OnlineState::new(Duration::from_secs(300));
        assert!(!state.is_offline());
    }

    #[tokio::test(start_paused = true)]
    async fn test_offline_window_expires() {
        let state = OnlineState::new(Duration::from_secs(300));
        state.mark_offline();
        assert!(state.is_offline());

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(state.is_offline());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!state.is_offline());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_offline_does_not_extend_window() {
        let state = OnlineState::new(Duration::from_secs(300));
        state.mark_offline();

        // A second failure halfway through must not restart the window.
        tokio::time::advance(Duration::from_secs(200)).await;
        state.mark_offline();

        tokio::time::advance(Duration::from_secs(101)).await;
        assert!(!state.is_offline());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reoffline_after_recovery() {
        let state = OnlineState::new(Duration::from_secs(60));
        state.mark_offline();
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!state.is_offline());

        state.mark_offline();
        assert!(state.is_offline());
    }
}
