use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct ActiveRun {
    generation: u64,
    cancel: CancellationToken,
    ended: Arc<Notify>,
}

/// Tracks which sessions have a generation run in flight.
///
/// A run loop calls [`RunRegistry::begin`] and keeps the returned guard
/// alive for the duration of the run; dropping the guard (normal end,
/// error, or panic unwind) deregisters the run and wakes anyone blocked in
/// [`RunRegistry::wait_for_end`]. `/stop` and `/compact` only ever signal
/// cancellation; the run loop itself decides when to wind down.
#[derive(Default)]
pub struct RunRegistry {
    runs: Arc<DashMap<String, ActiveRun>>,
    generation: AtomicU64,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a run for `session_id` and return its guard.
    ///
    /// A second `begin` for the same session replaces the first entry; the
    /// stale guard's drop then leaves the new entry untouched.
    pub fn begin(&self, session_id: &str) -> RunGuard {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let ended = Arc::new(Notify::new());
        self.runs.insert(
            session_id.to_string(),
            ActiveRun {
                generation,
                cancel: cancel.clone(),
                ended: Arc::clone(&ended),
            },
        );
        debug!(session = %session_id, "run registered");
        RunGuard {
            runs: Arc::clone(&self.runs),
            session_id: session_id.to_string(),
            generation,
            cancel,
            ended,
        }
    }

    pub fn is_active(&self, session_id: &str) -> bool {
        self.runs.contains_key(session_id)
    }

    pub fn active_count(&self) -> usize {
        self.runs.len()
    }

    /// Signal cancellation to the run for `session_id`, if any.
    ///
    /// Returns whether a run was there to signal. The registry entry stays
    /// until the run loop observes the token and drops its guard.
    pub fn abort(&self, session_id: &str) -> bool {
        match self.runs.get(session_id) {
            Some(run) => {
                run.cancel.cancel();
                debug!(session = %session_id, "run abort signalled");
                true
            }
            None => false,
        }
    }

    /// Wait until the run for `session_id` ends, bounded by `timeout`.
    ///
    /// Returns `true` if the run ended (or none was active), `false` on
    /// timeout.
    pub async fn wait_for_end(&self, session_id: &str, timeout: Duration) -> bool {
        let ended = match self.runs.get(session_id) {
            Some(run) => Arc::clone(&run.ended),
            None => return true,
        };
        let notified = ended.notified();
        tokio::pin!(notified);
        // Register interest before the presence re-check so an end between
        // the two cannot be missed.
        notified.as_mut().enable();
        if !self.runs.contains_key(session_id) {
            return true;
        }
        tokio::time::timeout(timeout, notified).await.is_ok()
    }
}

/// Registration handle held by a run loop for the run's lifetime.
pub struct RunGuard {
    runs: Arc<DashMap<String, ActiveRun>>,
    session_id: String,
    generation: u64,
    cancel: CancellationToken,
    ended: Arc<Notify>,
}

impl RunGuard {
    /// Token the run loop should observe for `/stop` and `/compact`.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.runs
            .remove_if(&self.session_id, |_, run| run.generation == self.generation);
        self.ended.notify_waiters();
        debug!(session = %self.session_id, "run deregistered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn guard_drop_deregisters() {
        let registry = RunRegistry::new();
        let guard = registry.begin("s-1");
        assert!(registry.is_active("s-1"));
        drop(guard);
        assert!(!registry.is_active("s-1"));
    }

    #[tokio::test]
    async fn abort_signals_without_deregistering() {
        let registry = RunRegistry::new();
        let guard = registry.begin("s-1");
        assert!(registry.abort("s-1"));
        assert!(guard.is_cancelled());
        assert!(registry.is_active("s-1"));
        assert!(!registry.abort("s-2"));
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_idle() {
        let registry = RunRegistry::new();
        assert!(registry.wait_for_end("s-1", Duration::from_secs(5)).await);
    }

    #[tokio::test]
    async fn wait_wakes_on_guard_drop() {
        let registry = Arc::new(RunRegistry::new());
        let guard = registry.begin("s-1");
        let waiter = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.wait_for_end("s-1", Duration::from_secs(5)).await })
        };
        tokio::task::yield_now().await;
        drop(guard);
        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn wait_times_out_while_run_persists() {
        let registry = RunRegistry::new();
        let _guard = registry.begin("s-1");
        assert!(!registry.wait_for_end("s-1", Duration::from_millis(100)).await);
    }

    #[tokio::test]
    async fn replacement_survives_stale_guard_drop() {
        let registry = RunRegistry::new();
        let stale = registry.begin("s-1");
        let _fresh = registry.begin("s-1");
        drop(stale);
        assert!(registry.is_active("s-1"));
    }
}
