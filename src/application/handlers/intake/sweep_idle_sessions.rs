//! SessionSweeper - Background purge of long-idle sessions.
//!
//! Sessions past the dialogue timeout are normally dropped when their sender
//! writes again. Senders who never return would otherwise stay in memory
//! forever; the sweeper removes them once idle beyond the retention window.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::foundation::Timestamp;
use crate::ports::{SessionStore, SessionStoreError};

pub struct SessionSweeper {
    sessions: Arc<dyn SessionStore>,
    retention: Duration,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(sessions: Arc<dyn SessionStore>, retention: Duration, interval: Duration) -> Self {
        Self {
            sessions,
            retention,
            interval,
        }
    }

    /// Removes sessions idle longer than the retention window as of `now`.
    pub async fn sweep_once(&self, now: Timestamp) -> Result<usize, SessionStoreError> {
        let purged = self.sessions.purge_idle(now.minus(self.retention)).await?;
        if purged > 0 {
            tracing::info!(purged, "Purged idle sessions");
        }
        Ok(purged)
    }

    /// Runs the sweep on a fixed interval until the task is aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep_once(Timestamp::now()).await {
                    tracing::warn!(error = %e, "Session sweep failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySessionStore;
    use crate::domain::foundation::SenderId;
    use crate::domain::intake::IntakeSession;

    const RETENTION: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn purges_only_sessions_beyond_retention() {
        let store = Arc::new(InMemorySessionStore::new());
        let now = Timestamp::now();
        let stale = SenderId::new("stale").unwrap();
        let fresh = SenderId::new("fresh").unwrap();
        store
            .put(&stale, IntakeSession::start(now.minus(RETENTION + Duration::from_secs(1))))
            .await
            .unwrap();
        store
            .put(&fresh, IntakeSession::start(now.minus(Duration::from_secs(60))))
            .await
            .unwrap();

        let sweeper = SessionSweeper::new(store.clone(), RETENTION, Duration::from_secs(60));
        assert_eq!(sweeper.sweep_once(now).await.unwrap(), 1);

        assert!(store.get(&stale).await.unwrap().is_none());
        assert!(store.get(&fresh).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn spawned_sweeper_runs_on_interval() {
        let store = Arc::new(InMemorySessionStore::new());
        let stale = SenderId::new("stale").unwrap();
        store
            .put(&stale, IntakeSession::start(Timestamp::now().minus(RETENTION * 2)))
            .await
            .unwrap();

        let handle = SessionSweeper::new(store.clone(), RETENTION, Duration::from_millis(10)).spawn();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(store.len().await.unwrap(), 0);
        handle.abort();
    }
}
