//! Per-sender mutual exclusion.
//!
//! Messages from one sender are processed one at a time; different senders
//! never wait on each other. Entries are dropped once nobody holds or waits
//! for them, so the registry only grows with concurrent senders.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::SenderId;

type Registry = Arc<Mutex<HashMap<SenderId, Arc<AsyncMutex<()>>>>>;

/// Registry of async locks keyed by sender.
#[derive(Debug, Clone, Default)]
pub struct SenderLocks {
    registry: Registry,
}

impl SenderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `sender`'s session.
    pub async fn acquire(&self, sender: &SenderId) -> SenderGuard {
        let lock = {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(registry.entry(sender.clone()).or_default())
        };
        let guard = lock.lock_owned().await;
        SenderGuard {
            guard: Some(guard),
            sender: sender.clone(),
            registry: Arc::clone(&self.registry),
        }
    }

    /// Number of senders currently holding or waiting for a lock.
    pub fn len(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Exclusive access to one sender; released on drop.
#[derive(Debug)]
pub struct SenderGuard {
    guard: Option<OwnedMutexGuard<()>>,
    sender: SenderId,
    registry: Registry,
}

impl Drop for SenderGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the registry's own handle left: nobody holds or awaits it.
        let idle = registry
            .get(&self.sender)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            registry.remove(&self.sender);
        }
    }
}
