//! Per-chat mutual exclusion.
//!
//! The engine's read-stage/act/write-stage sequence is not atomic, so the
//! runtime serializes events for the same chat id through a keyed lock.
//! Events for different chat ids proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Keyed async mutexes, one per chat id.
#[derive(Default)]
pub struct ChatLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `chat_id`, creating it on first use.
    /// The guard is owned, so it can be held across the whole handler.
    pub async fn acquire(&self, chat_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(chat_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
