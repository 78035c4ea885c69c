use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Outbound messages buffered per session before the sender waits.
const SESSION_BUFFER: usize = 32;

/// Open SSE sessions. Each session owns the sending half of a channel whose
/// receiver feeds that session's event stream.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, mpsc::Sender<Value>>>,
}

/// Removes its session from the registry when dropped.
#[derive(Debug)]
pub struct SessionGuard {
    id: String,
    registry: Arc<SessionRegistry>,
}

impl SessionGuard {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session.
    pub fn open(self: &Arc<Self>) -> (SessionGuard, mpsc::Receiver<Value>) {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        self.lock().insert(id.clone(), tx);
        info!(session_id = %id, "SSE session opened");
        (SessionGuard { id, registry: Arc::clone(self) }, rx)
    }

    pub fn sender(&self, id: &str) -> Option<mpsc::Sender<Value>> {
        self.lock().get(id).cloned()
    }

    pub fn remove(&self, id: &str) {
        if self.lock().remove(id).is_some() {
            info!(session_id = %id, "SSE session closed");
        } else {
            debug!(session_id = %id, "session already removed");
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, mpsc::Sender<Value>>> {
        // The map holds no invariants a panicking holder could break.
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn messages_reach_the_session_receiver() {
        let registry = Arc::new(SessionRegistry::new());
        let (guard, mut rx) = registry.open();
        let tx = registry.sender(guard.id()).unwrap();
        tx.send(json!({"ok": true})).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), json!({"ok": true}));
    }

    #[test]
    fn dropping_the_guard_removes_the_session() {
        let registry = Arc::new(SessionRegistry::new());
        let (guard, _rx) = registry.open();
        let id = guard.id().to_owned();
        assert_eq!(registry.len(), 1);
        drop(guard);
        assert!(registry.is_empty());
        assert!(registry.sender(&id).is_none());
    }

    #[test]
    fn unknown_session_has_no_sender() {
        assert!(SessionRegistry::new().sender("nope").is_none());
    }
}
