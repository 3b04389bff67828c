//! Request/response correlation for event-driven control clients
//!
//! Adapters that talk to devices over an event stream (WebSocket remotes,
//! multiplexed sockets) tag each request with a generated id and receive
//! replies out of band. `PendingCalls` turns that into an awaited call with a
//! per-call timeout. The table never keeps entries for callers that gave up:
//! an entry is removed on reply, on timeout, when the waiter is dropped, or on
//! disconnect.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, trace};
use uuid::Uuid;

pub type CallId = Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("No reply within {0:?}")]
    Timeout(Duration),
    #[error("Connection closed before a reply arrived")]
    Disconnected,
}

type CallTable<T> = Arc<Mutex<HashMap<CallId, oneshot::Sender<T>>>>;

/// Table of outstanding calls awaiting a reply
pub struct PendingCalls<T> {
    calls: CallTable<T>,
}

impl<T> Clone for PendingCalls<T> {
    fn clone(&self) -> Self {
        Self {
            calls: self.calls.clone(),
        }
    }
}

impl<T> Default for PendingCalls<T> {
    fn default() -> Self {
        Self {
            calls: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T: Send + 'static> PendingCalls<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for a request about to be sent
    pub fn register(&self) -> (CallId, PendingReply<T>) {
        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.calls.lock().insert(id, tx);
        trace!(call = %id, "Registered pending call");
        (
            id,
            PendingReply {
                id,
                rx,
                calls: self.calls.clone(),
            },
        )
    }

    /// Route a reply to its waiter. Returns false for unknown or expired ids.
    pub fn complete(&self, id: &CallId, value: T) -> bool {
        let Some(tx) = self.calls.lock().remove(id) else {
            debug!(call = %id, "Reply for unknown call dropped");
            return false;
        };
        tx.send(value).is_ok()
    }

    /// Fail every outstanding call, e.g. when the connection drops
    pub fn disconnect_all(&self) -> usize {
        let drained: Vec<_> = self.calls.lock().drain().collect();
        if !drained.is_empty() {
            debug!(count = drained.len(), "Failing pending calls on disconnect");
        }
        drained.len()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }
}

/// Waiter side of a registered call
pub struct PendingReply<T> {
    id: CallId,
    rx: oneshot::Receiver<T>,
    calls: CallTable<T>,
}

impl<T> PendingReply<T> {
    pub fn id(&self) -> CallId {
        self.id
    }

    pub async fn wait(mut self, timeout: Duration) -> Result<T, CallError> {
        match tokio::time::timeout(timeout, &mut self.rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(CallError::Disconnected),
            Err(_) => {
                debug!(call = %self.id, ?timeout, "Call timed out");
                Err(CallError::Timeout(timeout))
            }
        }
    }
}

impl<T> Drop for PendingReply<T> {
    fn drop(&mut self) {
        self.calls.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reply_reaches_waiter() {
        let calls = PendingCalls::<String>::new();
        let (id, reply) = calls.register();
        assert_eq!(calls.len(), 1);

        let responder = calls.clone();
        tokio::spawn(async move {
            assert!(responder.complete(&id, "pong".to_string()));
        });

        assert_eq!(reply.wait(Duration::from_secs(1)).await, Ok("pong".to_string()));
        assert!(calls.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_removes_entry() {
        let calls = PendingCalls::<u32>::new();
        let (id, reply) = calls.register();

        let result = reply.wait(Duration::from_secs(5)).await;
        assert_eq!(result, Err(CallError::Timeout(Duration::from_secs(5))));
        assert!(calls.is_empty());
        assert!(!calls.complete(&id, 7));
    }

    #[tokio::test]
    async fn test_disconnect_fails_waiters() {
        let calls = PendingCalls::<u32>::new();
        let (_, first) = calls.register();
        let (_, second) = calls.register();

        assert_eq!(calls.disconnect_all(), 2);
        assert_eq!(first.wait(Duration::from_secs(1)).await, Err(CallError::Disconnected));
        assert_eq!(second.wait(Duration::from_secs(1)).await, Err(CallError::Disconnected));
    }

    #[test]
    fn test_dropped_waiter_is_forgotten() {
        let calls = PendingCalls::<u32>::new();
        let (id, reply) = calls.register();
        drop(reply);
        assert!(calls.is_empty());
        assert!(!calls.complete(&id, 1));
    }
}
