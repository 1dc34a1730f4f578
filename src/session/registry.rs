//! Sessions keyed by buffer identity.
//!
//! The host adapter owns one [`SessionRegistry`]. Subscribing a buffer
//! creates its [`TrimSession`] and returns an opaque handle; unsubscribing
//! with that handle drops the session along with any pending capture.
//! Nothing is stored on the host's document objects.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::events::{EventSink, NullSink, SessionEvent};
use crate::session::{TrimOptions, TrimSession};

/// Host-assigned identity of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferId(pub u64);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

/// Returned by [`SessionRegistry::subscribe`]; needed to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: u64,
    buffer: BufferId,
}

impl SubscriptionHandle {
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }
}

struct Subscription {
    handle: SubscriptionHandle,
    session: TrimSession,
}

/// All trim sessions of one host.
pub struct SessionRegistry {
    options: TrimOptions,
    sink: Arc<dyn EventSink>,
    subscriptions: HashMap<BufferId, Subscription>,
    next_handle: u64,
}

impl fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("options", &self.options)
            .field("buffers", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(TrimOptions::default())
    }
}

impl SessionRegistry {
    pub fn new(options: TrimOptions) -> Self {
        Self::with_sink(options, Arc::new(NullSink))
    }

    pub fn with_sink(options: TrimOptions, sink: Arc<dyn EventSink>) -> Self {
        Self {
            options,
            sink,
            subscriptions: HashMap::new(),
            next_handle: 1,
        }
    }

    pub fn options(&self) -> &TrimOptions {
        &self.options
    }

    /// Start tracking `buffer`. Subscribing an already tracked buffer returns
    /// its existing handle and keeps its session.
    pub fn subscribe(&mut self, buffer: BufferId) -> SubscriptionHandle {
        if let Some(existing) = self.subscriptions.get(&buffer) {
            return existing.handle;
        }

        let handle = SubscriptionHandle {
            id: self.next_handle,
            buffer,
        };
        self.next_handle += 1;

        let session = TrimSession::with_sink(buffer, self.options.clone(), self.sink.clone());
        self.subscriptions
            .insert(buffer, Subscription { handle, session });
        self.sink.record(buffer.0, &SessionEvent::Subscribed);
        handle
    }

    /// Stop tracking the buffer behind `handle`, dropping its session.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> Result<(), EngineError> {
        match self.subscriptions.get(&handle.buffer) {
            Some(subscription) if subscription.handle == handle => {
                self.subscriptions.remove(&handle.buffer);
                self.sink.record(handle.buffer.0, &SessionEvent::Unsubscribed);
                Ok(())
            }
            _ => Err(EngineError::InvalidState(format!(
                "{} has no subscription with handle {}",
                handle.buffer, handle.id
            ))),
        }
    }

    pub fn is_subscribed(&self, buffer: BufferId) -> bool {
        self.subscriptions.contains_key(&buffer)
    }

    pub fn session(&self, buffer: BufferId) -> Option<&TrimSession> {
        self.subscriptions.get(&buffer).map(|s| &s.session)
    }

    pub fn session_mut(&mut self, buffer: BufferId) -> Option<&mut TrimSession> {
        self.subscriptions.get_mut(&buffer).map(|s| &mut s.session)
    }

    /// Subscribed buffers in ascending order.
    pub fn buffers(&self) -> Vec<BufferId> {
        let mut buffers: Vec<_> = self.subscriptions.keys().copied().collect();
        buffers.sort();
        buffers
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use crate::text::TextSnapshot;

    #[test]
    fn subscribe_is_idempotent_per_buffer() {
        let mut registry = SessionRegistry::default();
        let first = registry.subscribe(BufferId(1));
        let again = registry.subscribe(BufferId(1));
        let other = registry.subscribe(BufferId(2));

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.buffers(), vec![BufferId(1), BufferId(2)]);
    }

    #[test]
    fn unsubscribe_drops_session_and_capture() {
        let mut registry = SessionRegistry::default();
        let handle = registry.subscribe(BufferId(4));
        registry
            .session_mut(BufferId(4))
            .unwrap()
            .begin_trim(&TextSnapshot::new("x  "), Some(3), None)
            .unwrap();

        registry.unsubscribe(handle).unwrap();
        assert!(!registry.is_subscribed(BufferId(4)));
        assert!(registry.session(BufferId(4)).is_none());

        registry.subscribe(BufferId(4));
        assert!(
            registry
                .session(BufferId(4))
                .unwrap()
                .pending_capture()
                .is_none()
        );
    }

    #[test]
    fn stale_handle_is_rejected() {
        let mut registry = SessionRegistry::default();
        let old = registry.subscribe(BufferId(1));
        registry.unsubscribe(old).unwrap();
        let _new = registry.subscribe(BufferId(1));

        assert!(matches!(
            registry.unsubscribe(old),
            Err(EngineError::InvalidState(_))
        ));
        assert!(registry.is_subscribed(BufferId(1)));
    }

    #[test]
    fn sessions_share_the_registry_sink() {
        let sink = Arc::new(MemorySink::new());
        let mut registry = SessionRegistry::with_sink(TrimOptions::default(), sink.clone());
        let handle = registry.subscribe(BufferId(5));
        registry
            .session_mut(BufferId(5))
            .unwrap()
            .begin_trim(&TextSnapshot::new("a"), None, None)
            .unwrap();
        registry.unsubscribe(handle).unwrap();

        let events = sink.events_for(5);
        assert_eq!(events.first(), Some(&SessionEvent::Subscribed));
        assert_eq!(events.last(), Some(&SessionEvent::Unsubscribed));
        assert_eq!(events.len(), 4);
    }
}
