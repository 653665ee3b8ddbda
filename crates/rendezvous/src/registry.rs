//! Shared map of rendezvous keys to attached peers.

use crate::Role;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Signals queued per peer before further data to it is dropped.
pub const PEER_QUEUE_CAPACITY: usize = 256;

/// Identifies one attachment; distinct across the registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

/// What a peer's relay loop can receive from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerSignal {
    /// Text forwarded from the opposite role.
    Data(String),
    /// Another connection took this role; close.
    Evicted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Delivered,
    PeerAbsent,
    /// The peer is attached but not draining its queue; the text was discarded.
    Dropped,
}

#[derive(Debug)]
struct Peer {
    id: PeerId,
    tx: mpsc::Sender<PeerSignal>,
}

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<String, HashMap<Role, Peer>>,
    next_peer: u64,
}

/// Registry of live sessions.
///
/// All operations take one lock and never hold it across an await point.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: Mutex<Inner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupy `role` under `key`, evicting any current holder of that role.
    pub fn attach(self: &Arc<Self>, key: &str, role: Role) -> Attachment {
        let (tx, rx) = mpsc::channel(PEER_QUEUE_CAPACITY);

        let peer_id = {
            let mut inner = self.inner.lock();
            inner.next_peer += 1;
            let peer_id = PeerId(inner.next_peer);

            let session = inner.sessions.entry(key.to_string()).or_default();
            if let Some(previous) = session.insert(role, Peer { id: peer_id, tx }) {
                info!(key, %role, evicted = %previous.id, "role re-attached, evicting previous peer");
                // A full queue still closes: the dropped sender ends the old peer's stream.
                let _ = previous.tx.try_send(PeerSignal::Evicted);
            }
            peer_id
        };

        info!(key, %role, peer = %peer_id, "peer attached");
        Attachment {
            registry: Arc::clone(self),
            key: key.to_string(),
            role,
            peer_id,
            rx,
        }
    }

    /// Remove `role` under `key` if `peer_id` still holds it.
    ///
    /// Returns whether anything was removed. The session goes away with its
    /// last peer.
    pub fn detach(&self, key: &str, role: Role, peer_id: PeerId) -> bool {
        let mut inner = self.inner.lock();
        let Some(session) = inner.sessions.get_mut(key) else {
            return false;
        };

        if session.get(&role).map(|peer| peer.id) != Some(peer_id) {
            return false;
        }
        session.remove(&role);
        let emptied = session.is_empty();
        if emptied {
            inner.sessions.remove(key);
        }

        info!(key, %role, peer = %peer_id, session_closed = emptied, "peer detached");
        true
    }

    /// Forward `text` to the role opposite `from`, if one is attached.
    pub fn route(&self, key: &str, from: Role, text: String) -> RouteOutcome {
        let inner = self.inner.lock();
        let target = inner
            .sessions
            .get(key)
            .and_then(|session| session.get(&from.opposite()));

        let Some(peer) = target else {
            debug!(key, %from, "no peer to route to");
            return RouteOutcome::PeerAbsent;
        };

        match peer.tx.try_send(PeerSignal::Data(text)) {
            Ok(()) => RouteOutcome::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(key, %from, peer = %peer.id, "peer queue full, dropping message");
                RouteOutcome::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(key, %from, "peer already gone");
                RouteOutcome::PeerAbsent
            }
        }
    }

    pub fn session_count(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    /// Roles currently held under `key`, listener first.
    pub fn attached_roles(&self, key: &str) -> Vec<Role> {
        let inner = self.inner.lock();
        let Some(session) = inner.sessions.get(key) else {
            return Vec::new();
        };
        [Role::Listener, Role::Client]
            .into_iter()
            .filter(|role| session.contains_key(role))
            .collect()
    }
}

/// A held role. Dropping it detaches from the registry.
#[derive(Debug)]
pub struct Attachment {
    registry: Arc<SessionRegistry>,
    key: String,
    role: Role,
    peer_id: PeerId,
    rx: mpsc::Receiver<PeerSignal>,
}

impl Attachment {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// Next signal for this peer. `None` once the registry dropped the sender.
    pub async fn recv(&mut self) -> Option<PeerSignal> {
        self.rx.recv().await
    }
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.registry.detach(&self.key, self.role, self.peer_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<SessionRegistry> {
        Arc::new(SessionRegistry::new())
    }

    #[tokio::test]
    async fn route_reaches_opposite_role_only() {
        let registry = registry();
        let mut listener = registry.attach("4444", Role::Listener);
        let mut client = registry.attach("4444", Role::Client);

        assert_eq!(
            registry.route("4444", Role::Client, "whoami".into()),
            RouteOutcome::Delivered
        );
        assert_eq!(listener.recv().await, Some(PeerSignal::Data("whoami".into())));

        assert_eq!(
            registry.route("4444", Role::Listener, "root".into()),
            RouteOutcome::Delivered
        );
        assert_eq!(client.recv().await, Some(PeerSignal::Data("root".into())));
        assert!(listener.rx.try_recv().is_err());
    }

    #[test]
    fn route_without_peer_is_absent() {
        let registry = registry();
        let _listener = registry.attach("4444", Role::Listener);

        assert_eq!(
            registry.route("4444", Role::Listener, "hello?".into()),
            RouteOutcome::PeerAbsent
        );
        assert_eq!(
            registry.route("9999", Role::Client, "hello?".into()),
            RouteOutcome::PeerAbsent
        );
    }

    #[test]
    fn keys_are_isolated() {
        let registry = registry();
        let _a = registry.attach("1", Role::Listener);
        let _b = registry.attach("2", Role::Client);

        assert_eq!(registry.session_count(), 2);
        assert_eq!(
            registry.route("1", Role::Listener, "x".into()),
            RouteOutcome::PeerAbsent
        );
    }

    #[test]
    fn dropping_last_attachment_removes_session() {
        let registry = registry();
        let listener = registry.attach("4444", Role::Listener);
        let client = registry.attach("4444", Role::Client);
        assert_eq!(
            registry.attached_roles("4444"),
            vec![Role::Listener, Role::Client]
        );

        drop(listener);
        assert_eq!(registry.attached_roles("4444"), vec![Role::Client]);
        assert_eq!(registry.session_count(), 1);

        drop(client);
        assert_eq!(registry.session_count(), 0);
        assert!(registry.attached_roles("4444").is_empty());
    }

    #[test]
    fn detach_is_idempotent() {
        let registry = registry();
        let attachment = registry.attach("4444", Role::Client);
        let peer_id = attachment.peer_id();

        assert!(registry.detach("4444", Role::Client, peer_id));
        assert!(!registry.detach("4444", Role::Client, peer_id));
        assert!(!registry.detach("nope", Role::Listener, peer_id));

        drop(attachment);
        assert_eq!(registry.session_count(), 0);
    }

    #[tokio::test]
    async fn reattach_evicts_previous_peer() {
        let registry = registry();
        let mut first = registry.attach("4444", Role::Listener);
        let second = registry.attach("4444", Role::Listener);

        assert_ne!(first.peer_id(), second.peer_id());
        assert_eq!(first.recv().await, Some(PeerSignal::Evicted));
        assert_eq!(first.recv().await, None);

        // The evicted handle must not remove its replacement.
        drop(first);
        assert_eq!(registry.attached_roles("4444"), vec![Role::Listener]);

        drop(second);
        assert_eq!(registry.session_count(), 0);
    }

    #[tokio::test]
    async fn stalled_peer_queue_is_bounded() {
        let registry = registry();
        let mut listener = registry.attach("4444", Role::Listener);
        let _client = registry.attach("4444", Role::Client);
        let chunk = "x".repeat(64 * 1024);

        let outcomes: Vec<RouteOutcome> = (0..2000)
            .map(|_| registry.route("4444", Role::Client, chunk.clone()))
            .collect();

        let delivered = outcomes
            .iter()
            .filter(|outcome| **outcome == RouteOutcome::Delivered)
            .count();
        assert_eq!(delivered, PEER_QUEUE_CAPACITY);
        assert_eq!(outcomes.last(), Some(&RouteOutcome::Dropped));

        // Draining frees room for new traffic.
        assert!(matches!(listener.recv().await, Some(PeerSignal::Data(_))));
        assert_eq!(
            registry.route("4444", Role::Client, "again".into()),
            RouteOutcome::Delivered
        );
    }

    #[tokio::test]
    async fn eviction_closes_peer_with_full_queue() {
        let registry = registry();
        let mut first = registry.attach("4444", Role::Listener);
        let _client = registry.attach("4444", Role::Client);
        for _ in 0..PEER_QUEUE_CAPACITY {
            registry.route("4444", Role::Client, "x".into());
        }

        let _second = registry.attach("4444", Role::Listener);

        let mut drained = 0;
        while let Some(signal) = first.recv().await {
            assert_eq!(signal, PeerSignal::Data("x".into()));
            drained += 1;
        }
        assert_eq!(drained, PEER_QUEUE_CAPACITY);
    }
}
