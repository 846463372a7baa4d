use crate::error::Error;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::{Sink, SinkExt};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

pub use axum::extract::ws::Message;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The write half of a client's streaming session.
#[async_trait]
pub trait Transport: Send {
    async fn send_text(&mut self, text: String) -> Result<(), Error>;
    async fn close(&mut self) -> Result<(), Error>;
}

// Any sink of WebSocket messages can carry broadcasts: the split write half of an
// axum `WebSocket` in production, an in-memory channel in tests.
#[async_trait]
impl<S> Transport for S
where
    S: Sink<Message> + Send + Unpin,
    S::Error: StdError + Send + Sync + 'static,
{
    async fn send_text(&mut self, text: String) -> Result<(), Error> {
        self.send(Message::Text(text))
            .await
            .map_err(Error::transport)
    }

    async fn close(&mut self) -> Result<(), Error> {
        SinkExt::close(self).await.map_err(Error::transport)
    }
}

/// One connected streaming client.
///
/// The transport sits behind a per-connection lock: the Data and User broadcast
/// loops share every connection, and a frame must be written whole before the
/// next one starts.
pub struct Connection {
    id: ConnectionId,
    transport: Mutex<Box<dyn Transport>>,
}

impl Connection {
    pub fn new<T>(transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self {
            id: ConnectionId::new(),
            transport: Mutex::new(Box::new(transport)),
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub async fn send(&self, text: String) -> Result<(), Error> {
        self.transport.lock().await.send_text(text).await
    }

    pub async fn close(&self) -> Result<(), Error> {
        self.transport.lock().await.close().await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Connection").field("id", &self.id).finish()
    }
}

/// Concurrency-safe set of live connections, keyed by connection id.
///
/// Mutated by connection handlers (register, unregister on disconnect) and by the
/// broadcast loops (unregister on a failed send) at the same time.
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Arc<Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a connection. Returns `false` and leaves the registry untouched
    /// if a connection with the same id is already present.
    pub fn register(&self, connection: Arc<Connection>) -> bool {
        match self.connections.entry(connection.id().clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(connection);
                true
            }
        }
    }

    /// Unregister a connection. Removing an absent id is a no-op returning `None`.
    pub fn unregister(&self, connection_id: &ConnectionId) -> Option<Arc<Connection>> {
        self.connections
            .remove(connection_id)
            .map(|(_, connection)| connection)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    /// Point-in-time copy of the members. Callers iterate the copy so no shard
    /// lock is held while awaiting on a connection.
    pub fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.connections
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use futures::StreamExt;
    use std::collections::HashSet;

    fn test_connection() -> (Arc<Connection>, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded::<Message>();
        (Arc::new(Connection::new(tx)), rx)
    }

    #[test]
    fn register_is_idempotent_for_the_same_connection() {
        let registry = ConnectionRegistry::new();
        let (connection, _rx) = test_connection();

        assert!(registry.register(Arc::clone(&connection)));
        assert!(!registry.register(Arc::clone(&connection)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_twice_is_safe() {
        let registry = ConnectionRegistry::new();
        let (connection, _rx) = test_connection();
        registry.register(Arc::clone(&connection));

        assert!(registry.unregister(connection.id()).is_some());
        assert!(registry.unregister(connection.id()).is_none());
        assert!(registry.is_empty());
        assert!(!registry.contains(connection.id()));
    }

    #[test]
    fn snapshot_excludes_unregistered_connections() {
        let registry = ConnectionRegistry::new();
        let (first, _rx1) = test_connection();
        let (second, _rx2) = test_connection();
        registry.register(Arc::clone(&first));
        registry.register(Arc::clone(&second));

        registry.unregister(first.id());

        let ids: Vec<ConnectionId> = registry
            .snapshot()
            .iter()
            .map(|c| c.id().clone())
            .collect();
        assert_eq!(ids, vec![second.id().clone()]);
    }

    #[tokio::test]
    async fn send_writes_a_text_frame_to_the_transport() {
        let (connection, mut rx) = test_connection();

        connection.send("hello".to_string()).await.unwrap();

        assert_eq!(rx.next().await, Some(Message::Text("hello".to_string())));
    }

    #[tokio::test]
    async fn send_fails_once_the_peer_is_gone() {
        let (connection, rx) = test_connection();
        drop(rx);

        let err = connection.send("hello".to_string()).await.unwrap_err();

        assert_eq!(err.error_kind, crate::error::ErrorKind::Transport);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_register_unregister_and_snapshot_never_corrupt_the_registry() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut receivers = Vec::new();
        let mut kept = Vec::new();
        let mut dropped = Vec::new();

        for i in 0..64 {
            let (connection, rx) = test_connection();
            receivers.push(rx);
            if i % 2 == 0 {
                kept.push(connection);
            } else {
                dropped.push(connection);
            }
        }

        let mut handles = Vec::new();
        for connection in kept.iter().chain(dropped.iter()) {
            let registry = Arc::clone(&registry);
            let connection = Arc::clone(connection);
            handles.push(tokio::spawn(async move {
                registry.register(connection);
            }));
        }
        for connection in dropped.iter() {
            let registry = Arc::clone(&registry);
            let connection = Arc::clone(connection);
            handles.push(tokio::spawn(async move {
                // Spin until our own register task has landed, then remove twice.
                while !registry.contains(connection.id()) {
                    tokio::task::yield_now().await;
                }
                registry.unregister(connection.id());
                registry.unregister(connection.id());
            }));
        }
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let snapshot = registry.snapshot();
                let unique: HashSet<ConnectionId> =
                    snapshot.iter().map(|c| c.id().clone()).collect();
                assert_eq!(unique.len(), snapshot.len());
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        let remaining: HashSet<ConnectionId> = registry
            .snapshot()
            .iter()
            .map(|c| c.id().clone())
            .collect();
        let expected: HashSet<ConnectionId> = kept.iter().map(|c| c.id().clone()).collect();
        assert_eq!(remaining, expected);
        assert_eq!(registry.len(), kept.len());
    }
}
