use crate::connection::{Connection, ConnectionId, ConnectionRegistry, Transport};
use crate::message::{Data, User};
use crate::pipeline::{self, BroadcastLoop, Ingress};
use log::*;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Owns the shared connection registry and the producer handles of both
/// broadcast pipelines.
pub struct Manager {
    registry: Arc<ConnectionRegistry>,
    data: Ingress<Data>,
    users: Ingress<User>,
}

/// The broadcast loops created alongside a `Manager`, not yet running.
pub struct Broadcasters {
    pub data: BroadcastLoop<Data>,
    pub users: BroadcastLoop<User>,
}

impl Broadcasters {
    /// Spawn both loops onto the current tokio runtime.
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        vec![tokio::spawn(self.data.run()), tokio::spawn(self.users.run())]
    }
}

impl Manager {
    pub fn new() -> (Self, Broadcasters) {
        let registry = Arc::new(ConnectionRegistry::new());
        let (data, data_loop) = pipeline::channel::<Data>("data", Arc::clone(&registry));
        let (users, users_loop) = pipeline::channel::<User>("user", Arc::clone(&registry));

        (
            Self {
                registry,
                data,
                users,
            },
            Broadcasters {
                data: data_loop,
                users: users_loop,
            },
        )
    }

    /// Wrap a transport in a new connection and register it.
    pub fn register_connection<T>(&self, transport: T) -> Arc<Connection>
    where
        T: Transport + 'static,
    {
        let connection = Arc::new(Connection::new(transport));
        self.registry.register(Arc::clone(&connection));
        info!(
            "Registered connection {}, number of clients {}",
            connection.id(),
            self.registry.len()
        );
        connection
    }

    /// Unregister a connection by ID
    pub fn unregister_connection(&self, connection_id: &ConnectionId) {
        if self.registry.unregister(connection_id).is_some() {
            info!(
                "Client {connection_id} left, number of clients {}",
                self.registry.len()
            );
        }
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    pub fn data_ingress(&self) -> &Ingress<Data> {
        &self.data
    }

    pub fn user_ingress(&self) -> &Ingress<User> {
        &self.users
    }
}
