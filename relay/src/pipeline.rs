use crate::connection::ConnectionRegistry;
use crate::error::Error;
use crate::message::{self, Record};
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Create the ingress channel and broadcast loop for one record type.
pub fn channel<T: Record>(
    name: &'static str,
    registry: Arc<ConnectionRegistry>,
) -> (Ingress<T>, BroadcastLoop<T>) {
    let (tx, rx) = mpsc::unbounded_channel();

    (
        Ingress { name, sender: tx },
        BroadcastLoop {
            name,
            registry,
            receiver: rx,
        },
    )
}

/// Producer side of a broadcast pipeline. Cheap to clone, one per producer.
pub struct Ingress<T> {
    name: &'static str,
    sender: UnboundedSender<T>,
}

impl<T> Clone for Ingress<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            sender: self.sender.clone(),
        }
    }
}

impl<T: Record> Ingress<T> {
    /// Queue a record for broadcast. Never blocks; fails only when the broadcast
    /// loop has stopped.
    pub fn enqueue(&self, record: T) -> Result<(), Error> {
        self.sender.send(record).map_err(|_| {
            error!("Broadcast loop for {} is gone, record dropped", self.name);
            Error::closed()
        })
    }
}

/// Outcome of pushing one record to the registry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub recipients: usize,
    pub delivered: usize,
    pub dropped: usize,
}

/// Single consumer of an ingress channel. The only writer of its record type to
/// any connection.
pub struct BroadcastLoop<T> {
    name: &'static str,
    registry: Arc<ConnectionRegistry>,
    receiver: UnboundedReceiver<T>,
}

impl<T: Record> BroadcastLoop<T> {
    /// Drain the ingress channel until every producer handle is dropped.
    pub async fn run(mut self) {
        info!("Starting {} broadcast loop", self.name);

        while let Some(record) = self.receiver.recv().await {
            self.broadcast(&record).await;
        }

        info!("All {} producers dropped, broadcast loop exiting", self.name);
    }

    /// Push one record to every registered connection, pruning any connection
    /// whose send fails.
    pub async fn broadcast(&self, record: &T) -> Delivery {
        let text = match message::encode(record) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to encode {} record: {e}", record.record_type());
                return Delivery::default();
            }
        };

        let mut delivery = Delivery::default();

        for connection in self.registry.snapshot() {
            // Removed by its handler or another loop after the snapshot was taken.
            if !self.registry.contains(connection.id()) {
                continue;
            }

            delivery.recipients += 1;

            match connection.send(text.clone()).await {
                Ok(()) => delivery.delivered += 1,
                Err(e) => {
                    warn!(
                        "WebSocket error sending {} to connection {}: {e}",
                        record.record_type(),
                        connection.id()
                    );
                    self.registry.unregister(connection.id());
                    delivery.dropped += 1;
                    if let Err(e) = connection.close().await {
                        debug!("Closing connection {} failed: {e}", connection.id());
                    }
                }
            }
        }

        debug!(
            "Broadcast {} record to {} connection(s), {} dropped",
            record.record_type(),
            delivery.delivered,
            delivery.dropped
        );

        delivery
    }
}
