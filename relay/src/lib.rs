//! WebSocket fan-out infrastructure.
//!
//! This crate pushes every record accepted by the relay to every currently
//! connected WebSocket client.
//!
//! # Architecture
//!
//! - **Shared registry**: one `ConnectionRegistry` (a DashMap keyed by a
//!   server-generated `ConnectionId`) holds every live connection. Connection
//!   handlers add and remove entries, broadcast loops remove entries whose send
//!   failed, and nobody touches the map directly.
//! - **One pipeline per record type**: `Data` (HTTP submissions) and `User`
//!   (storage poller) each get an unbounded ingress channel drained by exactly
//!   one `BroadcastLoop`. Both loops write to the same connections.
//! - **Per-connection write lock**: a `Connection` serializes writes to its
//!   transport, so frames from the two loops never interleave.
//! - **Fire and forget**: records are not retained. A client that is not
//!   connected when a record is broadcast never sees it.
//!
//! # Record Flow
//!
//! 1. A producer calls `Ingress::enqueue` (returns immediately)
//! 2. The pipeline's `BroadcastLoop` receives the record and encodes it once
//! 3. The loop takes a snapshot of the registry and sends to each member
//! 4. A member whose send fails is closed and unregistered on the spot
//!
//! # Modules
//!
//! - `connection`: Connection, Transport and ConnectionRegistry
//! - `manager`: Wires the registry to both pipelines
//! - `message`: Record trait, record types and frame encoding
//! - `pipeline`: Ingress channel and broadcast loop
//! - `error`: Relay error type

pub mod connection;
pub mod error;
pub mod manager;
pub mod message;
pub mod pipeline;

pub use error::Error;
pub use manager::{Broadcasters, Manager};
