use crate::error::Error;
use serde::{Deserialize, Serialize};

/// A value that can be pushed to every connected client.
///
/// Each record type gets its own ingress channel and broadcast loop; the type name
/// only shows up in logs.
pub trait Record: Serialize + Send + Sync + 'static {
    fn record_type(&self) -> &'static str;
}

/// Record submitted over `POST /req`.
///
/// Missing fields decode as empty strings; a field of the wrong JSON type is a
/// decode error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
}

/// Record read back from the `websocket` collection by the storage poller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub age: String,
}

impl Record for Data {
    fn record_type(&self) -> &'static str {
        "data"
    }
}

impl Record for User {
    fn record_type(&self) -> &'static str {
        "user"
    }
}

/// Encode a record as the JSON text carried by one WebSocket frame.
pub fn encode<T: Record>(record: &T) -> Result<String, Error> {
    Ok(serde_json::to_string(record)?)
}
