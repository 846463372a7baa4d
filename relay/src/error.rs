//! Error types for the relay core
use std::error::Error as StdError;
use std::fmt;

/// Errors raised while moving a record from an ingress channel onto a connection.
///
/// None of these are fatal to the process: a `Transport` error only ever costs the
/// connection it happened on, an `Encode` error costs the single record, and `Closed`
/// tells a producer that the broadcast loop behind its ingress has gone away.
#[derive(Debug)]
pub struct Error {
    // Underlying error emitted by the transport or the encoder
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    // Enum representing which category of error
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    // Writing to or closing a connection failed
    Transport,
    // A record could not be serialized into a frame
    Encode,
    // The broadcast loop consuming an ingress channel is gone
    Closed,
}

impl Error {
    pub(crate) fn transport<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Error {
            source: Some(err.into()),
            error_kind: ErrorKind::Transport,
        }
    }

    pub(crate) fn closed() -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::Closed,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Relay Error ({:?}): {source}", self.error_kind),
            None => write!(f, "Relay Error ({:?})", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Encode,
        }
    }
}
