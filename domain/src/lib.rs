//! Producers feeding the relay's broadcast pipelines.
//!
//! - `data`: decodes `POST /req` bodies and hands them to the Data pipeline.
//! - `user`: periodically reads the `websocket` collection and hands every row
//!   to the User pipeline.

pub use entity_api::{users, Id};
pub use relay::message::{Data, User};

pub mod data;
pub mod error;
pub mod user;
