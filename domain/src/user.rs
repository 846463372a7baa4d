use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use entity_api::users;
use log::*;
use relay::message::User;
use relay::pipeline::Ingress;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Turn a stored row into a User record. Rows missing either field are rejected.
pub fn decode_row(row: users::Model) -> Result<User, Error> {
    match (row.name, row.age) {
        (Some(name), Some(age)) => Ok(User { name, age }),
        (name, age) => Err(Error::decode(format!(
            "websocket row {} is incomplete (name: {name:?}, age: {age:?})",
            row.id
        ))),
    }
}

/// Re-reads the whole `websocket` collection on a fixed interval and queues every
/// row for broadcast to the User pipeline.
pub struct Poller {
    db: Arc<DatabaseConnection>,
    ingress: Ingress<User>,
    interval: Duration,
}

impl Poller {
    pub fn new(db: Arc<DatabaseConnection>, ingress: Ingress<User>, interval: Duration) -> Self {
        Self {
            db,
            ingress,
            interval,
        }
    }

    /// One pass over the collection. Rows that fail to decode are logged and
    /// skipped; returns how many records were queued.
    pub async fn poll_once(&self) -> Result<usize, Error> {
        let rows = entity_api::user::find_all(self.db.as_ref()).await?;
        let mut queued = 0;

        for row in rows {
            match decode_row(row) {
                Ok(user) => {
                    self.ingress.enqueue(user)?;
                    queued += 1;
                }
                Err(e) => warn!("Problem decoding user: {e}"),
            }
        }

        Ok(queued)
    }

    /// Poll until the User broadcast loop goes away. A failed query only costs
    /// that tick.
    pub async fn run(self) {
        info!(
            "Polling the websocket collection every {}ms",
            self.interval.as_millis()
        );

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.poll_once().await {
                Ok(queued) => trace!("Queued {queued} user record(s) for broadcast"),
                Err(e) if e.error_kind == DomainErrorKind::Internal(InternalErrorKind::Relay) => {
                    error!("User broadcast loop is gone, stopping poller: {e}");
                    return;
                }
                Err(e) => error!("Failed to read the websocket collection: {e}"),
            }
        }
    }
}
