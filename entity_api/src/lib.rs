use log::*;
use sea_orm::DatabaseConnection;

pub use entity::{users, Id};

pub mod error;
pub mod user;

/// Inserts a handful of sample rows into the `websocket` collection, including
/// one row without an age that the poller will log and skip.
pub async fn seed_database(db: &DatabaseConnection) -> Result<(), error::Error> {
    let rows = [
        (Some("alice"), Some("30")),
        (Some("bob"), Some("41")),
        (Some("carol"), Some("25")),
        (Some("dave"), None),
    ];

    for (name, age) in rows {
        let user = user::create(db, name.map(str::to_owned), age.map(str::to_owned)).await?;
        info!("Seeded websocket row {}", user.id);
    }

    Ok(())
}
