use super::error::Error;
use chrono::Utc;
use entity::users::{ActiveModel, Entity, Model};
use log::*;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Every row of the `websocket` collection, unfiltered.
pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<Model>, Error> {
    Ok(Entity::find().all(db).await?)
}

pub async fn create(
    db: &DatabaseConnection,
    name: Option<String>,
    age: Option<String>,
) -> Result<Model, Error> {
    debug!("New websocket row to be inserted: name={name:?}, age={age:?}");

    let user = ActiveModel {
        name: Set(name),
        age: Set(age),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(user.insert(db).await?)
}
