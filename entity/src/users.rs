//! SeaORM Entity for the `websocket` table.
//! Every row is re-broadcast to connected clients as a User record on each poll.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "fanout_relay", table_name = "websocket")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    // Nullable: rows written by other tools may omit either field, and such a
    // row cannot be decoded into a User.
    pub name: Option<String>,
    pub age: Option<String>,

    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
