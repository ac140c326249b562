//! Users table and the `User` view handed to callers.
//!
//! `vehicles` is not a column: it is derived from vehicle ownership and
//! co-ownership whenever a user is materialized.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ResultEngine, util::parse_uuid};

/// A person logging refuelings.
///
/// The password credential never leaves the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    /// Vehicles the user owns or co-uses.
    pub vehicles: Vec<Uuid>,
    /// Always a member of `vehicles` when set.
    pub primary_vehicle: Option<Uuid>,
}

impl User {
    pub(crate) fn from_model(model: Model, vehicles: Vec<Uuid>) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            name: model.name,
            username: model.username,
            vehicles,
            primary_vehicle: model
                .primary_vehicle
                .as_deref()
                .map(|id| parse_uuid(id, "vehicle"))
                .transpose()?,
        })
    }
}

/// Lightweight listing entry, without derived relations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub username: String,
}

impl TryFrom<Model> for UserSummary {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            name: model.name,
            username: model.username,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    pub primary_vehicle: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::vehicles::Entity")]
    Vehicles,
    #[sea_orm(has_many = "super::vehicle_co_owners::Entity")]
    CoOwnerships,
}

impl Related<super::vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl Related<super::vehicle_co_owners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CoOwnerships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Partial update touching only the primary vehicle pointer.
pub(crate) fn set_primary_vehicle(user_id: &str, vehicle_id: Option<Uuid>) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(user_id.to_string()),
        primary_vehicle: ActiveValue::Set(vehicle_id.map(|id| id.to_string())),
        ..Default::default()
    }
}
