//! Vehicles table and the `Vehicle` view handed to callers.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ResultEngine, util::parse_uuid};

/// A vehicle with one owner and any number of co-owners.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub license_plate: String,
    /// Authoritative odometer reading.
    pub odometer: i64,
    pub owner: Uuid,
    pub co_owners: Vec<Uuid>,
    /// Refueling ids ordered by date.
    pub refuelings: Vec<Uuid>,
}

impl Vehicle {
    pub fn new(name: String, license_plate: String, odometer: i64, owner: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            license_plate,
            odometer,
            owner,
            co_owners: Vec::new(),
            refuelings: Vec::new(),
        }
    }

    pub(crate) fn from_model(
        model: Model,
        co_owners: Vec<Uuid>,
        refuelings: Vec<Uuid>,
    ) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "vehicle")?,
            name: model.name,
            license_plate: model.license_plate,
            odometer: model.odometer,
            owner: parse_uuid(&model.owner_id, "user")?,
            co_owners,
            refuelings,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub license_plate: String,
    pub odometer: i64,
    pub owner_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Owner,
    #[sea_orm(has_many = "super::vehicle_co_owners::Entity")]
    CoOwners,
    #[sea_orm(has_many = "super::refuelings::Entity")]
    Refuelings,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::vehicle_co_owners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CoOwners.def()
    }
}

impl Related<super::refuelings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Refuelings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Vehicle> for ActiveModel {
    fn from(value: &Vehicle) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            license_plate: ActiveValue::Set(value.license_plate.clone()),
            odometer: ActiveValue::Set(value.odometer),
            owner_id: ActiveValue::Set(value.owner.to_string()),
        }
    }
}

/// Partial update touching only the odometer reading.
pub(crate) fn set_odometer(vehicle_id: Uuid, odometer: i64) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(vehicle_id.to_string()),
        odometer: ActiveValue::Set(odometer),
        ..Default::default()
    }
}
