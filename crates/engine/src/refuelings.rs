//! Refueling primitives.
//!
//! A `Refueling` records liters filled at a point in time together with the
//! trip driven since the previous fill. Entries created in [`EntryMode::Append`]
//! hold the vehicle's authoritative odometer reading; entries created in
//! [`EntryMode::Backfill`] record `0` instead.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// Odometer value recorded on entries that are not the latest reading.
pub const BACKFILL_ODOMETER: i64 = 0;

/// How a new refueling relates to the vehicle's history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryMode {
    /// The entry carries a fresh odometer reading and becomes the latest.
    #[serde(rename = "addEnd")]
    Append,
    /// The entry is historical; the trip is supplied directly.
    #[serde(rename = "addMiddle")]
    Backfill,
}

impl EntryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Append => "addEnd",
            Self::Backfill => "addMiddle",
        }
    }
}

impl TryFrom<&str> for EntryMode {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "addEnd" => Ok(Self::Append),
            "addMiddle" => Ok(Self::Backfill),
            other => Err(EngineError::Validation(format!(
                "invalid refueling type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Refueling {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub odometer: i64,
    pub liters: f64,
    pub trip_kilometers: i64,
    /// Liters per 100 distance units.
    pub avg_consumption: f64,
    pub vehicle: Uuid,
    /// Who logged the entry, not necessarily the owner.
    pub user: Uuid,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "refuelings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub date: DateTimeUtc,
    pub odometer: i64,
    pub liters: f64,
    pub trip_kilometers: i64,
    pub avg_consumption: f64,
    pub vehicle_id: String,
    pub user_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicles::Entity",
        from = "Column::VehicleId",
        to = "super::vehicles::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Vehicles,
}

impl Related<super::vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Refueling> for ActiveModel {
    fn from(entry: &Refueling) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            date: ActiveValue::Set(entry.date),
            odometer: ActiveValue::Set(entry.odometer),
            liters: ActiveValue::Set(entry.liters),
            trip_kilometers: ActiveValue::Set(entry.trip_kilometers),
            avg_consumption: ActiveValue::Set(entry.avg_consumption),
            vehicle_id: ActiveValue::Set(entry.vehicle.to_string()),
            user_id: ActiveValue::Set(entry.user.to_string()),
        }
    }
}

impl TryFrom<Model> for Refueling {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "refueling")?,
            date: model.date,
            odometer: model.odometer,
            liters: model.liters,
            trip_kilometers: model.trip_kilometers,
            avg_consumption: model.avg_consumption,
            vehicle: parse_uuid(&model.vehicle_id, "vehicle")?,
            user: parse_uuid(&model.user_id, "user")?,
        })
    }
}
