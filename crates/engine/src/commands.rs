//! Payloads accepted by the coordinators.
//!
//! Fields are optional because payloads arrive from an outer layer and a
//! missing field is a [`Validation`](crate::EngineError::Validation) failure
//! reported by the coordinator, not a deserialization error. The
//! constructors below fill every field a well-formed request needs.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::EntryMode;

/// Log a new refueling.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RefuelingNew {
    /// `addEnd` or `addMiddle`.
    #[serde(rename = "type")]
    pub mode: Option<String>,
    pub vehicle: Option<Uuid>,
    pub date: Option<DateTime<Utc>>,
    /// Required in append mode.
    pub odometer: Option<i64>,
    pub liters: Option<f64>,
    /// Required in backfill mode.
    pub trip: Option<i64>,
}

impl RefuelingNew {
    #[must_use]
    pub fn append(vehicle: Uuid, date: DateTime<Utc>, odometer: i64, liters: f64) -> Self {
        Self {
            mode: Some(EntryMode::Append.as_str().to_string()),
            vehicle: Some(vehicle),
            date: Some(date),
            odometer: Some(odometer),
            liters: Some(liters),
            trip: None,
        }
    }

    #[must_use]
    pub fn backfill(vehicle: Uuid, date: DateTime<Utc>, trip: i64, liters: f64) -> Self {
        Self {
            mode: Some(EntryMode::Backfill.as_str().to_string()),
            vehicle: Some(vehicle),
            date: Some(date),
            odometer: None,
            liters: Some(liters),
            trip: Some(trip),
        }
    }
}

/// Edit an existing refueling. Every field is mandatory.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RefuelingUpdate {
    pub date: Option<DateTime<Utc>>,
    pub odometer: Option<i64>,
    pub liters: Option<f64>,
    pub trip: Option<i64>,
}

impl RefuelingUpdate {
    #[must_use]
    pub fn new(date: DateTime<Utc>, odometer: i64, liters: f64, trip: i64) -> Self {
        Self {
            date: Some(date),
            odometer: Some(odometer),
            liters: Some(liters),
            trip: Some(trip),
        }
    }
}

/// Register a vehicle owned by the acting user.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VehicleNew {
    pub name: Option<String>,
    pub license_plate: Option<String>,
    pub odometer: Option<i64>,
    pub co_owners: Option<Vec<Uuid>>,
    /// Make the new vehicle the owner's primary one.
    pub primary_vehicle: Option<bool>,
}

impl VehicleNew {
    #[must_use]
    pub fn new(name: impl Into<String>, license_plate: impl Into<String>, odometer: i64) -> Self {
        Self {
            name: Some(name.into()),
            license_plate: Some(license_plate.into()),
            odometer: Some(odometer),
            co_owners: None,
            primary_vehicle: None,
        }
    }

    #[must_use]
    pub fn co_owners(mut self, co_owners: Vec<Uuid>) -> Self {
        self.co_owners = Some(co_owners);
        self
    }

    #[must_use]
    pub fn primary(mut self, primary: bool) -> Self {
        self.primary_vehicle = Some(primary);
        self
    }
}

/// Edit a vehicle. Omitted fields keep their stored value.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VehicleUpdate {
    pub name: Option<String>,
    pub license_plate: Option<String>,
    pub odometer: Option<i64>,
    /// Full replacement of the co-owner set.
    pub co_owners: Option<Vec<Uuid>>,
    /// `true` points the actor's primary vehicle here, `false` clears it.
    pub primary_vehicle: Option<bool>,
}

impl VehicleUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn license_plate(mut self, license_plate: impl Into<String>) -> Self {
        self.license_plate = Some(license_plate.into());
        self
    }

    #[must_use]
    pub fn odometer(mut self, odometer: i64) -> Self {
        self.odometer = Some(odometer);
        self
    }

    #[must_use]
    pub fn co_owners(mut self, co_owners: Vec<Uuid>) -> Self {
        self.co_owners = Some(co_owners);
        self
    }

    #[must_use]
    pub fn primary(mut self, primary: bool) -> Self {
        self.primary_vehicle = Some(primary);
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.license_plate.is_none()
            && self.odometer.is_none()
            && self.co_owners.is_none()
            && self.primary_vehicle.is_none()
    }
}

/// Register a user.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UserNew {
    pub name: Option<String>,
    pub username: Option<String>,
    /// Opaque credential, stored as given.
    pub password: Option<String>,
}

impl UserNew {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }
}

/// Edit the acting user's own details.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refueling_payload_uses_wire_names() {
        let payload: RefuelingNew = serde_json::from_str(
            r#"{"type":"addMiddle","vehicle":"67e55044-10b1-426f-9247-bb680e5fe0c8","date":"2021-03-01T10:00:00Z","liters":45.23,"trip":769}"#,
        )
        .unwrap();
        assert_eq!(payload.mode.as_deref(), Some("addMiddle"));
        assert_eq!(payload.trip, Some(769));
        assert!(payload.odometer.is_none());
    }

    #[test]
    fn empty_vehicle_update() {
        assert!(VehicleUpdate::new().is_empty());
        assert!(!VehicleUpdate::new().primary(true).is_empty());
    }
}
