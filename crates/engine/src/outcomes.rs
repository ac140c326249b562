//! Results returned by the coordinators.

use serde::Serialize;
use uuid::Uuid;

use crate::{EntryMode, Refueling, Vehicle};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RefuelingCreated {
    pub entry: Refueling,
    pub mode: EntryMode,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RefuelingUpdated {
    pub updated_entry: Refueling,
    /// The vehicle's odometer now holds the entry's reading.
    pub vehicle_odometer_updated: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RefuelingRemoved {
    pub removed_entry: Refueling,
    /// The entry's trip was rolled back from the vehicle's odometer.
    pub vehicle_odometer_updated: bool,
}

/// Vehicle after a create, update or delete, plus the actor's primary
/// vehicle once the operation is done.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VehicleOutcome {
    pub vehicle: Vehicle,
    pub primary_vehicle_id: Option<Uuid>,
}
