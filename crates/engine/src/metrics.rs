//! Trip distance and average consumption of a refueling.
//!
//! Pure functions, no storage access. Non-positive trips are not rejected
//! here: a zero trip yields an infinite consumption and a negative trip a
//! negative one.

use serde::{Deserialize, Serialize};

use crate::refuelings::BACKFILL_ODOMETER;

/// Values persisted on a refueling entry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripMetrics {
    /// Odometer recorded on the entry.
    pub odometer: i64,
    pub trip_kilometers: i64,
    pub avg_consumption: f64,
}

/// Liters per 100 distance units.
pub fn avg_consumption(liters: f64, trip_kilometers: i64) -> f64 {
    liters / trip_kilometers as f64 * 100.0
}

/// Entry carrying a fresh reading: the trip runs from `previous_odometer`.
pub fn append(previous_odometer: i64, new_odometer: i64, liters: f64) -> TripMetrics {
    let trip_kilometers = new_odometer - previous_odometer;
    TripMetrics {
        odometer: new_odometer,
        trip_kilometers,
        avg_consumption: avg_consumption(liters, trip_kilometers),
    }
}

/// Historical entry: the trip is given, the recorded odometer is the sentinel.
pub fn backfill(trip_kilometers: i64, liters: f64) -> TripMetrics {
    TripMetrics {
        odometer: BACKFILL_ODOMETER,
        trip_kilometers,
        avg_consumption: avg_consumption(liters, trip_kilometers),
    }
}

/// Edit of the latest entry with a new reading.
///
/// The trip is measured from the reading that preceded the entry
/// (`stored_odometer - stored_trip`), so earlier history does not shift.
pub fn reanchor(
    new_odometer: i64,
    stored_odometer: i64,
    stored_trip: i64,
    liters: f64,
) -> TripMetrics {
    append(stored_odometer - stored_trip, new_odometer, liters)
}
