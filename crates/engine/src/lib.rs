//! Fuel tracker engine.
//!
//! Keeps users, vehicles and refuelings mutually consistent and derives
//! trip distance and fuel consumption for every refueling. All mutations go
//! through [`Engine`], one database transaction per operation.

pub use commands::{
    RefuelingNew, RefuelingUpdate, UserNew, UserUpdate, VehicleNew, VehicleUpdate,
};
pub use error::{EngineError, ErrorKind};
pub use metrics::TripMetrics;
pub use ops::{Engine, EngineBuilder};
pub use outcomes::{RefuelingCreated, RefuelingRemoved, RefuelingUpdated, VehicleOutcome};
pub use refuelings::{BACKFILL_ODOMETER, EntryMode, Refueling};
pub use users::{User, UserSummary};
pub use vehicles::Vehicle;

pub mod guard;
pub mod metrics;

mod commands;
mod error;
mod ops;
mod outcomes;
mod refuelings;
mod users;
mod util;
mod vehicle_co_owners;
mod vehicles;

pub type ResultEngine<T> = Result<T, EngineError>;
