//! Refueling lifecycle: create, update, delete and reads.
//!
//! The vehicle's `odometer` always mirrors the reading of the entry last
//! marked authoritative. Append-mode creates and re-anchoring updates move
//! it forward; deleting the latest entry rolls its trip back.

use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use tracing::debug;
use uuid::Uuid;

use crate::{
    EngineError, EntryMode, Refueling, RefuelingCreated, RefuelingNew, RefuelingRemoved,
    RefuelingUpdate, RefuelingUpdated, ResultEngine, guard, metrics, refuelings,
    util::{parse_uuid, required, validate_liters, validate_odometer},
    vehicles,
};

use super::{Engine, latest::is_latest_among, with_tx};

/// Mode-specific input of a new refueling.
enum Reading {
    Odometer(i64),
    Trip(i64),
}

impl Engine {
    /// Log a refueling against a vehicle.
    ///
    /// Any existing user may log against any vehicle. In append mode the
    /// supplied reading becomes the vehicle's odometer.
    pub async fn create_refueling(
        &self,
        actor: Uuid,
        payload: RefuelingNew,
    ) -> ResultEngine<RefuelingCreated> {
        let mode = EntryMode::try_from(required(payload.mode.as_deref(), "type")?)?;
        let vehicle_id = required(payload.vehicle, "vehicle")?;
        let date = required(payload.date, "date")?;
        let liters = validate_liters(required(payload.liters, "liters")?)?;
        let reading = match mode {
            EntryMode::Append => Reading::Odometer(validate_odometer(
                required(payload.odometer, "odometer")?,
                "odometer",
            )?),
            EntryMode::Backfill => Reading::Trip(required(payload.trip, "trip")?),
        };

        let _vehicle_guard = self.vehicle_locks.acquire(vehicle_id).await;
        with_tx!(self, |db_tx| {
            self.require_user_model(&db_tx, actor).await?;
            let vehicle = self.require_vehicle_model(&db_tx, vehicle_id).await?;

            let trip = match reading {
                Reading::Odometer(odometer) => metrics::append(vehicle.odometer, odometer, liters),
                Reading::Trip(trip) => metrics::backfill(trip, liters),
            };

            let entry = Refueling {
                id: Uuid::new_v4(),
                date,
                odometer: trip.odometer,
                liters,
                trip_kilometers: trip.trip_kilometers,
                avg_consumption: trip.avg_consumption,
                vehicle: vehicle_id,
                user: actor,
            };
            refuelings::ActiveModel::from(&entry).insert(&db_tx).await?;

            if mode == EntryMode::Append {
                vehicles::set_odometer(vehicle_id, entry.odometer)
                    .update(&db_tx)
                    .await?;
                debug!(
                    %vehicle_id,
                    from = vehicle.odometer,
                    to = entry.odometer,
                    "vehicle odometer advanced"
                );
            }

            Ok(RefuelingCreated { entry, mode })
        })
    }

    /// Edit a refueling.
    ///
    /// Allowed to whoever logged the entry and to the vehicle's owner. The
    /// edit re-anchors the vehicle's odometer when the vehicle has a single
    /// entry, or when this entry is the latest and its date is unchanged
    /// (compared to the second). Otherwise the supplied trip is taken as is.
    pub async fn update_refueling(
        &self,
        actor: Uuid,
        refueling_id: Uuid,
        payload: RefuelingUpdate,
    ) -> ResultEngine<RefuelingUpdated> {
        let date = required(payload.date, "date")?;
        let odometer = validate_odometer(required(payload.odometer, "odometer")?, "odometer")?;
        let liters = validate_liters(required(payload.liters, "liters")?)?;
        let trip = required(payload.trip, "trip")?;

        let vehicle_id = self.refueling_vehicle_id(refueling_id).await?;
        let _vehicle_guard = self.vehicle_locks.acquire(vehicle_id).await;
        with_tx!(self, |db_tx| {
            let stored = self.require_refueling_model(&db_tx, refueling_id).await?;
            let vehicle = self.require_vehicle(&db_tx, vehicle_id).await?;
            let current = Refueling::try_from(stored.clone())?;
            if !guard::can_modify_refueling(actor, &current, &vehicle) {
                return Err(EngineError::Unauthorized(
                    "only the refueler or the vehicle owner can edit this entry".to_string(),
                ));
            }

            let entries = self.vehicle_refuelings(&db_tx, &stored.vehicle_id).await?;
            let latest = is_latest_among(&stored, &entries);
            let date_unchanged = stored.date.timestamp() == date.timestamp();
            let reanchor = vehicle.refuelings.len() == 1 || (latest && date_unchanged);

            let trip = if reanchor {
                metrics::reanchor(odometer, stored.odometer, stored.trip_kilometers, liters)
            } else {
                metrics::TripMetrics {
                    odometer,
                    ..metrics::backfill(trip, liters)
                }
            };

            let updated_entry = Refueling {
                date,
                odometer: trip.odometer,
                liters,
                trip_kilometers: trip.trip_kilometers,
                avg_consumption: trip.avg_consumption,
                ..current
            };
            refuelings::ActiveModel::from(&updated_entry)
                .update(&db_tx)
                .await?;

            if reanchor {
                vehicles::set_odometer(vehicle.id, odometer)
                    .update(&db_tx)
                    .await?;
                debug!(
                    vehicle_id = %vehicle.id,
                    from = vehicle.odometer,
                    to = odometer,
                    "vehicle odometer re-anchored"
                );
            }

            Ok(RefuelingUpdated {
                updated_entry,
                vehicle_odometer_updated: reanchor,
            })
        })
    }

    /// Remove a refueling.
    ///
    /// Allowed to whoever logged the entry and to the vehicle's owner. When
    /// the entry was the latest one and still holds the vehicle's reading,
    /// its trip is subtracted from the vehicle's odometer.
    pub async fn delete_refueling(
        &self,
        actor: Uuid,
        refueling_id: Uuid,
    ) -> ResultEngine<RefuelingRemoved> {
        let vehicle_id = self.refueling_vehicle_id(refueling_id).await?;
        let _vehicle_guard = self.vehicle_locks.acquire(vehicle_id).await;
        with_tx!(self, |db_tx| {
            let stored = self.require_refueling_model(&db_tx, refueling_id).await?;
            let vehicle = self.require_vehicle(&db_tx, vehicle_id).await?;
            let removed_entry = Refueling::try_from(stored.clone())?;
            if !guard::can_modify_refueling(actor, &removed_entry, &vehicle) {
                return Err(EngineError::Unauthorized(
                    "only the refueler or the vehicle owner can remove this entry".to_string(),
                ));
            }

            let latest = self.refueling_is_latest(&db_tx, &stored).await?;

            refuelings::Entity::delete_by_id(stored.id.clone())
                .exec(&db_tx)
                .await?;

            let rollback = latest && removed_entry.odometer == vehicle.odometer;
            if rollback {
                let odometer = vehicle.odometer - removed_entry.trip_kilometers;
                vehicles::set_odometer(vehicle_id, odometer)
                    .update(&db_tx)
                    .await?;
                debug!(
                    %vehicle_id,
                    from = vehicle.odometer,
                    to = odometer,
                    "vehicle odometer rolled back"
                );
            }

            Ok(RefuelingRemoved {
                removed_entry,
                vehicle_odometer_updated: rollback,
            })
        })
    }

    /// Return a refueling.
    pub async fn refueling(&self, refueling_id: Uuid) -> ResultEngine<Refueling> {
        with_tx!(self, |db_tx| {
            let model = self.require_refueling_model(&db_tx, refueling_id).await?;
            Refueling::try_from(model)
        })
    }

    /// Refuelings of a vehicle, oldest first.
    pub async fn refuelings_for_vehicle(&self, vehicle_id: Uuid) -> ResultEngine<Vec<Refueling>> {
        with_tx!(self, |db_tx| {
            let vehicle = self.require_vehicle_model(&db_tx, vehicle_id).await?;
            self.vehicle_refuelings(&db_tx, &vehicle.id)
                .await?
                .into_iter()
                .map(Refueling::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Vehicle a refueling belongs to, read ahead of taking the vehicle lock.
    async fn refueling_vehicle_id(&self, refueling_id: Uuid) -> ResultEngine<Uuid> {
        let model = refuelings::Entity::find()
            .filter(refuelings::Column::Id.eq(refueling_id.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("refueling not exists".to_string()))?;
        parse_uuid(&model.vehicle_id, "vehicle")
    }
}

