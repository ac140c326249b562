//! Vehicle lifecycle: create, update, delete and reads.
//!
//! Co-ownership lives in `vehicle_co_owners`; users only store their
//! `primary_vehicle` pointer, which is cleared whenever they lose access to
//! the vehicle it names.

use std::collections::HashSet;

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Vehicle, VehicleNew, VehicleOutcome, VehicleUpdate, guard,
    refuelings, users,
    util::{normalize_optional_text, parse_uuid, required, required_text, validate_odometer},
    vehicle_co_owners, vehicles,
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a vehicle owned by `actor`.
    pub async fn create_vehicle(
        &self,
        actor: Uuid,
        payload: VehicleNew,
    ) -> ResultEngine<VehicleOutcome> {
        let name = required_text(payload.name.as_deref(), "name")?;
        let license_plate = required_text(payload.license_plate.as_deref(), "license_plate")?;
        let odometer = validate_odometer(required(payload.odometer, "odometer")?, "odometer")?;
        let co_owners = dedup(payload.co_owners.unwrap_or_default());

        with_tx!(self, |db_tx| {
            self.require_user_model(&db_tx, actor).await?;
            self.check_co_owners(&db_tx, actor, &co_owners).await?;
            self.check_license_plate_free(&db_tx, &license_plate, None)
                .await?;

            let vehicle = Vehicle::new(name, license_plate, odometer, actor);
            vehicles::ActiveModel::from(&vehicle).insert(&db_tx).await?;
            self.add_co_owners(&db_tx, vehicle.id, &co_owners).await?;

            if payload.primary_vehicle.unwrap_or(false) {
                users::set_primary_vehicle(&actor.to_string(), Some(vehicle.id))
                    .update(&db_tx)
                    .await?;
            }

            info!(vehicle_id = %vehicle.id, owner = %actor, "vehicle created");
            let vehicle = self.require_vehicle(&db_tx, vehicle.id).await?;
            let primary_vehicle_id = self.primary_vehicle_of(&db_tx, actor).await?;
            Ok(VehicleOutcome {
                vehicle,
                primary_vehicle_id,
            })
        })
    }

    /// Edit a vehicle.
    ///
    /// The owner may change every field and the co-owner set. Anybody else
    /// may only move their own primary vehicle pointer, and only onto a
    /// vehicle they co-use.
    pub async fn update_vehicle(
        &self,
        actor: Uuid,
        vehicle_id: Uuid,
        payload: VehicleUpdate,
    ) -> ResultEngine<VehicleOutcome> {
        if payload.is_empty() {
            return Err(EngineError::Validation(
                "missing mandatory parameters".to_string(),
            ));
        }
        let odometer = payload
            .odometer
            .map(|odometer| validate_odometer(odometer, "odometer"))
            .transpose()?;

        let _vehicle_guard = self.vehicle_locks.acquire(vehicle_id).await;
        with_tx!(self, |db_tx| {
            let stored = self.require_vehicle(&db_tx, vehicle_id).await?;
            let actor_model = self.require_user_model(&db_tx, actor).await?;

            let mut updated = stored.clone();
            if let Some(name) = normalize_optional_text(payload.name.as_deref()) {
                updated.name = name;
            }
            if let Some(plate) = normalize_optional_text(payload.license_plate.as_deref()) {
                updated.license_plate = plate;
            }
            if let Some(odometer) = odometer {
                updated.odometer = odometer;
            }
            if let Some(co_owners) = payload.co_owners.clone() {
                updated.co_owners = dedup(co_owners);
            }

            let previous: HashSet<Uuid> = stored.co_owners.iter().copied().collect();
            let desired: HashSet<Uuid> = updated.co_owners.iter().copied().collect();
            let added: Vec<Uuid> = updated
                .co_owners
                .iter()
                .filter(|id| !previous.contains(id))
                .copied()
                .collect();
            let removed: Vec<Uuid> = stored
                .co_owners
                .iter()
                .filter(|id| !desired.contains(id))
                .copied()
                .collect();

            let fields_changed = updated.name != stored.name
                || updated.license_plate != stored.license_plate
                || updated.odometer != stored.odometer;
            let owner_change = fields_changed || !added.is_empty() || !removed.is_empty();

            if !guard::is_owner(actor, &stored) {
                if owner_change {
                    return Err(EngineError::Unauthorized(
                        "only the owner can edit this vehicle".to_string(),
                    ));
                }
                if payload.primary_vehicle == Some(true) && !guard::is_co_owner(actor, &stored) {
                    return Err(EngineError::Unauthorized(
                        "vehicle is not shared with this user".to_string(),
                    ));
                }
            }

            if owner_change {
                self.check_co_owners(&db_tx, stored.owner, &added).await?;
                if updated.license_plate != stored.license_plate {
                    self.check_license_plate_free(&db_tx, &updated.license_plate, Some(vehicle_id))
                        .await?;
                }
            }

            if fields_changed {
                vehicles::ActiveModel::from(&updated).update(&db_tx).await?;
            }
            self.add_co_owners(&db_tx, vehicle_id, &added).await?;
            self.remove_co_owners(&db_tx, vehicle_id, &removed).await?;
            if !added.is_empty() || !removed.is_empty() {
                debug!(
                    %vehicle_id,
                    added = added.len(),
                    removed = removed.len(),
                    "co-owners reconciled"
                );
            }

            match payload.primary_vehicle {
                Some(true) => {
                    users::set_primary_vehicle(&actor_model.id, Some(vehicle_id))
                        .update(&db_tx)
                        .await?;
                }
                Some(false) if actor_model.primary_vehicle == Some(vehicle_id.to_string()) => {
                    users::set_primary_vehicle(&actor_model.id, None)
                        .update(&db_tx)
                        .await?;
                }
                _ => {}
            }

            let vehicle = self.require_vehicle(&db_tx, vehicle_id).await?;
            let primary_vehicle_id = self.primary_vehicle_of(&db_tx, actor).await?;
            Ok(VehicleOutcome {
                vehicle,
                primary_vehicle_id,
            })
        })
    }

    /// Remove a vehicle with its refuelings. Owner only.
    ///
    /// The returned vehicle is the state right before removal.
    pub async fn delete_vehicle(
        &self,
        actor: Uuid,
        vehicle_id: Uuid,
    ) -> ResultEngine<VehicleOutcome> {
        let _vehicle_guard = self.vehicle_locks.acquire(vehicle_id).await;
        with_tx!(self, |db_tx| {
            let vehicle = self.require_vehicle(&db_tx, vehicle_id).await?;
            if !guard::is_owner(actor, &vehicle) {
                return Err(EngineError::Unauthorized(
                    "only the owner can delete this vehicle".to_string(),
                ));
            }

            self.remove_vehicle(&db_tx, &vehicle).await?;

            let primary_vehicle_id = self.primary_vehicle_of(&db_tx, actor).await?;
            Ok(VehicleOutcome {
                vehicle,
                primary_vehicle_id,
            })
        })
    }

    /// Return a vehicle with its co-owners and refuelings.
    pub async fn vehicle(&self, vehicle_id: Uuid) -> ResultEngine<Vehicle> {
        with_tx!(self, |db_tx| self.require_vehicle(&db_tx, vehicle_id).await)
    }

    /// Vehicles a user owns or co-uses.
    pub async fn vehicles_for_user(&self, user_id: Uuid) -> ResultEngine<Vec<Vehicle>> {
        with_tx!(self, |db_tx| {
            let user = self.require_user_model(&db_tx, user_id).await?;
            let mut vehicles = Vec::new();
            for vehicle_id in self.member_vehicle_ids(&db_tx, &user.id).await? {
                vehicles.push(self.require_vehicle(&db_tx, vehicle_id).await?);
            }
            Ok(vehicles)
        })
    }

    /// Delete a vehicle, its refuelings and every reference to it.
    pub(super) async fn remove_vehicle(
        &self,
        db: &DatabaseTransaction,
        vehicle: &Vehicle,
    ) -> ResultEngine<()> {
        let members: Vec<Uuid> = std::iter::once(vehicle.owner)
            .chain(vehicle.co_owners.iter().copied())
            .collect();
        self.clear_primary_vehicle_refs(db, vehicle.id, &members)
            .await?;

        let refuelings = refuelings::Entity::delete_many()
            .filter(refuelings::Column::VehicleId.eq(vehicle.id.to_string()))
            .exec(db)
            .await?;
        vehicle_co_owners::Entity::delete_many()
            .filter(vehicle_co_owners::Column::VehicleId.eq(vehicle.id.to_string()))
            .exec(db)
            .await?;
        vehicles::Entity::delete_by_id(vehicle.id.to_string())
            .exec(db)
            .await?;

        info!(
            vehicle_id = %vehicle.id,
            refuelings = refuelings.rows_affected,
            co_owners = vehicle.co_owners.len(),
            "vehicle removed"
        );
        Ok(())
    }

    pub(super) async fn primary_vehicle_of(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<Option<Uuid>> {
        self.require_user_model(db, user_id)
            .await?
            .primary_vehicle
            .as_deref()
            .map(|id| parse_uuid(id, "vehicle"))
            .transpose()
    }

    /// Co-owners must be existing users other than the owner.
    async fn check_co_owners(
        &self,
        db: &DatabaseTransaction,
        owner: Uuid,
        co_owners: &[Uuid],
    ) -> ResultEngine<()> {
        for &user_id in co_owners {
            if user_id == owner {
                return Err(EngineError::Validation(
                    "the owner cannot be a co-owner".to_string(),
                ));
            }
            self.require_user_model(db, user_id).await?;
        }
        Ok(())
    }

    async fn check_license_plate_free(
        &self,
        db: &DatabaseTransaction,
        license_plate: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query =
            vehicles::Entity::find().filter(vehicles::Column::LicensePlate.eq(license_plate));
        if let Some(vehicle_id) = except {
            query = query.filter(vehicles::Column::Id.ne(vehicle_id.to_string()));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(license_plate.to_string()));
        }
        Ok(())
    }

    async fn add_co_owners(
        &self,
        db: &DatabaseTransaction,
        vehicle_id: Uuid,
        user_ids: &[Uuid],
    ) -> ResultEngine<()> {
        for user_id in user_ids {
            vehicle_co_owners::ActiveModel {
                vehicle_id: ActiveValue::Set(vehicle_id.to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
            }
            .insert(db)
            .await?;
        }
        Ok(())
    }

    /// Drop co-owner rows and clear the primary pointer of those losing access.
    async fn remove_co_owners(
        &self,
        db: &DatabaseTransaction,
        vehicle_id: Uuid,
        user_ids: &[Uuid],
    ) -> ResultEngine<()> {
        if user_ids.is_empty() {
            return Ok(());
        }
        vehicle_co_owners::Entity::delete_many()
            .filter(vehicle_co_owners::Column::VehicleId.eq(vehicle_id.to_string()))
            .filter(
                vehicle_co_owners::Column::UserId.is_in(user_ids.iter().map(ToString::to_string)),
            )
            .exec(db)
            .await?;
        self.clear_primary_vehicle_refs(db, vehicle_id, user_ids)
            .await?;
        Ok(())
    }
}

/// Collapse duplicates, keeping first occurrences in order.
fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
