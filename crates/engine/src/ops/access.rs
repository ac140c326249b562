use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, Vehicle, refuelings, users, util::parse_uuid,
    vehicle_co_owners, vehicles,
};

use super::Engine;

impl Engine {
    pub(super) async fn require_user_model(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(super) async fn require_vehicle_model(
        &self,
        db: &DatabaseTransaction,
        vehicle_id: Uuid,
    ) -> ResultEngine<vehicles::Model> {
        vehicles::Entity::find_by_id(vehicle_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("vehicle not exists".to_string()))
    }

    pub(super) async fn require_refueling_model(
        &self,
        db: &DatabaseTransaction,
        refueling_id: Uuid,
    ) -> ResultEngine<refuelings::Model> {
        refuelings::Entity::find_by_id(refueling_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("refueling not exists".to_string()))
    }

    /// Vehicle with its derived co-owners and refuelings.
    pub(super) async fn require_vehicle(
        &self,
        db: &DatabaseTransaction,
        vehicle_id: Uuid,
    ) -> ResultEngine<Vehicle> {
        let model = self.require_vehicle_model(db, vehicle_id).await?;
        self.load_vehicle(db, model).await
    }

    /// User with its derived vehicle list.
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<User> {
        let model = self.require_user_model(db, user_id).await?;
        self.load_user(db, model).await
    }

    pub(super) async fn load_vehicle(
        &self,
        db: &DatabaseTransaction,
        model: vehicles::Model,
    ) -> ResultEngine<Vehicle> {
        let co_owners = self.co_owner_ids(db, &model.id).await?;
        let refuelings = self
            .vehicle_refuelings(db, &model.id)
            .await?
            .iter()
            .map(|entry| parse_uuid(&entry.id, "refueling"))
            .collect::<ResultEngine<Vec<_>>>()?;
        Vehicle::from_model(model, co_owners, refuelings)
    }

    pub(super) async fn load_user(
        &self,
        db: &DatabaseTransaction,
        model: users::Model,
    ) -> ResultEngine<User> {
        let vehicles = self.member_vehicle_ids(db, &model.id).await?;
        User::from_model(model, vehicles)
    }

    pub(super) async fn co_owner_ids(
        &self,
        db: &DatabaseTransaction,
        vehicle_id: &str,
    ) -> ResultEngine<Vec<Uuid>> {
        vehicle_co_owners::Entity::find()
            .filter(vehicle_co_owners::Column::VehicleId.eq(vehicle_id.to_string()))
            .order_by_asc(vehicle_co_owners::Column::UserId)
            .all(db)
            .await?
            .iter()
            .map(|row| parse_uuid(&row.user_id, "user"))
            .collect()
    }

    /// Refuelings of a vehicle, oldest first.
    pub(super) async fn vehicle_refuelings(
        &self,
        db: &DatabaseTransaction,
        vehicle_id: &str,
    ) -> ResultEngine<Vec<refuelings::Model>> {
        refuelings::Entity::find()
            .filter(refuelings::Column::VehicleId.eq(vehicle_id.to_string()))
            .order_by_asc(refuelings::Column::Date)
            .order_by_asc(refuelings::Column::Id)
            .all(db)
            .await
            .map_err(Into::into)
    }

    /// Vehicles a user owns or co-uses: the derived `User::vehicles`.
    pub(super) async fn member_vehicle_ids(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<Uuid>> {
        let owned = vehicles::Entity::find()
            .filter(vehicles::Column::OwnerId.eq(user_id.to_string()))
            .order_by_asc(vehicles::Column::Name)
            .all(db)
            .await?;
        let shared = vehicle_co_owners::Entity::find()
            .filter(vehicle_co_owners::Column::UserId.eq(user_id.to_string()))
            .all(db)
            .await?;

        owned
            .iter()
            .map(|vehicle| parse_uuid(&vehicle.id, "vehicle"))
            .chain(
                shared
                    .iter()
                    .map(|row| parse_uuid(&row.vehicle_id, "vehicle")),
            )
            .collect()
    }

    /// Point every user whose primary vehicle is `vehicle_id` at nothing.
    pub(super) async fn clear_primary_vehicle_refs(
        &self,
        db: &DatabaseTransaction,
        vehicle_id: Uuid,
        user_ids: &[Uuid],
    ) -> ResultEngine<u64> {
        if user_ids.is_empty() {
            return Ok(0);
        }
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::PrimaryVehicle,
                Expr::value(Option::<String>::None),
            )
            .filter(users::Column::PrimaryVehicle.eq(vehicle_id.to_string()))
            .filter(users::Column::Id.is_in(user_ids.iter().map(ToString::to_string)))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
