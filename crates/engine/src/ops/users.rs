//! User lifecycle: create, update, delete and reads.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, UserNew, UserSummary, UserUpdate, guard, refuelings, users,
    util::{normalize_optional_text, required_text},
    vehicle_co_owners, vehicles,
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a user. Usernames are unique.
    pub async fn create_user(&self, payload: UserNew) -> ResultEngine<User> {
        let name = required_text(payload.name.as_deref(), "name")?;
        let username = required_text(payload.username.as_deref(), "username")?;
        let password = required_text(payload.password.as_deref(), "password")?;

        with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(users::Column::Username.eq(username.as_str()))
                .one(&db_tx)
                .await?;
            if taken.is_some() {
                return Err(EngineError::ExistingKey(username));
            }

            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                name: ActiveValue::Set(name),
                username: ActiveValue::Set(username),
                password: ActiveValue::Set(password),
                primary_vehicle: ActiveValue::Set(None),
            }
            .insert(&db_tx)
            .await?;

            info!(user_id = %model.id, username = %model.username, "user created");
            User::from_model(model, Vec::new())
        })
    }

    /// Edit the actor's own name or password. The username never changes.
    pub async fn update_user(
        &self,
        actor: Uuid,
        user_id: Uuid,
        payload: UserUpdate,
    ) -> ResultEngine<User> {
        let name = normalize_optional_text(payload.name.as_deref());
        let password = normalize_optional_text(payload.password.as_deref());
        if name.is_none() && password.is_none() {
            return Err(EngineError::Validation(
                "missing mandatory parameters".to_string(),
            ));
        }
        if !guard::is_self(actor, user_id) {
            return Err(EngineError::Unauthorized(
                "users can only edit themselves".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let stored = self.require_user_model(&db_tx, user_id).await?;
            let mut active: users::ActiveModel = stored.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(password) = password {
                active.password = ActiveValue::Set(password);
            }
            let model = active.update(&db_tx).await?;
            self.load_user(&db_tx, model).await
        })
    }

    /// Remove the actor's own account.
    ///
    /// Vehicles the user owns go with their refuelings, as do the refuelings
    /// the user logged on other vehicles and the user's co-ownerships.
    /// Odometers of those other vehicles are left as they are.
    pub async fn delete_user(&self, actor: Uuid, user_id: Uuid) -> ResultEngine<User> {
        if !guard::is_self(actor, user_id) {
            return Err(EngineError::Unauthorized(
                "users can only delete themselves".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            let id = user_id.to_string();

            let owned = vehicles::Entity::find()
                .filter(vehicles::Column::OwnerId.eq(id.as_str()))
                .all(&db_tx)
                .await?;
            let removed_vehicles = owned.len();
            for model in owned {
                let vehicle = self.load_vehicle(&db_tx, model).await?;
                self.remove_vehicle(&db_tx, &vehicle).await?;
            }

            let authored = refuelings::Entity::delete_many()
                .filter(refuelings::Column::UserId.eq(id.as_str()))
                .exec(&db_tx)
                .await?;
            vehicle_co_owners::Entity::delete_many()
                .filter(vehicle_co_owners::Column::UserId.eq(id.as_str()))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(id).exec(&db_tx).await?;

            info!(
                %user_id,
                vehicles = removed_vehicles,
                authored_refuelings = authored.rows_affected,
                "user removed"
            );
            Ok(user)
        })
    }

    /// Return a user with the vehicles they own or co-use.
    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| self.require_user(&db_tx, user_id).await)
    }

    pub async fn user_by_username(&self, username: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Username.eq(username))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            self.load_user(&db_tx, model).await
        })
    }

    /// Every user, ordered by username.
    pub async fn users(&self) -> ResultEngine<Vec<UserSummary>> {
        with_tx!(self, |db_tx| {
            users::Entity::find()
                .order_by_asc(users::Column::Username)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(UserSummary::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
