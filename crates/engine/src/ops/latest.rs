//! Which refueling holds the latest date of its vehicle.

use sea_orm::{DatabaseTransaction, TransactionTrait};
use uuid::Uuid;

use crate::{ResultEngine, refuelings, util::parse_uuid};

use super::{Engine, with_tx};

/// `target` is the latest when every other entry of the vehicle is strictly
/// older; an entry sharing the newest date with another one is not latest.
pub(super) fn is_latest_among(target: &refuelings::Model, entries: &[refuelings::Model]) -> bool {
    entries
        .iter()
        .filter(|entry| entry.id != target.id)
        .all(|entry| entry.date < target.date)
}

impl Engine {
    /// Whether the refueling is the chronologically last one of its vehicle.
    pub async fn is_latest_refueling(&self, refueling_id: Uuid) -> ResultEngine<bool> {
        with_tx!(self, |db_tx| {
            let target = self.require_refueling_model(&db_tx, refueling_id).await?;
            self.refueling_is_latest(&db_tx, &target).await
        })
    }

    pub(super) async fn refueling_is_latest(
        &self,
        db: &DatabaseTransaction,
        target: &refuelings::Model,
    ) -> ResultEngine<bool> {
        let vehicle_id = parse_uuid(&target.vehicle_id, "vehicle")?;
        self.require_vehicle_model(db, vehicle_id).await?;
        let entries = self.vehicle_refuelings(db, &target.vehicle_id).await?;
        Ok(is_latest_among(target, &entries))
    }
}
