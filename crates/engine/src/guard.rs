//! Capability checks consulted by the coordinators.
//!
//! The predicates have no side effects; callers turn a `false` into
//! [`EngineError::Unauthorized`](crate::EngineError::Unauthorized).

use uuid::Uuid;

use crate::{Refueling, Vehicle};

pub fn is_owner(actor: Uuid, vehicle: &Vehicle) -> bool {
    vehicle.owner == actor
}

pub fn is_co_owner(actor: Uuid, vehicle: &Vehicle) -> bool {
    vehicle.co_owners.contains(&actor)
}

/// Whether `actor` logged the entry.
pub fn is_refueler(actor: Uuid, refueling: &Refueling) -> bool {
    refueling.user == actor
}

pub fn is_self(actor: Uuid, user_id: Uuid) -> bool {
    actor == user_id
}

/// Refuelings may be edited or removed by whoever logged them or by the
/// vehicle's owner.
pub fn can_modify_refueling(actor: Uuid, refueling: &Refueling, vehicle: &Vehicle) -> bool {
    is_refueler(actor, refueling) || is_owner(actor, vehicle)
}
