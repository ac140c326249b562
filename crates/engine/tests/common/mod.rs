#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;

use engine::{Engine, UserNew, VehicleNew};
use migration::MigratorTrait;
use uuid::Uuid;

pub async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

pub async fn user(engine: &Engine, username: &str) -> Uuid {
    engine
        .create_user(UserNew::new(username, username, "password"))
        .await
        .unwrap()
        .id
}

pub async fn vehicle(engine: &Engine, owner: Uuid, name: &str, odometer: i64) -> Uuid {
    engine
        .create_vehicle(owner, VehicleNew::new(name, format!("{name}-plate"), odometer))
        .await
        .unwrap()
        .vehicle
        .id
}

/// Midday of the given day, in UTC.
pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}
