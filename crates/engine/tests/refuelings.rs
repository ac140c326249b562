mod common;

use engine::{
    BACKFILL_ODOMETER, Engine, EngineError, EntryMode, ErrorKind, RefuelingNew, RefuelingUpdate,
};
use uuid::Uuid;

use common::{day, engine, user, vehicle};

const EPSILON: f64 = 1e-9;

async fn append(
    engine: &Engine,
    actor: Uuid,
    vehicle_id: Uuid,
    date_day: u32,
    odometer: i64,
    liters: f64,
) -> Uuid {
    engine
        .create_refueling(
            actor,
            RefuelingNew::append(vehicle_id, day(2021, 1, date_day), odometer, liters),
        )
        .await
        .unwrap()
        .entry
        .id
}

/// Vehicle at 7000 with chained entries at 8000, 8750 and 9645.
async fn chained(engine: &Engine, owner: Uuid) -> (Uuid, [Uuid; 3]) {
    let vehicle_id = vehicle(engine, owner, "Mosse", 7000).await;
    let first = append(engine, owner, vehicle_id, 1, 8000, 40.0).await;
    let second = append(engine, owner, vehicle_id, 10, 8750, 38.0).await;
    let third = append(engine, owner, vehicle_id, 20, 9645, 45.0).await;
    (vehicle_id, [first, second, third])
}

#[tokio::test]
async fn append_moves_vehicle_odometer() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let vehicle_id = vehicle(&engine, alice, "Mosse", 1234).await;
    append(&engine, alice, vehicle_id, 1, 1888, 30.0).await;

    let created = engine
        .create_refueling(
            alice,
            RefuelingNew::append(vehicle_id, day(2021, 2, 1), 2542, 33.11),
        )
        .await
        .unwrap();

    assert_eq!(created.mode, EntryMode::Append);
    assert_eq!(created.entry.odometer, 2542);
    assert_eq!(created.entry.trip_kilometers, 654);
    assert!((created.entry.avg_consumption - 33.11 / 654.0 * 100.0).abs() < EPSILON);
    assert!((created.entry.avg_consumption - 5.0626).abs() < 1e-4);

    let vehicle = engine.vehicle(vehicle_id).await.unwrap();
    assert_eq!(vehicle.odometer, 2542);
    assert_eq!(vehicle.refuelings.len(), 2);
    assert_eq!(vehicle.refuelings[1], created.entry.id);
}

#[tokio::test]
async fn backfill_keeps_vehicle_odometer() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let vehicle_id = vehicle(&engine, alice, "Mosse", 1888).await;

    let created = engine
        .create_refueling(
            alice,
            RefuelingNew::backfill(vehicle_id, day(2020, 6, 1), 769, 45.23),
        )
        .await
        .unwrap();

    assert_eq!(created.mode, EntryMode::Backfill);
    assert_eq!(created.entry.odometer, BACKFILL_ODOMETER);
    assert_eq!(created.entry.trip_kilometers, 769);
    assert!((created.entry.avg_consumption - 5.8816).abs() < 1e-4);
    assert_eq!(engine.vehicle(vehicle_id).await.unwrap().odometer, 1888);
}

#[tokio::test]
async fn create_rejects_incomplete_payloads() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let vehicle_id = vehicle(&engine, alice, "Mosse", 1000).await;

    let mut missing_odometer = RefuelingNew::append(vehicle_id, day(2021, 1, 1), 1500, 30.0);
    missing_odometer.odometer = None;
    let err = engine
        .create_refueling(alice, missing_odometer)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let mut unknown_mode = RefuelingNew::append(vehicle_id, day(2021, 1, 1), 1500, 30.0);
    unknown_mode.mode = Some("addSomewhere".to_string());
    let err = engine.create_refueling(alice, unknown_mode).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("invalid refueling type: addSomewhere".to_string())
    );

    let err = engine
        .create_refueling(
            alice,
            RefuelingNew::append(vehicle_id, day(2021, 1, 1), 1500, 0.0),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = engine
        .create_refueling(
            alice,
            RefuelingNew::append(Uuid::new_v4(), day(2021, 1, 1), 1500, 30.0),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let vehicle = engine.vehicle(vehicle_id).await.unwrap();
    assert_eq!(vehicle.odometer, 1000);
    assert!(vehicle.refuelings.is_empty());
}

#[tokio::test]
async fn any_user_may_log_against_any_vehicle() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    let vehicle_id = vehicle(&engine, alice, "Mosse", 1000).await;

    let created = engine
        .create_refueling(bob, RefuelingNew::append(vehicle_id, day(2021, 1, 1), 1500, 30.0))
        .await
        .unwrap();

    assert_eq!(created.entry.user, bob);
    assert_eq!(engine.vehicle(vehicle_id).await.unwrap().odometer, 1500);
}

#[tokio::test]
async fn create_then_delete_restores_vehicle() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let (vehicle_id, _) = chained(&engine, alice).await;
    let before = engine.vehicle(vehicle_id).await.unwrap();

    let added = append(&engine, alice, vehicle_id, 28, 10_100, 42.0).await;
    assert_eq!(engine.vehicle(vehicle_id).await.unwrap().odometer, 10_100);

    let removed = engine.delete_refueling(alice, added).await.unwrap();
    assert!(removed.vehicle_odometer_updated);
    assert_eq!(engine.vehicle(vehicle_id).await.unwrap(), before);
}

#[tokio::test]
async fn delete_latest_rolls_back_trip() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let (vehicle_id, [_, _, latest]) = chained(&engine, alice).await;

    let removed = engine.delete_refueling(alice, latest).await.unwrap();

    assert!(removed.vehicle_odometer_updated);
    assert_eq!(removed.removed_entry.trip_kilometers, 895);
    let vehicle = engine.vehicle(vehicle_id).await.unwrap();
    assert_eq!(vehicle.odometer, 8750);
    assert_eq!(vehicle.refuelings.len(), 2);
}

#[tokio::test]
async fn delete_middle_keeps_odometer() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let (vehicle_id, [_, middle, _]) = chained(&engine, alice).await;

    let removed = engine.delete_refueling(alice, middle).await.unwrap();

    assert!(!removed.vehicle_odometer_updated);
    let vehicle = engine.vehicle(vehicle_id).await.unwrap();
    assert_eq!(vehicle.odometer, 9645);
    assert!(!vehicle.refuelings.contains(&middle));
    let err = engine.refueling(middle).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn delete_latest_backfill_does_not_roll_back() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let (vehicle_id, _) = chained(&engine, alice).await;
    let backfill = engine
        .create_refueling(
            alice,
            RefuelingNew::backfill(vehicle_id, day(2021, 3, 1), 500, 30.0),
        )
        .await
        .unwrap()
        .entry
        .id;
    assert!(engine.is_latest_refueling(backfill).await.unwrap());

    let removed = engine.delete_refueling(alice, backfill).await.unwrap();

    assert!(!removed.vehicle_odometer_updated);
    assert_eq!(engine.vehicle(vehicle_id).await.unwrap().odometer, 9645);
}

#[tokio::test]
async fn update_latest_reanchors_from_previous_reading() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let (vehicle_id, [_, _, latest]) = chained(&engine, alice).await;

    let updated = engine
        .update_refueling(
            alice,
            latest,
            RefuelingUpdate::new(day(2021, 1, 20), 9700, 50.0, 123),
        )
        .await
        .unwrap();

    assert!(updated.vehicle_odometer_updated);
    assert_eq!(updated.updated_entry.odometer, 9700);
    assert_eq!(updated.updated_entry.trip_kilometers, 950);
    assert!((updated.updated_entry.avg_consumption - 50.0 / 950.0 * 100.0).abs() < EPSILON);
    assert_eq!(engine.vehicle(vehicle_id).await.unwrap().odometer, 9700);

    let stored = engine.refueling(latest).await.unwrap();
    assert_eq!(stored, updated.updated_entry);
}

#[tokio::test]
async fn update_middle_takes_trip_verbatim() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let (vehicle_id, [_, middle, _]) = chained(&engine, alice).await;

    let updated = engine
        .update_refueling(
            alice,
            middle,
            RefuelingUpdate::new(day(2021, 1, 10), 8800, 40.0, 800),
        )
        .await
        .unwrap();

    assert!(!updated.vehicle_odometer_updated);
    assert_eq!(updated.updated_entry.trip_kilometers, 800);
    assert!((updated.updated_entry.avg_consumption - 5.0).abs() < EPSILON);
    assert_eq!(engine.vehicle(vehicle_id).await.unwrap().odometer, 9645);
}

#[tokio::test]
async fn update_latest_with_new_date_does_not_reanchor() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let (vehicle_id, [_, _, latest]) = chained(&engine, alice).await;

    let updated = engine
        .update_refueling(
            alice,
            latest,
            RefuelingUpdate::new(day(2021, 1, 21), 9700, 45.0, 900),
        )
        .await
        .unwrap();

    assert!(!updated.vehicle_odometer_updated);
    assert_eq!(updated.updated_entry.trip_kilometers, 900);
    assert_eq!(engine.vehicle(vehicle_id).await.unwrap().odometer, 9645);
}

#[tokio::test]
async fn update_single_entry_always_reanchors() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let vehicle_id = vehicle(&engine, alice, "Mosse", 1000).await;
    let only = append(&engine, alice, vehicle_id, 1, 1500, 30.0).await;

    let updated = engine
        .update_refueling(
            alice,
            only,
            RefuelingUpdate::new(day(2021, 2, 2), 1600, 30.0, 0),
        )
        .await
        .unwrap();

    assert!(updated.vehicle_odometer_updated);
    assert_eq!(updated.updated_entry.trip_kilometers, 600);
    assert_eq!(updated.updated_entry.date, day(2021, 2, 2));
    assert_eq!(engine.vehicle(vehicle_id).await.unwrap().odometer, 1600);
}

#[tokio::test]
async fn update_requires_every_field() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let vehicle_id = vehicle(&engine, alice, "Mosse", 1000).await;
    let only = append(&engine, alice, vehicle_id, 1, 1500, 30.0).await;

    let mut payload = RefuelingUpdate::new(day(2021, 1, 1), 1600, 30.0, 600);
    payload.trip = None;
    let err = engine
        .update_refueling(alice, only, payload)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("missing mandatory parameter: trip".to_string())
    );

    let err = engine
        .update_refueling(
            alice,
            Uuid::new_v4(),
            RefuelingUpdate::new(day(2021, 1, 1), 1600, 30.0, 600),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn strangers_cannot_touch_refuelings() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let mallory = user(&engine, "mallory").await;
    let (vehicle_id, [_, _, latest]) = chained(&engine, alice).await;
    let before = engine.refueling(latest).await.unwrap();

    let err = engine
        .update_refueling(
            mallory,
            latest,
            RefuelingUpdate::new(day(2021, 1, 20), 9999, 10.0, 10),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let err = engine.delete_refueling(mallory, latest).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    assert_eq!(engine.refueling(latest).await.unwrap(), before);
    let vehicle = engine.vehicle(vehicle_id).await.unwrap();
    assert_eq!(vehicle.odometer, 9645);
    assert_eq!(vehicle.refuelings.len(), 3);
}

#[tokio::test]
async fn refueler_and_owner_may_modify() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let bob = user(&engine, "bob").await;
    let vehicle_id = vehicle(&engine, alice, "Mosse", 1000).await;
    let first = append(&engine, bob, vehicle_id, 1, 1500, 30.0).await;
    let second = append(&engine, bob, vehicle_id, 2, 2000, 30.0).await;

    engine
        .update_refueling(
            bob,
            first,
            RefuelingUpdate::new(day(2021, 1, 1), 1500, 35.0, 500),
        )
        .await
        .unwrap();
    let removed = engine.delete_refueling(alice, second).await.unwrap();

    assert!(removed.vehicle_odometer_updated);
    assert_eq!(engine.vehicle(vehicle_id).await.unwrap().odometer, 1500);
}

#[tokio::test]
async fn entries_sharing_the_latest_date_are_not_latest() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let vehicle_id = vehicle(&engine, alice, "Mosse", 1000).await;
    let first = append(&engine, alice, vehicle_id, 5, 1500, 30.0).await;
    let second = append(&engine, alice, vehicle_id, 5, 2000, 30.0).await;

    assert!(!engine.is_latest_refueling(first).await.unwrap());
    assert!(!engine.is_latest_refueling(second).await.unwrap());

    let removed = engine.delete_refueling(alice, second).await.unwrap();
    assert!(!removed.vehicle_odometer_updated);
    assert_eq!(engine.vehicle(vehicle_id).await.unwrap().odometer, 2000);

    let err = engine.is_latest_refueling(second).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn refuelings_are_listed_by_date_with_consistent_metrics() {
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let (vehicle_id, [first, second, third]) = chained(&engine, alice).await;
    engine
        .create_refueling(
            alice,
            RefuelingNew::backfill(vehicle_id, day(2020, 12, 1), 700, 35.0),
        )
        .await
        .unwrap();

    let entries = engine.refuelings_for_vehicle(vehicle_id).await.unwrap();

    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].odometer, BACKFILL_ODOMETER);
    assert_eq!(
        entries[1..].iter().map(|e| e.id).collect::<Vec<_>>(),
        vec![first, second, third]
    );
    for entry in entries.iter().filter(|e| e.trip_kilometers > 0) {
        let expected = entry.liters / entry.trip_kilometers as f64 * 100.0;
        assert!((entry.avg_consumption - expected).abs() < EPSILON);
    }
}

#[tokio::test]
async fn concurrent_appends_keep_last_reading() {
    let engine = std::sync::Arc::new(engine().await);
    let alice = user(&engine, "alice").await;
    let vehicle_id = vehicle(&engine, alice, "Mosse", 1000).await;

    let mut handles = Vec::new();
    for step in 1..=5_i64 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .create_refueling(
                    alice,
                    RefuelingNew::append(
                        vehicle_id,
                        day(2021, 1, step as u32),
                        1000 + step * 100,
                        10.0,
                    ),
                )
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let vehicle = engine.vehicle(vehicle_id).await.unwrap();
    let entries = engine.refuelings_for_vehicle(vehicle_id).await.unwrap();
    assert_eq!(entries.len(), 5);
    let last_written = entries
        .iter()
        .find(|e| e.odometer == vehicle.odometer)
        .unwrap();
    let total: i64 = entries.iter().map(|e| e.trip_kilometers).sum();
    assert_eq!(last_written.odometer, 1000 + total);
}

#[tokio::test]
async fn backfill_on_zero_odometer_vehicle_rolls_back_below_zero() {
    // The sentinel reading of a backfill matches a vehicle still at 0, so
    // removing it as the latest entry subtracts its trip.
    let engine = engine().await;
    let alice = user(&engine, "alice").await;
    let vehicle_id = vehicle(&engine, alice, "Mosse", 0).await;
    let backfill = engine
        .create_refueling(
            alice,
            RefuelingNew::backfill(vehicle_id, day(2021, 1, 1), 500, 30.0),
        )
        .await
        .unwrap()
        .entry
        .id;

    let removed = engine.delete_refueling(alice, backfill).await.unwrap();

    assert!(removed.vehicle_odometer_updated);
    assert_eq!(engine.vehicle(vehicle_id).await.unwrap().odometer, -500);
}
