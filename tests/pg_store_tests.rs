//! PostgreSQL store tests. They need a reachable database:
//! `DATABASE_URL=postgres://... cargo test --test pg_store_tests -- --ignored`

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use fleet_monitor::config::DatabaseConfig;
use fleet_monitor::database;
use fleet_monitor::dto::trip_dto::{CheckinRequest, CheckoutRequest};
use fleet_monitor::models::car::{CarStatus, NewCar};
use fleet_monitor::models::driver::{DriverStatus, NewDriver};
use fleet_monitor::models::maintenance::NewMaintenance;
use fleet_monitor::models::trip::NewTrip;
use fleet_monitor::repositories::{FleetStore, FleetTx, PgFleetStore};
use fleet_monitor::services::TripService;
use fleet_monitor::utils::errors::AppError;

async fn pg_store() -> Option<Arc<PgFleetStore>> {
    let url = std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty())?;
    let pool = database::connect(&DatabaseConfig::new(url).with_pool_size(1, 5))
        .await
        .unwrap();
    Some(Arc::new(PgFleetStore::new(pool)))
}

/// Unique per run so the tests can share a database.
fn suffix() -> String {
    Utc::now().timestamp_micros().to_string()
}

async fn seed_car(store: &PgFleetStore, plate: &str) -> i64 {
    store
        .insert_car(NewCar {
            license_plate: plate.to_string(),
            brand: "Toyota".to_string(),
            model: "Avanza".to_string(),
            year: 2020,
            status: CarStatus::Available,
        })
        .await
        .unwrap()
        .id
}

async fn seed_driver(store: &PgFleetStore, name: &str) -> i64 {
    store
        .insert_driver(NewDriver {
            name: name.to_string(),
            phone_number: String::new(),
            license_number: String::new(),
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
#[ignore]
async fn test_pg_concurrent_checkouts_for_one_car() {
    let Some(store) = pg_store().await else {
        return;
    };
    let run = suffix();
    let car_id = seed_car(&store, &format!("PG-E-{run}")).await;
    let driver_a = seed_driver(&store, "Driver A").await;
    let driver_b = seed_driver(&store, "Driver B").await;

    let service = TripService::new(store.clone());
    let mut handles = Vec::new();
    for driver_id in [driver_a, driver_b] {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .checkout(CheckoutRequest {
                    car_id,
                    driver_id,
                    start_km: 10,
                    notes: String::new(),
                })
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::Conflict(_)) => {}
            Err(other) => panic!("unexpected: {other:?}"),
        }
    }
    assert_eq!(successes, 1);

    let car = store.get_car(car_id).await.unwrap().unwrap();
    assert_eq!(car.status, CarStatus::InUse);
    let winner = car.current_driver_id.unwrap();
    assert!(winner == driver_a || winner == driver_b);

    let loser = if winner == driver_a { driver_b } else { driver_a };
    let loser = store.get_driver(loser).await.unwrap().unwrap();
    assert_eq!(loser.status, DriverStatus::OffDuty);
}

#[tokio::test]
#[ignore]
async fn test_pg_concurrent_checkins_close_once() {
    let Some(store) = pg_store().await else {
        return;
    };
    let run = suffix();
    let car_id = seed_car(&store, &format!("PG-C-{run}")).await;
    let driver_id = seed_driver(&store, "Driver C").await;

    let service = TripService::new(store.clone());
    let trip = service
        .checkout(CheckoutRequest {
            car_id,
            driver_id,
            start_km: 100,
            notes: String::new(),
        })
        .await
        .unwrap();

    let checkin = |end_km| {
        let service = service.clone();
        let trip_id = trip.trip.id;
        tokio::spawn(async move {
            service
                .checkin(CheckinRequest {
                    trip_id,
                    end_km,
                    notes: String::new(),
                })
                .await
        })
    };
    let (first, second) = tokio::join!(checkin(150), checkin(160));
    let results = [first.unwrap(), second.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(AppError::Conflict(msg)) if msg == "trip already ended")));

    let car = store.get_car(car_id).await.unwrap().unwrap();
    assert_eq!(car.status, CarStatus::Available);
    assert_eq!(car.current_driver_id, None);
}

#[tokio::test]
#[ignore]
async fn test_pg_constraint_violations_are_conflicts() {
    let Some(store) = pg_store().await else {
        return;
    };
    let run = suffix();
    let plate = format!("PG-U-{run}");
    let car_id = seed_car(&store, &plate).await;

    let duplicate = store
        .insert_car(NewCar {
            license_plate: plate,
            brand: "Honda".to_string(),
            model: "Jazz".to_string(),
            year: 2019,
            status: CarStatus::Available,
        })
        .await;
    match duplicate {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "license plate already exists"),
        other => panic!("unexpected: {other:?}"),
    }

    // Second open trip for one car, written past the service checks
    let driver_a = seed_driver(&store, "Driver U1").await;
    let driver_b = seed_driver(&store, "Driver U2").await;
    let mut tx = store.begin().await.unwrap();
    for driver_id in [driver_a, driver_b] {
        let result = tx
            .insert_trip(NewTrip {
                car_id,
                driver_id,
                start_time: Utc::now(),
                start_km: 0,
                notes: String::new(),
            })
            .await;
        if driver_id == driver_b {
            assert!(matches!(result, Err(AppError::Conflict(_))), "{result:?}");
        } else {
            result.unwrap();
        }
    }
    drop(tx);

    let mut tx = store.begin().await.unwrap();
    let orphan = tx
        .insert_maintenance(NewMaintenance {
            car_id: i64::MAX,
            service_date: Utc::now(),
            description: "Orphan".to_string(),
            cost: Decimal::ZERO,
            workshop_name: String::new(),
        })
        .await;
    assert!(matches!(orphan, Err(AppError::Conflict(_))), "{orphan:?}");
}
