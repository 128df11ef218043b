//! Trip lifecycle
//!
//! Checkout and checkin coordinate car, driver and trip inside one store
//! transaction. Locks are taken in the order trip, car, driver; anything that
//! fails before `commit()` rolls the whole transaction back.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::dto::car_dto::CarSummary;
use crate::dto::driver_dto::DriverSummary;
use crate::dto::trip_dto::{CheckinRequest, CheckoutRequest, TripListQuery, TripView};
use crate::models::car::CarStatus;
use crate::models::driver::DriverStatus;
use crate::models::trip::{append_notes, NewTrip, TripClosing, TripLog};
use crate::repositories::{FleetStore, TripFilter};
use crate::services::status_service::{set_car_status, set_driver_status};
use crate::utils::errors::{validation_error, AppError, AppResult};

#[derive(Clone)]
pub struct TripService {
    store: Arc<dyn FleetStore>,
}

impl TripService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    /// Opens a trip: the car becomes IN_USE with the driver assigned and the
    /// driver becomes ACTIVE.
    pub async fn checkout(&self, request: CheckoutRequest) -> AppResult<TripView> {
        if request.car_id < 1 {
            return Err(validation_error("car_id", "car_id must be a positive id"));
        }
        if request.driver_id < 1 {
            return Err(validation_error("driver_id", "driver_id must be a positive id"));
        }
        if request.start_km < 0 {
            return Err(validation_error("start_km", "start_km must not be negative"));
        }

        let mut tx = self.store.begin().await?;

        let car = tx
            .find_car_for_update(request.car_id)
            .await?
            .ok_or_else(|| AppError::NotFound("car not found".to_string()))?;
        if car.status != CarStatus::Available {
            warn!(car_id = car.id, status = %car.status, "checkout rejected: car not available");
            return Err(AppError::Conflict("car is not available".to_string()));
        }

        let driver = tx
            .find_driver_for_update(request.driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("driver not found".to_string()))?;
        if driver.status != DriverStatus::OffDuty {
            warn!(driver_id = driver.id, "checkout rejected: driver already on duty");
            return Err(AppError::Conflict("driver is already on duty".to_string()));
        }
        if tx.find_open_trip_by_driver(driver.id).await?.is_some() {
            warn!(driver_id = driver.id, "checkout rejected: driver has an open trip");
            return Err(AppError::Conflict(
                "driver already has an active trip".to_string(),
            ));
        }

        let trip = tx
            .insert_trip(NewTrip {
                car_id: car.id,
                driver_id: driver.id,
                start_time: Utc::now(),
                start_km: request.start_km,
                notes: request.notes,
            })
            .await?;
        let car = set_car_status(tx.as_mut(), car.id, CarStatus::InUse, Some(driver.id)).await?;
        let driver = set_driver_status(tx.as_mut(), driver.id, DriverStatus::Active).await?;
        tx.commit().await?;

        info!(trip_id = trip.id, car_id = car.id, driver_id = driver.id, "🚗 Checkout completed");

        Ok(TripView {
            trip,
            car: Some(CarSummary::from(&car)),
            driver: Some(DriverSummary::from(&driver)),
        })
    }

    /// Closes an open trip and releases its car and driver.
    pub async fn checkin(&self, request: CheckinRequest) -> AppResult<TripView> {
        if request.trip_id < 1 {
            return Err(validation_error("trip_id", "trip_id must be a positive id"));
        }
        if request.end_km < 0 {
            return Err(validation_error("end_km", "end_km must not be negative"));
        }

        let mut tx = self.store.begin().await?;

        let trip = tx
            .find_trip_for_update(request.trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("trip not found".to_string()))?;
        if !trip.is_open() {
            warn!(trip_id = trip.id, "checkin rejected: trip already ended");
            return Err(AppError::Conflict("trip already ended".to_string()));
        }
        if request.end_km < trip.start_km {
            return Err(validation_error(
                "end_km",
                "end_km must be greater than or equal to start_km",
            ));
        }

        // Lock order: trip, car, driver.
        let car = tx.find_car_for_update(trip.car_id).await?;
        let driver = tx.find_driver_for_update(trip.driver_id).await?;
        if car.is_none() || driver.is_none() {
            return Err(AppError::Internal(format!(
                "trip {} references a missing car or driver",
                trip.id
            )));
        }

        let ended_at = Utc::now().max(trip.start_time + Duration::microseconds(1));
        let trip = tx
            .close_trip(
                trip.id,
                TripClosing {
                    end_time: ended_at,
                    end_km: request.end_km,
                    notes: append_notes(&trip.notes, &request.notes),
                },
            )
            .await?;
        let car = set_car_status(tx.as_mut(), trip.car_id, CarStatus::Available, None).await?;
        let driver = set_driver_status(tx.as_mut(), trip.driver_id, DriverStatus::OffDuty).await?;
        tx.commit().await?;

        info!(trip_id = trip.id, car_id = car.id, driver_id = driver.id, "🏁 Checkin completed");

        Ok(TripView {
            trip,
            car: Some(CarSummary::from(&car)),
            driver: Some(DriverSummary::from(&driver)),
        })
    }

    pub async fn get_trip(&self, trip_id: i64) -> AppResult<TripView> {
        let trip = self
            .store
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("trip not found".to_string()))?;
        let mut views = self.views(vec![trip]).await?;
        views
            .pop()
            .ok_or_else(|| AppError::Internal("trip view lost".to_string()))
    }

    pub async fn list_trips(&self, query: &TripListQuery) -> AppResult<(Vec<TripView>, i64)> {
        let filter = TripFilter {
            car_id: query.car_id,
            driver_id: query.driver_id,
            active: query.active,
        };
        let (trips, total) = self.store.list_trips(&filter, query.page_request()).await?;
        Ok((self.views(trips).await?, total))
    }

    pub async fn recent_trips(&self, limit: i64) -> AppResult<Vec<TripView>> {
        let trips = self.store.recent_trips(limit).await?;
        self.views(trips).await
    }

    /// Attaches car and driver snapshots, one batched lookup per collection.
    async fn views(&self, trips: Vec<TripLog>) -> AppResult<Vec<TripView>> {
        let mut car_ids: Vec<i64> = trips.iter().map(|t| t.car_id).collect();
        car_ids.sort_unstable();
        car_ids.dedup();
        let mut driver_ids: Vec<i64> = trips.iter().map(|t| t.driver_id).collect();
        driver_ids.sort_unstable();
        driver_ids.dedup();

        let cars: HashMap<i64, CarSummary> = self
            .store
            .get_cars_by_ids(&car_ids)
            .await?
            .iter()
            .map(|c| (c.id, CarSummary::from(c)))
            .collect();
        let drivers: HashMap<i64, DriverSummary> = self
            .store
            .get_drivers_by_ids(&driver_ids)
            .await?
            .iter()
            .map(|d| (d.id, DriverSummary::from(d)))
            .collect();

        Ok(trips
            .into_iter()
            .map(|trip| TripView {
                car: cars.get(&trip.car_id).cloned(),
                driver: drivers.get(&trip.driver_id).cloned(),
                trip,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::pagination::PageRequest;
    use crate::models::car::NewCar;
    use crate::models::driver::NewDriver;
    use crate::repositories::MemoryFleetStore;

    async fn seeded() -> (TripService, Arc<dyn FleetStore>, i64, i64) {
        let store: Arc<dyn FleetStore> = Arc::new(MemoryFleetStore::new());
        let car = store
            .insert_car(NewCar {
                license_plate: "B 1234 XY".to_string(),
                brand: "Toyota".to_string(),
                model: "Avanza".to_string(),
                year: 2021,
                status: CarStatus::Available,
            })
            .await
            .unwrap();
        let driver = store
            .insert_driver(NewDriver {
                name: "Budi".to_string(),
                phone_number: "0812".to_string(),
                license_number: "SIM-001".to_string(),
            })
            .await
            .unwrap();
        (TripService::new(store.clone()), store, car.id, driver.id)
    }

    fn checkout_request(car_id: i64, driver_id: i64) -> CheckoutRequest {
        CheckoutRequest {
            car_id,
            driver_id,
            start_km: 1000,
            notes: "full tank".to_string(),
        }
    }

    fn checkin_request(trip_id: i64, end_km: i64, notes: &str) -> CheckinRequest {
        CheckinRequest {
            trip_id,
            end_km,
            notes: notes.to_string(),
        }
    }

    #[tokio::test]
    async fn test_checkout_assigns_car_and_driver() {
        let (service, store, car_id, driver_id) = seeded().await;

        let view = service.checkout(checkout_request(car_id, driver_id)).await.unwrap();
        assert!(view.trip.is_open());
        assert_eq!(view.trip.start_km, 1000);
        assert_eq!(view.car.as_ref().unwrap().status, CarStatus::InUse);
        assert_eq!(view.driver.as_ref().unwrap().status, DriverStatus::Active);

        let car = store.get_car(car_id).await.unwrap().unwrap();
        assert_eq!(car.status, CarStatus::InUse);
        assert_eq!(car.current_driver_id, Some(driver_id));
        let driver = store.get_driver(driver_id).await.unwrap().unwrap();
        assert_eq!(driver.status, DriverStatus::Active);
    }

    #[tokio::test]
    async fn test_second_checkout_of_same_car_conflicts() {
        let (service, store, car_id, driver_id) = seeded().await;
        service.checkout(checkout_request(car_id, driver_id)).await.unwrap();

        let other = store
            .insert_driver(NewDriver {
                name: "Sari".to_string(),
                phone_number: String::new(),
                license_number: String::new(),
            })
            .await
            .unwrap();
        match service.checkout(checkout_request(car_id, other.id)).await {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "car is not available"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_checkout_precondition_order() {
        let (service, store, car_id, driver_id) = seeded().await;

        match service.checkout(checkout_request(999, 999)).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "car not found"),
            other => panic!("unexpected: {other:?}"),
        }
        match service.checkout(checkout_request(car_id, 999)).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "driver not found"),
            other => panic!("unexpected: {other:?}"),
        }

        service.checkout(checkout_request(car_id, driver_id)).await.unwrap();
        let second_car = store
            .insert_car(NewCar {
                license_plate: "B 5678 XY".to_string(),
                brand: "Suzuki".to_string(),
                model: "Ertiga".to_string(),
                year: 0,
                status: CarStatus::Available,
            })
            .await
            .unwrap();
        match service.checkout(checkout_request(second_car.id, driver_id)).await {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "driver is already on duty"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_checkout_rejects_negative_start_km() {
        let (service, _store, car_id, driver_id) = seeded().await;
        let mut request = checkout_request(car_id, driver_id);
        request.start_km = -1;
        assert!(matches!(
            service.checkout(request).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_checkout_maintenance_car_conflicts() {
        let (service, store, car_id, driver_id) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        set_car_status(tx.as_mut(), car_id, CarStatus::Maintenance, None)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert!(matches!(
            service.checkout(checkout_request(car_id, driver_id)).await,
            Err(AppError::Conflict(_))
        ));
        let driver = store.get_driver(driver_id).await.unwrap().unwrap();
        assert_eq!(driver.status, DriverStatus::OffDuty);
    }

    #[tokio::test]
    async fn test_checkin_releases_car_and_driver() {
        let (service, store, car_id, driver_id) = seeded().await;
        let opened = service.checkout(checkout_request(car_id, driver_id)).await.unwrap();

        let closed = service
            .checkin(checkin_request(opened.trip.id, 1150, "returned clean"))
            .await
            .unwrap();
        assert_eq!(closed.trip.end_km, Some(1150));
        let end_time = closed.trip.end_time.unwrap();
        assert!(end_time > closed.trip.start_time);
        assert_eq!(closed.trip.notes, "full tank\nreturned clean");
        assert_eq!(closed.car.unwrap().status, CarStatus::Available);
        assert_eq!(closed.driver.unwrap().status, DriverStatus::OffDuty);

        let car = store.get_car(car_id).await.unwrap().unwrap();
        assert_eq!(car.status, CarStatus::Available);
        assert_eq!(car.current_driver_id, None);
    }

    #[tokio::test]
    async fn test_checkin_with_empty_notes_keeps_notes() {
        let (service, _store, car_id, driver_id) = seeded().await;
        let opened = service.checkout(checkout_request(car_id, driver_id)).await.unwrap();
        let closed = service
            .checkin(checkin_request(opened.trip.id, 1000, ""))
            .await
            .unwrap();
        assert_eq!(closed.trip.notes, "full tank");
    }

    #[tokio::test]
    async fn test_second_checkin_conflicts_and_changes_nothing() {
        let (service, store, car_id, driver_id) = seeded().await;
        let opened = service.checkout(checkout_request(car_id, driver_id)).await.unwrap();
        let closed = service
            .checkin(checkin_request(opened.trip.id, 1100, ""))
            .await
            .unwrap();

        match service.checkin(checkin_request(opened.trip.id, 1200, "again")).await {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "trip already ended"),
            other => panic!("unexpected: {other:?}"),
        }

        let trip = store.get_trip(opened.trip.id).await.unwrap().unwrap();
        assert_eq!(trip.end_km, Some(1100));
        assert_eq!(trip.end_time, closed.trip.end_time);
        assert_eq!(trip.notes, "full tank");
    }

    #[tokio::test]
    async fn test_checkin_rejects_backwards_odometer() {
        let (service, store, car_id, driver_id) = seeded().await;
        let opened = service.checkout(checkout_request(car_id, driver_id)).await.unwrap();

        assert!(matches!(
            service.checkin(checkin_request(opened.trip.id, 999, "")).await,
            Err(AppError::Validation(_))
        ));
        let trip = store.get_trip(opened.trip.id).await.unwrap().unwrap();
        assert!(trip.is_open());
    }

    #[tokio::test]
    async fn test_checkin_unknown_trip() {
        let (service, _store, _, _) = seeded().await;
        match service.checkin(checkin_request(42, 10, "")).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "trip not found"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_checkouts_of_one_car() {
        let (service, store, car_id, driver_id) = seeded().await;
        let other = store
            .insert_driver(NewDriver {
                name: "Sari".to_string(),
                phone_number: String::new(),
                license_number: "SIM-002".to_string(),
            })
            .await
            .unwrap();

        let (a, b) = tokio::join!(
            service.checkout(checkout_request(car_id, driver_id)),
            service.checkout(checkout_request(car_id, other.id)),
        );
        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
        assert!(matches!(a.err().or(b.err()), Some(AppError::Conflict(_))));

        let (open, total) = store
            .list_trips(
                &TripFilter {
                    active: Some(true),
                    ..TripFilter::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(open.len(), 1);
    }

    #[tokio::test]
    async fn test_list_trips_filters_active() {
        let (service, _store, car_id, driver_id) = seeded().await;
        let first = service.checkout(checkout_request(car_id, driver_id)).await.unwrap();
        service
            .checkin(checkin_request(first.trip.id, 1010, ""))
            .await
            .unwrap();
        service.checkout(checkout_request(car_id, driver_id)).await.unwrap();

        let open = TripListQuery {
            active: Some(true),
            ..TripListQuery::default()
        };
        let (views, total) = service.list_trips(&open).await.unwrap();
        assert_eq!(total, 1);
        assert!(views[0].trip.is_open());
        assert!(views[0].car.is_some());
        assert!(views[0].driver.is_some());

        let closed = TripListQuery {
            active: Some(false),
            ..TripListQuery::default()
        };
        let (views, total) = service.list_trips(&closed).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(views[0].trip.id, first.trip.id);

        let (_, total) = service.list_trips(&TripListQuery::default()).await.unwrap();
        assert_eq!(total, 2);
    }
}
