//! Car CRUD and location updates

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::dto::car_dto::{CarListQuery, CarRequest, CarResponse, UpdateLocationRequest};
use crate::dto::driver_dto::DriverSummary;
use crate::models::car::{Car, CarDetails, NewCar};
use crate::repositories::{normalize_search, CarFilter, FleetStore};
use crate::services::status_service::{
    check_car_status_change, ensure_car_deletable, initial_car_status, set_car_status,
};
use crate::utils::errors::{AppError, AppResult};

fn car_not_found() -> AppError {
    AppError::NotFound("car not found".to_string())
}

#[derive(Clone)]
pub struct CarService {
    store: Arc<dyn FleetStore>,
}

impl CarService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn list_cars(&self, query: &CarListQuery) -> AppResult<(Vec<CarResponse>, i64)> {
        let filter = CarFilter {
            status: query.status,
            search: normalize_search(query.search.as_deref()),
        };
        let (cars, total) = self.store.list_cars(&filter, query.page_request()).await?;
        Ok((self.with_drivers(cars).await?, total))
    }

    pub async fn get_car(&self, id: i64) -> AppResult<CarResponse> {
        let car = self.store.get_car(id).await?.ok_or_else(car_not_found)?;
        self.response(car).await
    }

    pub async fn create_car(&self, request: CarRequest) -> AppResult<CarResponse> {
        let status = initial_car_status(request.status)?;
        let car = self
            .store
            .insert_car(NewCar {
                license_plate: request.license_plate.trim().to_string(),
                brand: request.brand.trim().to_string(),
                model: request.model.trim().to_string(),
                year: request.year,
                status,
            })
            .await?;
        info!(car_id = car.id, plate = %car.license_plate, "Car created");
        Ok(CarResponse {
            car,
            current_driver: None,
        })
    }

    /// Replaces the descriptive fields; a requested status may only move the
    /// car between AVAILABLE and MAINTENANCE.
    pub async fn update_car(&self, id: i64, request: CarRequest) -> AppResult<CarResponse> {
        let mut tx = self.store.begin().await?;
        let current = tx.find_car_for_update(id).await?.ok_or_else(car_not_found)?;
        if let Some(requested) = request.status {
            check_car_status_change(current.status, requested)?;
        }

        let mut car = tx
            .update_car_details(
                id,
                CarDetails {
                    license_plate: request.license_plate.trim().to_string(),
                    brand: request.brand.trim().to_string(),
                    model: request.model.trim().to_string(),
                    year: request.year,
                },
            )
            .await?;
        if let Some(requested) = request.status.filter(|s| *s != current.status) {
            car = set_car_status(tx.as_mut(), id, requested, None).await?;
        }
        tx.commit().await?;

        info!(car_id = id, status = %car.status, "Car updated");
        self.response(car).await
    }

    pub async fn update_location(
        &self,
        id: i64,
        request: UpdateLocationRequest,
    ) -> AppResult<CarResponse> {
        let car = self
            .store
            .update_car_location(id, request.lat, request.lng, Utc::now())
            .await?
            .ok_or_else(car_not_found)?;
        self.response(car).await
    }

    /// Cars with trip history stay; their maintenance records go with them.
    pub async fn delete_car(&self, id: i64) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        let car = tx.find_car_for_update(id).await?.ok_or_else(car_not_found)?;
        let trips = tx.count_trips_for_car(id).await?;
        ensure_car_deletable(&car, trips)?;
        tx.delete_car(id).await?;
        tx.commit().await?;

        info!(car_id = id, "🗑️ Car deleted");
        Ok(())
    }

    async fn response(&self, car: Car) -> AppResult<CarResponse> {
        let current_driver = match car.current_driver_id {
            Some(driver_id) => self
                .store
                .get_driver(driver_id)
                .await?
                .as_ref()
                .map(DriverSummary::from),
            None => None,
        };
        Ok(CarResponse {
            car,
            current_driver,
        })
    }

    async fn with_drivers(&self, cars: Vec<Car>) -> AppResult<Vec<CarResponse>> {
        let mut driver_ids: Vec<i64> = cars.iter().filter_map(|c| c.current_driver_id).collect();
        driver_ids.sort_unstable();
        driver_ids.dedup();
        let drivers: HashMap<i64, DriverSummary> = if driver_ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .get_drivers_by_ids(&driver_ids)
                .await?
                .iter()
                .map(|d| (d.id, DriverSummary::from(d)))
                .collect()
        };

        Ok(cars
            .into_iter()
            .map(|car| CarResponse {
                current_driver: car.current_driver_id.and_then(|id| drivers.get(&id).cloned()),
                car,
            })
            .collect())
    }
}
