//! In-memory store
//!
//! Backs the service when no database is configured and drives the test
//! suite. A transaction holds the store mutex for its whole lifetime and works
//! on a copy of the state that replaces the shared state on commit, so
//! transactions are serializable and a dropped transaction leaves no trace.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{CarFilter, DriverFilter, FleetStore, FleetTx, MaintenanceFilter, TripFilter};
use crate::dto::pagination::PageRequest;
use crate::models::car::{Car, CarDetails, CarStatus, NewCar};
use crate::models::driver::{Driver, DriverDetails, DriverStatus, NewDriver};
use crate::models::maintenance::{Maintenance, MaintenanceDetails, NewMaintenance};
use crate::models::trip::{NewTrip, TripClosing, TripLog};
use crate::models::user::{NewUser, User};
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
struct Sequences {
    car: i64,
    driver: i64,
    trip: i64,
    maintenance: i64,
    user: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    cars: BTreeMap<i64, Car>,
    drivers: BTreeMap<i64, Driver>,
    trips: BTreeMap<i64, TripLog>,
    maintenances: BTreeMap<i64, Maintenance>,
    users: BTreeMap<i64, User>,
    seq: Sequences,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Newest first, ties broken by id.
fn paginate<T, K>(mut rows: Vec<T>, page: PageRequest, key: K) -> (Vec<T>, i64)
where
    K: Fn(&T) -> (DateTime<Utc>, i64),
{
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
    let total = rows.len() as i64;
    let rows = rows
        .into_iter()
        .skip(page.offset().max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect();
    (rows, total)
}

impl MemoryState {
    fn insert_user(&mut self, user: NewUser) -> AppResult<User> {
        if self.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("username already exists".to_string()));
        }
        let now = Utc::now();
        let user = User {
            id: next(&mut self.seq.user),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn ensure_unique_plate(&self, plate: &str, except: Option<i64>) -> AppResult<()> {
        let taken = self
            .cars
            .values()
            .any(|c| c.license_plate == plate && Some(c.id) != except);
        if taken {
            return Err(AppError::Conflict("license plate already exists".to_string()));
        }
        Ok(())
    }

    fn ensure_unique_license(&self, license: &str, except: Option<i64>) -> AppResult<()> {
        if license.is_empty() {
            return Ok(());
        }
        let taken = self
            .drivers
            .values()
            .any(|d| d.license_number == license && Some(d.id) != except);
        if taken {
            return Err(AppError::Conflict("license number already exists".to_string()));
        }
        Ok(())
    }

    fn car_mut(&mut self, id: i64) -> AppResult<&mut Car> {
        self.cars
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("car not found".to_string()))
    }

    fn driver_mut(&mut self, id: i64) -> AppResult<&mut Driver> {
        self.drivers
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("driver not found".to_string()))
    }
}

#[derive(Clone, Default)]
pub struct MemoryFleetStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryFleetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FleetStore for MemoryFleetStore {
    async fn begin(&self) -> AppResult<Box<dyn FleetTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryFleetTx { guard, working }))
    }

    async fn list_cars(&self, filter: &CarFilter, page: PageRequest) -> AppResult<(Vec<Car>, i64)> {
        let state = self.state.lock().await;
        let search = filter.search.as_ref().map(|s| s.to_lowercase());
        let rows: Vec<Car> = state
            .cars
            .values()
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .filter(|c| {
                search.as_deref().map_or(true, |q| {
                    contains_ci(&c.license_plate, q)
                        || contains_ci(&c.brand, q)
                        || contains_ci(&c.model, q)
                })
            })
            .cloned()
            .collect();
        Ok(paginate(rows, page, |c: &Car| (c.created_at, c.id)))
    }

    async fn get_car(&self, id: i64) -> AppResult<Option<Car>> {
        Ok(self.state.lock().await.cars.get(&id).cloned())
    }

    async fn get_cars_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Car>> {
        let state = self.state.lock().await;
        Ok(ids.iter().filter_map(|id| state.cars.get(id).cloned()).collect())
    }

    async fn insert_car(&self, car: NewCar) -> AppResult<Car> {
        let mut state = self.state.lock().await;
        state.ensure_unique_plate(&car.license_plate, None)?;
        let now = Utc::now();
        let car = Car {
            id: next(&mut state.seq.car),
            license_plate: car.license_plate,
            brand: car.brand,
            model: car.model,
            year: car.year,
            status: car.status,
            current_driver_id: None,
            last_lat: None,
            last_lng: None,
            last_update_loc: None,
            created_at: now,
            updated_at: now,
        };
        state.cars.insert(car.id, car.clone());
        Ok(car)
    }

    async fn update_car_location(
        &self,
        id: i64,
        lat: f64,
        lng: f64,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Car>> {
        let mut state = self.state.lock().await;
        Ok(state.cars.get_mut(&id).map(|car| {
            car.last_lat = Some(lat);
            car.last_lng = Some(lng);
            car.last_update_loc = Some(at);
            car.updated_at = at;
            car.clone()
        }))
    }

    async fn count_cars_by_status(&self, status: CarStatus) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state.cars.values().filter(|c| c.status == status).count() as i64)
    }

    async fn list_drivers(
        &self,
        filter: &DriverFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Driver>, i64)> {
        let state = self.state.lock().await;
        let search = filter.search.as_ref().map(|s| s.to_lowercase());
        let rows: Vec<Driver> = state
            .drivers
            .values()
            .filter(|d| filter.status.map_or(true, |s| d.status == s))
            .filter(|d| {
                search.as_deref().map_or(true, |q| {
                    contains_ci(&d.name, q)
                        || contains_ci(&d.phone_number, q)
                        || contains_ci(&d.license_number, q)
                })
            })
            .cloned()
            .collect();
        Ok(paginate(rows, page, |d: &Driver| (d.created_at, d.id)))
    }

    async fn get_driver(&self, id: i64) -> AppResult<Option<Driver>> {
        Ok(self.state.lock().await.drivers.get(&id).cloned())
    }

    async fn get_drivers_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Driver>> {
        let state = self.state.lock().await;
        Ok(ids.iter().filter_map(|id| state.drivers.get(id).cloned()).collect())
    }

    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver> {
        let mut state = self.state.lock().await;
        state.ensure_unique_license(&driver.license_number, None)?;
        let now = Utc::now();
        let driver = Driver {
            id: next(&mut state.seq.driver),
            name: driver.name,
            phone_number: driver.phone_number,
            license_number: driver.license_number,
            status: DriverStatus::OffDuty,
            created_at: now,
            updated_at: now,
        };
        state.drivers.insert(driver.id, driver.clone());
        Ok(driver)
    }

    async fn count_drivers(&self) -> AppResult<i64> {
        Ok(self.state.lock().await.drivers.len() as i64)
    }

    async fn count_drivers_by_status(&self, status: DriverStatus) -> AppResult<i64> {
        let state = self.state.lock().await;
        Ok(state.drivers.values().filter(|d| d.status == status).count() as i64)
    }

    async fn list_trips(
        &self,
        filter: &TripFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<TripLog>, i64)> {
        let state = self.state.lock().await;
        let rows: Vec<TripLog> = state
            .trips
            .values()
            .filter(|t| filter.car_id.map_or(true, |id| t.car_id == id))
            .filter(|t| filter.driver_id.map_or(true, |id| t.driver_id == id))
            .filter(|t| filter.active.map_or(true, |active| t.is_open() == active))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |t: &TripLog| (t.created_at, t.id)))
    }

    async fn get_trip(&self, id: i64) -> AppResult<Option<TripLog>> {
        Ok(self.state.lock().await.trips.get(&id).cloned())
    }

    async fn recent_trips(&self, limit: i64) -> AppResult<Vec<TripLog>> {
        let state = self.state.lock().await;
        let rows: Vec<TripLog> = state.trips.values().cloned().collect();
        let page = PageRequest { page: 1, limit };
        Ok(paginate(rows, page, |t: &TripLog| (t.created_at, t.id)).0)
    }

    async fn list_maintenances(
        &self,
        filter: &MaintenanceFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Maintenance>, i64)> {
        let state = self.state.lock().await;
        let rows: Vec<Maintenance> = state
            .maintenances
            .values()
            .filter(|m| filter.car_id.map_or(true, |id| m.car_id == id))
            .cloned()
            .collect();
        Ok(paginate(rows, page, |m: &Maintenance| (m.created_at, m.id)))
    }

    async fn get_maintenance(&self, id: i64) -> AppResult<Option<Maintenance>> {
        Ok(self.state.lock().await.maintenances.get(&id).cloned())
    }

    async fn update_maintenance(
        &self,
        id: i64,
        details: MaintenanceDetails,
    ) -> AppResult<Option<Maintenance>> {
        let mut state = self.state.lock().await;
        Ok(state.maintenances.get_mut(&id).map(|m| {
            m.service_date = details.service_date;
            m.description = details.description;
            m.cost = details.cost;
            m.workshop_name = details.workshop_name;
            m.clone()
        }))
    }

    async fn delete_maintenance(&self, id: i64) -> AppResult<bool> {
        Ok(self.state.lock().await.maintenances.remove(&id).is_some())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let mut state = self.state.lock().await;
        state.insert_user(user)
    }

    async fn insert_first_user(&self, user: NewUser) -> AppResult<Option<User>> {
        let mut state = self.state.lock().await;
        if !state.users.is_empty() {
            return Ok(None);
        }
        state.insert_user(user).map(Some)
    }
}

pub struct MemoryFleetTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl FleetTx for MemoryFleetTx {
    async fn find_car_for_update(&mut self, id: i64) -> AppResult<Option<Car>> {
        Ok(self.working.cars.get(&id).cloned())
    }

    async fn find_driver_for_update(&mut self, id: i64) -> AppResult<Option<Driver>> {
        Ok(self.working.drivers.get(&id).cloned())
    }

    async fn find_trip_for_update(&mut self, id: i64) -> AppResult<Option<TripLog>> {
        Ok(self.working.trips.get(&id).cloned())
    }

    async fn find_open_trip_by_driver(&mut self, driver_id: i64) -> AppResult<Option<TripLog>> {
        Ok(self
            .working
            .trips
            .values()
            .find(|t| t.driver_id == driver_id && t.is_open())
            .cloned())
    }

    async fn insert_trip(&mut self, trip: NewTrip) -> AppResult<TripLog> {
        let state = &mut self.working;
        // Same guarantees as the partial unique indexes in PostgreSQL.
        if state.trips.values().any(|t| t.is_open() && t.car_id == trip.car_id) {
            return Err(AppError::Conflict("car is not available".to_string()));
        }
        if state
            .trips
            .values()
            .any(|t| t.is_open() && t.driver_id == trip.driver_id)
        {
            return Err(AppError::Conflict(
                "driver already has an active trip".to_string(),
            ));
        }
        let trip = TripLog {
            id: next(&mut state.seq.trip),
            car_id: trip.car_id,
            driver_id: trip.driver_id,
            start_time: trip.start_time,
            end_time: None,
            start_km: trip.start_km,
            end_km: None,
            notes: trip.notes,
            created_at: trip.start_time,
        };
        state.trips.insert(trip.id, trip.clone());
        Ok(trip)
    }

    async fn close_trip(&mut self, id: i64, closing: TripClosing) -> AppResult<TripLog> {
        let trip = self
            .working
            .trips
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("trip not found".to_string()))?;
        trip.end_time = Some(closing.end_time);
        trip.end_km = Some(closing.end_km);
        trip.notes = closing.notes;
        Ok(trip.clone())
    }

    async fn update_car_status(
        &mut self,
        id: i64,
        status: CarStatus,
        current_driver_id: Option<i64>,
    ) -> AppResult<Car> {
        let car = self.working.car_mut(id)?;
        car.status = status;
        car.current_driver_id = current_driver_id;
        car.updated_at = Utc::now();
        Ok(car.clone())
    }

    async fn update_driver_status(&mut self, id: i64, status: DriverStatus) -> AppResult<Driver> {
        let driver = self.working.driver_mut(id)?;
        driver.status = status;
        driver.updated_at = Utc::now();
        Ok(driver.clone())
    }

    async fn update_car_details(&mut self, id: i64, details: CarDetails) -> AppResult<Car> {
        self.working
            .ensure_unique_plate(&details.license_plate, Some(id))?;
        let car = self.working.car_mut(id)?;
        car.license_plate = details.license_plate;
        car.brand = details.brand;
        car.model = details.model;
        car.year = details.year;
        car.updated_at = Utc::now();
        Ok(car.clone())
    }

    async fn update_driver_details(
        &mut self,
        id: i64,
        details: DriverDetails,
    ) -> AppResult<Driver> {
        self.working
            .ensure_unique_license(&details.license_number, Some(id))?;
        let driver = self.working.driver_mut(id)?;
        driver.name = details.name;
        driver.phone_number = details.phone_number;
        driver.license_number = details.license_number;
        driver.updated_at = Utc::now();
        Ok(driver.clone())
    }

    async fn insert_maintenance(&mut self, maintenance: NewMaintenance) -> AppResult<Maintenance> {
        let state = &mut self.working;
        if !state.cars.contains_key(&maintenance.car_id) {
            return Err(AppError::NotFound("car not found".to_string()));
        }
        let record = Maintenance {
            id: next(&mut state.seq.maintenance),
            car_id: maintenance.car_id,
            service_date: maintenance.service_date,
            description: maintenance.description,
            cost: maintenance.cost,
            workshop_name: maintenance.workshop_name,
            created_at: Utc::now(),
        };
        state.maintenances.insert(record.id, record.clone());
        Ok(record)
    }

    async fn count_trips_for_car(&mut self, car_id: i64) -> AppResult<i64> {
        Ok(self.working.trips.values().filter(|t| t.car_id == car_id).count() as i64)
    }

    async fn count_trips_for_driver(&mut self, driver_id: i64) -> AppResult<i64> {
        Ok(self
            .working
            .trips
            .values()
            .filter(|t| t.driver_id == driver_id)
            .count() as i64)
    }

    async fn delete_car(&mut self, id: i64) -> AppResult<()> {
        self.working.cars.remove(&id);
        self.working.maintenances.retain(|_, m| m.car_id != id);
        Ok(())
    }

    async fn delete_driver(&mut self, id: i64) -> AppResult<()> {
        self.working.drivers.remove(&id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryFleetTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
