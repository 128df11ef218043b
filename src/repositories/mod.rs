//! Entity store
//!
//! `FleetStore` is the persistence seam of the service. Reads and simple CRUD
//! run directly on the store; every multi-row change runs inside a `FleetTx`
//! obtained from `begin()`. Dropping a transaction without `commit()` rolls it
//! back.

pub mod memory_store;
pub mod pg_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::dto::pagination::PageRequest;
use crate::models::car::{Car, CarDetails, CarStatus, NewCar};
use crate::models::driver::{Driver, DriverDetails, DriverStatus, NewDriver};
use crate::models::maintenance::{Maintenance, MaintenanceDetails, NewMaintenance};
use crate::models::trip::{NewTrip, TripClosing, TripLog};
use crate::models::user::{NewUser, User};
use crate::utils::errors::AppResult;

pub use memory_store::MemoryFleetStore;
pub use pg_store::PgFleetStore;

#[derive(Debug, Clone, Default)]
pub struct CarFilter {
    pub status: Option<CarStatus>,
    /// Case-insensitive substring over license plate, brand and model
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DriverFilter {
    pub status: Option<DriverStatus>,
    /// Case-insensitive substring over name, phone number and license number
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TripFilter {
    pub car_id: Option<i64>,
    pub driver_id: Option<i64>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct MaintenanceFilter {
    pub car_id: Option<i64>,
}

/// Blank search terms filter nothing.
pub fn normalize_search(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[async_trait]
pub trait FleetStore: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn FleetTx>>;

    // Cars
    async fn list_cars(&self, filter: &CarFilter, page: PageRequest) -> AppResult<(Vec<Car>, i64)>;
    async fn get_car(&self, id: i64) -> AppResult<Option<Car>>;
    async fn get_cars_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Car>>;
    async fn insert_car(&self, car: NewCar) -> AppResult<Car>;
    async fn update_car_location(
        &self,
        id: i64,
        lat: f64,
        lng: f64,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Car>>;
    async fn count_cars_by_status(&self, status: CarStatus) -> AppResult<i64>;

    // Drivers
    async fn list_drivers(
        &self,
        filter: &DriverFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Driver>, i64)>;
    async fn get_driver(&self, id: i64) -> AppResult<Option<Driver>>;
    async fn get_drivers_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Driver>>;
    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver>;
    async fn count_drivers(&self) -> AppResult<i64>;
    async fn count_drivers_by_status(&self, status: DriverStatus) -> AppResult<i64>;

    // Trips
    async fn list_trips(
        &self,
        filter: &TripFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<TripLog>, i64)>;
    async fn get_trip(&self, id: i64) -> AppResult<Option<TripLog>>;
    async fn recent_trips(&self, limit: i64) -> AppResult<Vec<TripLog>>;

    // Maintenances
    async fn list_maintenances(
        &self,
        filter: &MaintenanceFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Maintenance>, i64)>;
    async fn get_maintenance(&self, id: i64) -> AppResult<Option<Maintenance>>;
    async fn update_maintenance(
        &self,
        id: i64,
        details: MaintenanceDetails,
    ) -> AppResult<Option<Maintenance>>;
    /// Returns false when no record had that id.
    async fn delete_maintenance(&self, id: i64) -> AppResult<bool>;

    // Users
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn get_user(&self, id: i64) -> AppResult<Option<User>>;
    async fn insert_user(&self, user: NewUser) -> AppResult<User>;
    /// Inserts only while the users table is empty; `None` once any user
    /// exists.
    async fn insert_first_user(&self, user: NewUser) -> AppResult<Option<User>>;
}

/// One store transaction. `*_for_update` reads lock the row until commit or
/// rollback; callers lock in the order trip, car, driver.
#[async_trait]
pub trait FleetTx: Send {
    async fn find_car_for_update(&mut self, id: i64) -> AppResult<Option<Car>>;
    async fn find_driver_for_update(&mut self, id: i64) -> AppResult<Option<Driver>>;
    async fn find_trip_for_update(&mut self, id: i64) -> AppResult<Option<TripLog>>;
    async fn find_open_trip_by_driver(&mut self, driver_id: i64) -> AppResult<Option<TripLog>>;

    async fn insert_trip(&mut self, trip: NewTrip) -> AppResult<TripLog>;
    async fn close_trip(&mut self, id: i64, closing: TripClosing) -> AppResult<TripLog>;

    async fn update_car_status(
        &mut self,
        id: i64,
        status: CarStatus,
        current_driver_id: Option<i64>,
    ) -> AppResult<Car>;
    async fn update_driver_status(&mut self, id: i64, status: DriverStatus) -> AppResult<Driver>;

    async fn update_car_details(&mut self, id: i64, details: CarDetails) -> AppResult<Car>;
    async fn update_driver_details(&mut self, id: i64, details: DriverDetails)
        -> AppResult<Driver>;
    async fn insert_maintenance(&mut self, maintenance: NewMaintenance) -> AppResult<Maintenance>;

    async fn count_trips_for_car(&mut self, car_id: i64) -> AppResult<i64>;
    async fn count_trips_for_driver(&mut self, driver_id: i64) -> AppResult<i64>;
    /// Also removes the car's maintenance records.
    async fn delete_car(&mut self, id: i64) -> AppResult<()>;
    async fn delete_driver(&mut self, id: i64) -> AppResult<()>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_search() {
        assert_eq!(normalize_search(None), None);
        assert_eq!(normalize_search(Some("   ")), None);
        assert_eq!(normalize_search(Some(" toyota ")), Some("toyota".to_string()));
    }
}
