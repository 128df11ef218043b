//! PostgreSQL store
//!
//! Runtime-checked `query_as` against the schema in `migrations/`. Transactions
//! lock rows with `SELECT ... FOR UPDATE`; the partial unique indexes on open
//! trips back the one-open-trip rules when two writers race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use super::{CarFilter, DriverFilter, FleetStore, FleetTx, MaintenanceFilter, TripFilter};
use crate::dto::pagination::PageRequest;
use crate::models::car::{Car, CarDetails, CarStatus, NewCar};
use crate::models::driver::{Driver, DriverDetails, DriverStatus, NewDriver};
use crate::models::maintenance::{Maintenance, MaintenanceDetails, NewMaintenance};
use crate::models::trip::{NewTrip, TripClosing, TripLog};
use crate::models::user::{NewUser, User};
use crate::utils::errors::{AppError, AppResult};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

const INSERT_USER: &str = r#"
    INSERT INTO users (username, password_hash, role)
    VALUES ($1, $2, $3)
    RETURNING *
"#;

fn unique_violation_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("cars_license_plate_key") => "license plate already exists",
        Some("drivers_license_number_key") => "license number already exists",
        Some("users_username_key") => "username already exists",
        Some("trip_logs_open_car_idx") => "car is not available",
        Some("trip_logs_open_driver_idx") => "driver already has an active trip",
        _ => "resource already exists",
    }
}

/// Maps constraint and concurrency failures to `Conflict`; everything else
/// stays a database error.
pub(crate) fn map_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return AppError::Conflict(unique_violation_message(db.constraint()).to_string())
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return AppError::Conflict("record is referenced by other records".to_string())
            }
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                return AppError::Conflict(
                    "concurrent update detected, please retry".to_string(),
                )
            }
            _ => {}
        }
    }
    AppError::Database(e)
}

/// `%term%` with LIKE wildcards in the term matched literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn push_car_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &CarFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (license_plate ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR brand ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR model ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn push_driver_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &DriverFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR phone_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR license_number ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn push_trip_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &TripFilter) {
    if let Some(car_id) = filter.car_id {
        qb.push(" AND car_id = ").push_bind(car_id);
    }
    if let Some(driver_id) = filter.driver_id {
        qb.push(" AND driver_id = ").push_bind(driver_id);
    }
    match filter.active {
        Some(true) => {
            qb.push(" AND end_time IS NULL");
        }
        Some(false) => {
            qb.push(" AND end_time IS NOT NULL");
        }
        None => {}
    }
}

fn push_maintenance_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &MaintenanceFilter) {
    if let Some(car_id) = filter.car_id {
        qb.push(" AND car_id = ").push_bind(car_id);
    }
}

fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: PageRequest) {
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());
}

#[derive(Clone)]
pub struct PgFleetStore {
    pool: PgPool,
}

impl PgFleetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, mut qb: QueryBuilder<'_, Postgres>) -> AppResult<i64> {
        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

#[async_trait]
impl FleetStore for PgFleetStore {
    async fn begin(&self) -> AppResult<Box<dyn FleetTx>> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        Ok(Box::new(PgFleetTx { tx }))
    }

    async fn list_cars(&self, filter: &CarFilter, page: PageRequest) -> AppResult<(Vec<Car>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM cars WHERE TRUE");
        push_car_filter(&mut count, filter);
        let total = self.count(count).await?;

        let mut query = QueryBuilder::new("SELECT * FROM cars WHERE TRUE");
        push_car_filter(&mut query, filter);
        push_page(&mut query, page);
        let cars = query
            .build_query_as::<Car>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok((cars, total))
    }

    async fn get_car(&self, id: i64) -> AppResult<Option<Car>> {
        sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn get_cars_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Car>> {
        sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn insert_car(&self, car: NewCar) -> AppResult<Car> {
        sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (license_plate, brand, model, year, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(car.license_plate)
        .bind(car.brand)
        .bind(car.model)
        .bind(car.year)
        .bind(car.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn update_car_location(
        &self,
        id: i64,
        lat: f64,
        lng: f64,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Car>> {
        sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET last_lat = $2, last_lng = $3, last_update_loc = $4, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(lat)
        .bind(lng)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn count_cars_by_status(&self, status: CarStatus) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cars WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn list_drivers(
        &self,
        filter: &DriverFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Driver>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM drivers WHERE TRUE");
        push_driver_filter(&mut count, filter);
        let total = self.count(count).await?;

        let mut query = QueryBuilder::new("SELECT * FROM drivers WHERE TRUE");
        push_driver_filter(&mut query, filter);
        push_page(&mut query, page);
        let drivers = query
            .build_query_as::<Driver>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok((drivers, total))
    }

    async fn get_driver(&self, id: i64) -> AppResult<Option<Driver>> {
        sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn get_drivers_by_ids(&self, ids: &[i64]) -> AppResult<Vec<Driver>> {
        sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver> {
        sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (name, phone_number, license_number, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(driver.name)
        .bind(driver.phone_number)
        .bind(driver.license_number)
        .bind(DriverStatus::OffDuty.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn count_drivers(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM drivers")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn count_drivers_by_status(&self, status: DriverStatus) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM drivers WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn list_trips(
        &self,
        filter: &TripFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<TripLog>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM trip_logs WHERE TRUE");
        push_trip_filter(&mut count, filter);
        let total = self.count(count).await?;

        let mut query = QueryBuilder::new("SELECT * FROM trip_logs WHERE TRUE");
        push_trip_filter(&mut query, filter);
        push_page(&mut query, page);
        let trips = query
            .build_query_as::<TripLog>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok((trips, total))
    }

    async fn get_trip(&self, id: i64) -> AppResult<Option<TripLog>> {
        sqlx::query_as::<_, TripLog>("SELECT * FROM trip_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn recent_trips(&self, limit: i64) -> AppResult<Vec<TripLog>> {
        sqlx::query_as::<_, TripLog>(
            "SELECT * FROM trip_logs ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn list_maintenances(
        &self,
        filter: &MaintenanceFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Maintenance>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM maintenances WHERE TRUE");
        push_maintenance_filter(&mut count, filter);
        let total = self.count(count).await?;

        let mut query = QueryBuilder::new("SELECT * FROM maintenances WHERE TRUE");
        push_maintenance_filter(&mut query, filter);
        push_page(&mut query, page);
        let records = query
            .build_query_as::<Maintenance>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok((records, total))
    }

    async fn get_maintenance(&self, id: i64) -> AppResult<Option<Maintenance>> {
        sqlx::query_as::<_, Maintenance>("SELECT * FROM maintenances WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn update_maintenance(
        &self,
        id: i64,
        details: MaintenanceDetails,
    ) -> AppResult<Option<Maintenance>> {
        sqlx::query_as::<_, Maintenance>(
            r#"
            UPDATE maintenances
            SET service_date = $2, description = $3, cost = $4, workshop_name = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(details.service_date)
        .bind(details.description)
        .bind(details.cost)
        .bind(details.workshop_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn delete_maintenance(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM maintenances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn get_user(&self, id: i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(INSERT_USER)
            .bind(user.username)
            .bind(user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn insert_first_user(&self, user: NewUser) -> AppResult<Option<User>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        // Serializes concurrent first registrations; plain reads still proceed.
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;
        if existing > 0 {
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>(INSERT_USER)
            .bind(user.username)
            .bind(user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;
        tx.commit().await.map_err(map_db_error)?;
        Ok(Some(user))
    }
}

pub struct PgFleetTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl FleetTx for PgFleetTx {
    async fn find_car_for_update(&mut self, id: i64) -> AppResult<Option<Car>> {
        sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_db_error)
    }

    async fn find_driver_for_update(&mut self, id: i64) -> AppResult<Option<Driver>> {
        sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_db_error)
    }

    async fn find_trip_for_update(&mut self, id: i64) -> AppResult<Option<TripLog>> {
        sqlx::query_as::<_, TripLog>("SELECT * FROM trip_logs WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_db_error)
    }

    async fn find_open_trip_by_driver(&mut self, driver_id: i64) -> AppResult<Option<TripLog>> {
        sqlx::query_as::<_, TripLog>(
            "SELECT * FROM trip_logs WHERE driver_id = $1 AND end_time IS NULL LIMIT 1",
        )
        .bind(driver_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)
    }

    async fn insert_trip(&mut self, trip: NewTrip) -> AppResult<TripLog> {
        sqlx::query_as::<_, TripLog>(
            r#"
            INSERT INTO trip_logs (car_id, driver_id, start_time, start_km, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $3)
            RETURNING *
            "#,
        )
        .bind(trip.car_id)
        .bind(trip.driver_id)
        .bind(trip.start_time)
        .bind(trip.start_km)
        .bind(trip.notes)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)
    }

    async fn close_trip(&mut self, id: i64, closing: TripClosing) -> AppResult<TripLog> {
        sqlx::query_as::<_, TripLog>(
            r#"
            UPDATE trip_logs
            SET end_time = $2, end_km = $3, notes = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(closing.end_time)
        .bind(closing.end_km)
        .bind(closing.notes)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)
    }

    async fn update_car_status(
        &mut self,
        id: i64,
        status: CarStatus,
        current_driver_id: Option<i64>,
    ) -> AppResult<Car> {
        sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET status = $2, current_driver_id = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(current_driver_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)
    }

    async fn update_driver_status(&mut self, id: i64, status: DriverStatus) -> AppResult<Driver> {
        sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)
    }

    async fn update_car_details(&mut self, id: i64, details: CarDetails) -> AppResult<Car> {
        sqlx::query_as::<_, Car>(
            r#"
            UPDATE cars
            SET license_plate = $2, brand = $3, model = $4, year = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(details.license_plate)
        .bind(details.brand)
        .bind(details.model)
        .bind(details.year)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)
    }

    async fn update_driver_details(
        &mut self,
        id: i64,
        details: DriverDetails,
    ) -> AppResult<Driver> {
        sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET name = $2, phone_number = $3, license_number = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(details.name)
        .bind(details.phone_number)
        .bind(details.license_number)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)
    }

    async fn insert_maintenance(&mut self, maintenance: NewMaintenance) -> AppResult<Maintenance> {
        sqlx::query_as::<_, Maintenance>(
            r#"
            INSERT INTO maintenances (car_id, service_date, description, cost, workshop_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(maintenance.car_id)
        .bind(maintenance.service_date)
        .bind(maintenance.description)
        .bind(maintenance.cost)
        .bind(maintenance.workshop_name)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)
    }

    async fn count_trips_for_car(&mut self, car_id: i64) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trip_logs WHERE car_id = $1")
            .bind(car_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_db_error)
    }

    async fn count_trips_for_driver(&mut self, driver_id: i64) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trip_logs WHERE driver_id = $1")
            .bind(driver_id)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_db_error)
    }

    async fn delete_car(&mut self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM cars WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn delete_driver(&mut self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("toyota"), "%toyota%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("AB_1"), "%AB\\_1%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_unique_violation_messages() {
        assert_eq!(
            unique_violation_message(Some("cars_license_plate_key")),
            "license plate already exists"
        );
        assert_eq!(
            unique_violation_message(Some("trip_logs_open_driver_idx")),
            "driver already has an active trip"
        );
        assert_eq!(unique_violation_message(None), "resource already exists");
    }

    /// Needs a database: `DATABASE_URL=... cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn test_serialization_failure_is_conflict() {
        let Some(url) = std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty()) else {
            return;
        };
        let pool = crate::database::connect(&crate::config::DatabaseConfig::new(url))
            .await
            .unwrap();
        let store = PgFleetStore::new(pool.clone());
        let car = store
            .insert_car(NewCar {
                license_plate: format!("PG-S-{}", Utc::now().timestamp_micros()),
                brand: "Toyota".to_string(),
                model: "Avanza".to_string(),
                year: 2020,
                status: CarStatus::Available,
            })
            .await
            .unwrap();

        let mut tx = pool.begin().await.unwrap();
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await
            .unwrap();
        sqlx::query("SELECT id FROM cars WHERE id = $1")
            .bind(car.id)
            .execute(&mut *tx)
            .await
            .unwrap();

        sqlx::query("UPDATE cars SET brand = 'Honda' WHERE id = $1")
            .bind(car.id)
            .execute(&pool)
            .await
            .unwrap();

        let err = sqlx::query("UPDATE cars SET brand = 'Daihatsu' WHERE id = $1")
            .bind(car.id)
            .execute(&mut *tx)
            .await
            .unwrap_err();
        match map_db_error(err) {
            AppError::Conflict(msg) => assert_eq!(msg, "concurrent update detected, please retry"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
