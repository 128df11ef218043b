//! Status invariant layer
//!
//! The only writer of `Car.status`, `Car.current_driver_id` and
//! `Driver.status`. Trip checkout/checkin and the CRUD services go through
//! these functions so that a car is IN_USE exactly when it carries a driver
//! and an open trip.

use crate::models::car::{Car, CarStatus};
use crate::models::driver::{Driver, DriverStatus};
use crate::repositories::FleetTx;
use crate::utils::errors::{validation_error, AppError, AppResult};

/// Writes car status and assignment together.
pub async fn set_car_status(
    tx: &mut dyn FleetTx,
    car_id: i64,
    status: CarStatus,
    driver_id: Option<i64>,
) -> AppResult<Car> {
    match (status, driver_id) {
        (CarStatus::InUse, None) => Err(AppError::Internal(format!(
            "car {car_id}: IN_USE requires a current driver"
        ))),
        (CarStatus::Available | CarStatus::Maintenance, Some(_)) => Err(AppError::Internal(
            format!("car {car_id}: only an IN_USE car can carry a driver"),
        )),
        _ => tx.update_car_status(car_id, status, driver_id).await,
    }
}

pub async fn set_driver_status(
    tx: &mut dyn FleetTx,
    driver_id: i64,
    status: DriverStatus,
) -> AppResult<Driver> {
    tx.update_driver_status(driver_id, status).await
}

/// Status of a newly created car.
pub fn initial_car_status(requested: Option<CarStatus>) -> AppResult<CarStatus> {
    match requested {
        None => Ok(CarStatus::Available),
        Some(CarStatus::InUse) => Err(validation_error(
            "status",
            "a car can only become IN_USE through a trip checkout",
        )),
        Some(status) => Ok(status),
    }
}

/// CRUD may only move a car between AVAILABLE and MAINTENANCE.
pub fn check_car_status_change(current: CarStatus, requested: CarStatus) -> AppResult<()> {
    if current == requested {
        return Ok(());
    }
    if requested == CarStatus::InUse {
        return Err(AppError::Conflict(
            "car status IN_USE is managed by trips".to_string(),
        ));
    }
    if current == CarStatus::InUse {
        return Err(AppError::Conflict("car is currently in use".to_string()));
    }
    Ok(())
}

/// New drivers always start OFF_DUTY.
pub fn check_initial_driver_status(requested: Option<DriverStatus>) -> AppResult<()> {
    match requested {
        Some(DriverStatus::Active) => Err(validation_error(
            "status",
            "a driver can only become ACTIVE through a trip checkout",
        )),
        _ => Ok(()),
    }
}

pub fn check_driver_status_change(
    current: DriverStatus,
    requested: Option<DriverStatus>,
) -> AppResult<()> {
    match requested {
        Some(status) if status != current => Err(AppError::Conflict(
            "driver status is managed by trips".to_string(),
        )),
        _ => Ok(()),
    }
}

pub fn ensure_car_deletable(car: &Car, trip_count: i64) -> AppResult<()> {
    if car.status == CarStatus::InUse {
        return Err(AppError::Conflict("car is currently in use".to_string()));
    }
    if trip_count > 0 {
        return Err(AppError::Conflict("car has trip history".to_string()));
    }
    Ok(())
}

pub fn ensure_driver_deletable(driver: &Driver, trip_count: i64) -> AppResult<()> {
    if driver.status == DriverStatus::Active {
        return Err(AppError::Conflict("driver is currently on duty".to_string()));
    }
    if trip_count > 0 {
        return Err(AppError::Conflict("driver has trip history".to_string()));
    }
    Ok(())
}

/// Car status after a maintenance record is logged. `None` means unchanged.
pub fn status_after_maintenance(current: CarStatus) -> AppResult<Option<CarStatus>> {
    match current {
        CarStatus::Available => Ok(Some(CarStatus::Maintenance)),
        CarStatus::Maintenance => Ok(None),
        CarStatus::InUse => Err(AppError::Conflict("car is currently in use".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::car::NewCar;
    use crate::repositories::{FleetStore, MemoryFleetStore};

    #[test]
    fn test_initial_car_status() {
        assert_eq!(initial_car_status(None).unwrap(), CarStatus::Available);
        assert_eq!(
            initial_car_status(Some(CarStatus::Maintenance)).unwrap(),
            CarStatus::Maintenance
        );
        assert!(matches!(
            initial_car_status(Some(CarStatus::InUse)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_car_status_change_rules() {
        use CarStatus::*;
        assert!(check_car_status_change(Available, Maintenance).is_ok());
        assert!(check_car_status_change(Maintenance, Available).is_ok());
        assert!(check_car_status_change(InUse, InUse).is_ok());
        assert!(matches!(
            check_car_status_change(Available, InUse),
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            check_car_status_change(InUse, Available),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_driver_status_rules() {
        assert!(check_initial_driver_status(None).is_ok());
        assert!(check_initial_driver_status(Some(DriverStatus::OffDuty)).is_ok());
        assert!(check_initial_driver_status(Some(DriverStatus::Active)).is_err());

        assert!(check_driver_status_change(DriverStatus::OffDuty, None).is_ok());
        assert!(
            check_driver_status_change(DriverStatus::OffDuty, Some(DriverStatus::OffDuty)).is_ok()
        );
        match check_driver_status_change(DriverStatus::OffDuty, Some(DriverStatus::Active)) {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "driver status is managed by trips"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_status_after_maintenance() {
        assert_eq!(
            status_after_maintenance(CarStatus::Available).unwrap(),
            Some(CarStatus::Maintenance)
        );
        assert_eq!(status_after_maintenance(CarStatus::Maintenance).unwrap(), None);
        assert!(status_after_maintenance(CarStatus::InUse).is_err());
    }

    #[tokio::test]
    async fn test_set_car_status_rejects_inconsistent_assignment() {
        let store = MemoryFleetStore::new();
        let car = store
            .insert_car(NewCar {
                license_plate: "B 10 ZZ".to_string(),
                brand: "Honda".to_string(),
                model: "Jazz".to_string(),
                year: 2019,
                status: CarStatus::Available,
            })
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        let err = set_car_status(tx.as_mut(), car.id, CarStatus::InUse, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        let err = set_car_status(tx.as_mut(), car.id, CarStatus::Available, Some(7))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        let updated = set_car_status(tx.as_mut(), car.id, CarStatus::Maintenance, None)
            .await
            .unwrap();
        assert_eq!(updated.status, CarStatus::Maintenance);
    }
}
