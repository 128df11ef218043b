//! Driver CRUD

use std::sync::Arc;

use tracing::info;

use crate::dto::driver_dto::{DriverListQuery, DriverRequest};
use crate::models::driver::{Driver, DriverDetails, NewDriver};
use crate::repositories::{normalize_search, DriverFilter, FleetStore};
use crate::services::status_service::{
    check_driver_status_change, check_initial_driver_status, ensure_driver_deletable,
};
use crate::utils::errors::{AppError, AppResult};

fn driver_not_found() -> AppError {
    AppError::NotFound("driver not found".to_string())
}

#[derive(Clone)]
pub struct DriverService {
    store: Arc<dyn FleetStore>,
}

impl DriverService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn list_drivers(&self, query: &DriverListQuery) -> AppResult<(Vec<Driver>, i64)> {
        let filter = DriverFilter {
            status: query.status,
            search: normalize_search(query.search.as_deref()),
        };
        self.store.list_drivers(&filter, query.page_request()).await
    }

    pub async fn get_driver(&self, id: i64) -> AppResult<Driver> {
        self.store.get_driver(id).await?.ok_or_else(driver_not_found)
    }

    pub async fn create_driver(&self, request: DriverRequest) -> AppResult<Driver> {
        check_initial_driver_status(request.status)?;
        let driver = self
            .store
            .insert_driver(NewDriver {
                name: request.name.trim().to_string(),
                phone_number: request.phone_number.trim().to_string(),
                license_number: request.license_number.trim().to_string(),
            })
            .await?;
        info!(driver_id = driver.id, "Driver created");
        Ok(driver)
    }

    /// Status belongs to the trip lifecycle; only descriptive fields change.
    pub async fn update_driver(&self, id: i64, request: DriverRequest) -> AppResult<Driver> {
        let mut tx = self.store.begin().await?;
        let current = tx
            .find_driver_for_update(id)
            .await?
            .ok_or_else(driver_not_found)?;
        check_driver_status_change(current.status, request.status)?;

        let driver = tx
            .update_driver_details(
                id,
                DriverDetails {
                    name: request.name.trim().to_string(),
                    phone_number: request.phone_number.trim().to_string(),
                    license_number: request.license_number.trim().to_string(),
                },
            )
            .await?;
        tx.commit().await?;

        info!(driver_id = id, "Driver updated");
        Ok(driver)
    }

    pub async fn delete_driver(&self, id: i64) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        let driver = tx
            .find_driver_for_update(id)
            .await?
            .ok_or_else(driver_not_found)?;
        let trips = tx.count_trips_for_driver(id).await?;
        ensure_driver_deletable(&driver, trips)?;
        tx.delete_driver(id).await?;
        tx.commit().await?;

        info!(driver_id = id, "🗑️ Driver deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::DriverStatus;
    use crate::repositories::MemoryFleetStore;

    fn request(name: &str, license: &str, status: Option<DriverStatus>) -> DriverRequest {
        DriverRequest {
            name: name.to_string(),
            phone_number: "0812-555".to_string(),
            license_number: license.to_string(),
            status,
        }
    }

    fn service() -> DriverService {
        DriverService::new(Arc::new(MemoryFleetStore::new()))
    }

    #[tokio::test]
    async fn test_create_is_off_duty() {
        let service = service();
        let driver = service
            .create_driver(request("Andi", "SIM-1", None))
            .await
            .unwrap();
        assert_eq!(driver.status, DriverStatus::OffDuty);

        let err = service
            .create_driver(request("Rina", "SIM-2", Some(DriverStatus::Active)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_license_number_unique_unless_empty() {
        let service = service();
        service.create_driver(request("A", "SIM-9", None)).await.unwrap();
        let err = service
            .create_driver(request("B", "SIM-9", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        service.create_driver(request("C", "", None)).await.unwrap();
        service.create_driver(request("D", "", None)).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_cannot_change_status() {
        let service = service();
        let driver = service
            .create_driver(request("Andi", "SIM-3", None))
            .await
            .unwrap();

        let updated = service
            .update_driver(driver.id, request("Andi S.", "SIM-3", Some(DriverStatus::OffDuty)))
            .await
            .unwrap();
        assert_eq!(updated.name, "Andi S.");

        match service
            .update_driver(driver.id, request("Andi", "SIM-3", Some(DriverStatus::Active)))
            .await
        {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "driver status is managed by trips"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_driver() {
        let service = service();
        let driver = service
            .create_driver(request("Andi", "SIM-4", None))
            .await
            .unwrap();
        service.delete_driver(driver.id).await.unwrap();
        assert!(matches!(
            service.get_driver(driver.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
