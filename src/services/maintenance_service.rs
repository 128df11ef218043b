//! Maintenance records
//!
//! Logging a maintenance moves an AVAILABLE car into MAINTENANCE in the same
//! transaction as the insert.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::dto::car_dto::CarSummary;
use crate::dto::maintenance_dto::{
    CreateMaintenanceRequest, MaintenanceListQuery, MaintenanceResponse, UpdateMaintenanceRequest,
};
use crate::models::maintenance::{Maintenance, MaintenanceDetails, NewMaintenance};
use crate::repositories::{FleetStore, MaintenanceFilter};
use crate::services::status_service::{set_car_status, status_after_maintenance};
use crate::utils::errors::{AppError, AppResult};

fn maintenance_not_found() -> AppError {
    AppError::NotFound("maintenance not found".to_string())
}

#[derive(Clone)]
pub struct MaintenanceService {
    store: Arc<dyn FleetStore>,
}

impl MaintenanceService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub async fn list_maintenances(
        &self,
        query: &MaintenanceListQuery,
    ) -> AppResult<(Vec<MaintenanceResponse>, i64)> {
        let filter = MaintenanceFilter {
            car_id: query.car_id,
        };
        let (records, total) = self
            .store
            .list_maintenances(&filter, query.page_request())
            .await?;
        Ok((self.with_cars(records).await?, total))
    }

    pub async fn get_maintenance(&self, id: i64) -> AppResult<MaintenanceResponse> {
        let record = self
            .store
            .get_maintenance(id)
            .await?
            .ok_or_else(maintenance_not_found)?;
        self.with_car(record).await
    }

    pub async fn create_maintenance(
        &self,
        request: CreateMaintenanceRequest,
    ) -> AppResult<MaintenanceResponse> {
        let mut tx = self.store.begin().await?;
        let car = tx
            .find_car_for_update(request.car_id)
            .await?
            .ok_or_else(|| AppError::NotFound("car not found".to_string()))?;
        let next_status = status_after_maintenance(car.status)?;

        let record = tx
            .insert_maintenance(NewMaintenance {
                car_id: car.id,
                service_date: request.service_date,
                description: request.description.trim().to_string(),
                cost: request.cost,
                workshop_name: request.workshop_name.trim().to_string(),
            })
            .await?;
        let car = match next_status {
            Some(status) => set_car_status(tx.as_mut(), car.id, status, None).await?,
            None => car,
        };
        tx.commit().await?;

        info!(maintenance_id = record.id, car_id = car.id, status = %car.status, "🔧 Maintenance logged");
        Ok(MaintenanceResponse {
            maintenance: record,
            car: Some(CarSummary::from(&car)),
        })
    }

    /// Descriptive fields only; the record stays attached to its car.
    pub async fn update_maintenance(
        &self,
        id: i64,
        request: UpdateMaintenanceRequest,
    ) -> AppResult<MaintenanceResponse> {
        let record = self
            .store
            .update_maintenance(
                id,
                MaintenanceDetails {
                    service_date: request.service_date,
                    description: request.description.trim().to_string(),
                    cost: request.cost,
                    workshop_name: request.workshop_name.trim().to_string(),
                },
            )
            .await?
            .ok_or_else(maintenance_not_found)?;
        self.with_car(record).await
    }

    pub async fn delete_maintenance(&self, id: i64) -> AppResult<()> {
        if !self.store.delete_maintenance(id).await? {
            return Err(maintenance_not_found());
        }
        info!(maintenance_id = id, "🗑️ Maintenance deleted");
        Ok(())
    }

    async fn with_car(&self, record: Maintenance) -> AppResult<MaintenanceResponse> {
        let car = self
            .store
            .get_car(record.car_id)
            .await?
            .as_ref()
            .map(CarSummary::from);
        Ok(MaintenanceResponse {
            maintenance: record,
            car,
        })
    }

    async fn with_cars(&self, records: Vec<Maintenance>) -> AppResult<Vec<MaintenanceResponse>> {
        let mut car_ids: Vec<i64> = records.iter().map(|m| m.car_id).collect();
        car_ids.sort_unstable();
        car_ids.dedup();
        let cars: HashMap<i64, CarSummary> = self
            .store
            .get_cars_by_ids(&car_ids)
            .await?
            .iter()
            .map(|c| (c.id, CarSummary::from(c)))
            .collect();

        Ok(records
            .into_iter()
            .map(|record| MaintenanceResponse {
                car: cars.get(&record.car_id).cloned(),
                maintenance: record,
            })
            .collect())
    }
}
