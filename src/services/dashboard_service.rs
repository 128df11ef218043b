//! Fleet summary
//!
//! Read only. A failing sub-query degrades to zero (or no recent trips) and
//! is logged; the summary itself never fails.

use std::future::Future;
use std::sync::Arc;

use tracing::warn;

use crate::dto::dashboard_dto::DashboardSummary;
use crate::models::car::CarStatus;
use crate::models::driver::DriverStatus;
use crate::repositories::FleetStore;
use crate::services::trip_service::TripService;
use crate::utils::errors::AppResult;

pub const RECENT_TRIPS_LIMIT: i64 = 5;

async fn or_zero<F>(what: &str, count: F) -> i64
where
    F: Future<Output = AppResult<i64>>,
{
    match count.await {
        Ok(n) => n,
        Err(e) => {
            warn!("Summary: failed to count {}: {}", what, e);
            0
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn FleetStore>,
    trips: TripService,
}

impl DashboardService {
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self {
            trips: TripService::new(store.clone()),
            store,
        }
    }

    pub async fn get_summary(&self) -> DashboardSummary {
        let store = &self.store;
        let (available_cars, in_use_cars, maintenance_cars, total_drivers, active_drivers) = tokio::join!(
            or_zero("available cars", store.count_cars_by_status(CarStatus::Available)),
            or_zero("in-use cars", store.count_cars_by_status(CarStatus::InUse)),
            or_zero("cars in maintenance", store.count_cars_by_status(CarStatus::Maintenance)),
            or_zero("drivers", store.count_drivers()),
            or_zero("active drivers", store.count_drivers_by_status(DriverStatus::Active)),
        );

        let recent_trips = match self.trips.recent_trips(RECENT_TRIPS_LIMIT).await {
            Ok(trips) => trips,
            Err(e) => {
                warn!("Summary: failed to load recent trips: {}", e);
                Vec::new()
            }
        };

        DashboardSummary {
            total_cars: available_cars + in_use_cars + maintenance_cars,
            available_cars,
            in_use_cars,
            maintenance_cars,
            total_drivers,
            active_drivers,
            recent_trips,
        }
    }
}
