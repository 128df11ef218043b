use serde::Serialize;

use crate::dto::trip_dto::TripView;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSummary {
    pub total_cars: i64,
    pub available_cars: i64,
    pub in_use_cars: i64,
    pub maintenance_cars: i64,
    pub total_drivers: i64,
    pub active_drivers: i64,
    pub recent_trips: Vec<TripView>,
}
