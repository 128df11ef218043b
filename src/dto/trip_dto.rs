use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::car_dto::CarSummary;
use crate::dto::driver_dto::DriverSummary;
use crate::dto::pagination::PageRequest;
use crate::models::trip::TripLog;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CheckoutRequest {
    #[validate(range(min = 1))]
    pub car_id: i64,

    #[validate(range(min = 1))]
    pub driver_id: i64,

    #[validate(range(min = 0))]
    #[serde(default)]
    pub start_km: i64,

    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CheckinRequest {
    #[validate(range(min = 1))]
    pub trip_id: i64,

    #[validate(range(min = 0))]
    #[serde(default)]
    pub end_km: i64,

    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TripListQuery {
    #[validate(range(min = 1))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    pub car_id: Option<i64>,
    pub driver_id: Option<i64>,
    /// Unset lists every trip, `true` only open ones, `false` only closed ones.
    pub active: Option<bool>,
}

impl TripListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Trip with car and driver snapshots
#[derive(Debug, Clone, Serialize)]
pub struct TripView {
    #[serde(flatten)]
    pub trip: TripLog,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car: Option<CarSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<DriverSummary>,
}
