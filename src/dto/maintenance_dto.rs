use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::car_dto::CarSummary;
use crate::dto::pagination::PageRequest;
use crate::models::maintenance::Maintenance;
use crate::utils::validation::{validate_non_negative, validate_not_empty};

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateMaintenanceRequest {
    #[validate(range(min = 1))]
    pub car_id: i64,

    pub service_date: DateTime<Utc>,

    #[validate(custom = "validate_not_empty")]
    pub description: String,

    #[validate(custom = "validate_non_negative")]
    #[serde(default)]
    pub cost: Decimal,

    #[validate(length(max = 100))]
    #[serde(default)]
    pub workshop_name: String,
}

/// Update body; the car a record belongs to cannot change.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct UpdateMaintenanceRequest {
    pub service_date: DateTime<Utc>,

    #[validate(custom = "validate_not_empty")]
    pub description: String,

    #[validate(custom = "validate_non_negative")]
    #[serde(default)]
    pub cost: Decimal,

    #[validate(length(max = 100))]
    #[serde(default)]
    pub workshop_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MaintenanceListQuery {
    #[validate(range(min = 1))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    pub car_id: Option<i64>,
}

impl MaintenanceListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceResponse {
    #[serde(flatten)]
    pub maintenance: Maintenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car: Option<CarSummary>,
}
