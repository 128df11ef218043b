use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::driver_dto::DriverSummary;
use crate::dto::pagination::PageRequest;
use crate::models::car::{Car, CarStatus};
use crate::utils::validation::{validate_not_empty, validate_year};

/// validator passes `Copy` fields by value; adapt to `validate_year(&i32)`.
fn validate_year_value(year: i32) -> Result<(), validator::ValidationError> {
    validate_year(&year)
}

/// Body for car create and update (full replacement of descriptive fields)
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CarRequest {
    #[validate(length(max = 20), custom = "validate_not_empty")]
    pub license_plate: String,

    #[validate(length(max = 50), custom = "validate_not_empty")]
    pub brand: String,

    #[validate(length(max = 50), custom = "validate_not_empty")]
    pub model: String,

    #[validate(custom = "validate_year_value")]
    #[serde(default)]
    pub year: i32,

    pub status: Option<CarStatus>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct UpdateLocationRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CarListQuery {
    #[validate(range(min = 1))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    pub status: Option<CarStatus>,
    pub search: Option<String>,
}

impl CarListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Car with its current driver, if any
#[derive(Debug, Clone, Serialize)]
pub struct CarResponse {
    #[serde(flatten)]
    pub car: Car,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_driver: Option<DriverSummary>,
}

/// Compact car snapshot nested in trip and maintenance responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarSummary {
    pub id: i64,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub status: CarStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_loc: Option<DateTime<Utc>>,
}

impl From<&Car> for CarSummary {
    fn from(car: &Car) -> Self {
        Self {
            id: car.id,
            license_plate: car.license_plate.clone(),
            brand: car.brand.clone(),
            model: car.model.clone(),
            status: car.status,
            last_update_loc: car.last_update_loc,
        }
    }
}
