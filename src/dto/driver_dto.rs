use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::pagination::PageRequest;
use crate::models::driver::{Driver, DriverStatus};
use crate::utils::validation::validate_not_empty;

/// Body for driver create and update
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct DriverRequest {
    #[validate(length(max = 100), custom = "validate_not_empty")]
    pub name: String,

    #[validate(length(max = 20))]
    #[serde(default)]
    pub phone_number: String,

    #[validate(length(max = 50))]
    #[serde(default)]
    pub license_number: String,

    pub status: Option<DriverStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DriverListQuery {
    #[validate(range(min = 1))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    pub status: Option<DriverStatus>,
    pub search: Option<String>,
}

impl DriverListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Compact driver snapshot nested in car and trip responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSummary {
    pub id: i64,
    pub name: String,
    pub status: DriverStatus,
}

impl From<&Driver> for DriverSummary {
    fn from(driver: &Driver) -> Self {
        Self {
            id: driver.id,
            name: driver.name.clone(),
            status: driver.status,
        }
    }
}
