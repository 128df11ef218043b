//! Car model
//!
//! Maps the `cars` table. `status` and `current_driver_id` are only written
//! through the status service; every other column belongs to car CRUD.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ParseStatusError;

/// Car availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarStatus {
    Available,
    InUse,
    Maintenance,
}

impl CarStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CarStatus::Available => "AVAILABLE",
            CarStatus::InUse => "IN_USE",
            CarStatus::Maintenance => "MAINTENANCE",
        }
    }
}

impl TryFrom<String> for CarStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "AVAILABLE" => Ok(CarStatus::Available),
            "IN_USE" => Ok(CarStatus::InUse),
            "MAINTENANCE" => Ok(CarStatus::Maintenance),
            _ => Err(ParseStatusError::new("car status", value)),
        }
    }
}

impl fmt::Display for CarStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Car {
    pub id: i64,
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    #[sqlx(try_from = "String")]
    pub status: CarStatus,
    pub current_driver_id: Option<i64>,
    pub last_lat: Option<f64>,
    pub last_lng: Option<f64>,
    pub last_update_loc: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new car
#[derive(Debug, Clone)]
pub struct NewCar {
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub status: CarStatus,
}

/// Descriptive columns replaced by a car update
#[derive(Debug, Clone)]
pub struct CarDetails {
    pub license_plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
}
