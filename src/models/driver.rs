//! Driver model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ParseStatusError;

/// Driver duty status. ACTIVE exactly while the driver owns an open trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    Active,
    OffDuty,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Active => "ACTIVE",
            DriverStatus::OffDuty => "OFF_DUTY",
        }
    }
}

impl TryFrom<String> for DriverStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "ACTIVE" => Ok(DriverStatus::Active),
            "OFF_DUTY" => Ok(DriverStatus::OffDuty),
            _ => Err(ParseStatusError::new("driver status", value)),
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
    pub license_number: String,
    #[sqlx(try_from = "String")]
    pub status: DriverStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDriver {
    pub name: String,
    pub phone_number: String,
    pub license_number: String,
}

/// Descriptive columns replaced by a driver update
#[derive(Debug, Clone)]
pub struct DriverDetails {
    pub name: String,
    pub phone_number: String,
    pub license_number: String,
}
