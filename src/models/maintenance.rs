//! Maintenance record model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Maintenance {
    pub id: i64,
    pub car_id: i64,
    pub service_date: DateTime<Utc>,
    pub description: String,
    pub cost: Decimal,
    pub workshop_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMaintenance {
    pub car_id: i64,
    pub service_date: DateTime<Utc>,
    pub description: String,
    pub cost: Decimal,
    pub workshop_name: String,
}

/// Columns replaced by a maintenance update; the car never changes.
#[derive(Debug, Clone)]
pub struct MaintenanceDetails {
    pub service_date: DateTime<Utc>,
    pub description: String,
    pub cost: Decimal,
    pub workshop_name: String,
}
