//! Trip log model
//!
//! A trip is open while `end_time` is null. Checkout creates it, checkin
//! closes it once; trips are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TripLog {
    pub id: i64,
    pub car_id: i64,
    pub driver_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub start_km: i64,
    pub end_km: Option<i64>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl TripLog {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewTrip {
    pub car_id: i64,
    pub driver_id: i64,
    pub start_time: DateTime<Utc>,
    pub start_km: i64,
    pub notes: String,
}

/// Values written by checkin
#[derive(Debug, Clone)]
pub struct TripClosing {
    pub end_time: DateTime<Utc>,
    pub end_km: i64,
    pub notes: String,
}

/// Appends checkin notes to the checkout notes on a new line.
pub fn append_notes(existing: &str, new: &str) -> String {
    if new.is_empty() {
        existing.to_string()
    } else if existing.is_empty() {
        new.to_string()
    } else {
        format!("{existing}\n{new}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_notes() {
        assert_eq!(append_notes("full tank", ""), "full tank");
        assert_eq!(append_notes("", "returned"), "returned");
        assert_eq!(append_notes("full tank", "returned"), "full tank\nreturned");
        assert_eq!(append_notes("", ""), "");
    }
}
