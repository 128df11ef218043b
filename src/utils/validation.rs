//! Validation helpers
//!
//! Custom validators plugged into `#[validate(custom = "...")]`.

use num_traits::Zero;
use serde::Serialize;
use validator::ValidationError;

/// Rejects empty or whitespace-only strings
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Model year: 0 means unknown, anything else must be plausible.
pub fn validate_year(year: &i32) -> Result<(), ValidationError> {
    if *year == 0 || (1900..=2100).contains(year) {
        return Ok(());
    }
    let mut error = ValidationError::new("year");
    error.add_param("value".into(), year);
    error.add_param("range".into(), &"1900 to 2100".to_string());
    Err(error)
}

pub fn validate_non_negative<T: PartialOrd + Zero + Serialize>(
    value: &T,
) -> Result<(), ValidationError> {
    if *value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), value);
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("B 1234 XY").is_ok());
        assert!(validate_not_empty("").is_err());
        assert!(validate_not_empty("   ").is_err());
    }

    #[test]
    fn test_validate_year() {
        assert!(validate_year(&0).is_ok());
        assert!(validate_year(&1900).is_ok());
        assert!(validate_year(&2024).is_ok());
        assert!(validate_year(&1899).is_err());
        assert!(validate_year(&2101).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(&Decimal::new(15050, 2)).is_ok());
        assert!(validate_non_negative(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative(&Decimal::new(-1, 0)).is_err());
        assert!(validate_non_negative(&-3i64).is_err());
    }
}
