//! Small validation helpers used by configs and reports.

use crate::errors::ValidationError;

/// Ensures a string field is non-empty after trimming.
pub fn non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

/// Ensures a float field lies within `[0, 1]`. NaN is rejected.
pub fn ensure_unit_range(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_nan() || !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::new(
            field,
            format!("must be within [0, 1], got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_rejects_whitespace() {
        assert!(non_empty("query", "   ").is_err());
        assert!(non_empty("query", "find programs").is_ok());
    }

    #[test]
    fn test_unit_range_bounds() {
        assert!(ensure_unit_range("confidence", 0.0).is_ok());
        assert!(ensure_unit_range("confidence", 1.0).is_ok());
        assert!(ensure_unit_range("confidence", -0.01).is_err());
        assert!(ensure_unit_range("confidence", 1.01).is_err());
        assert!(ensure_unit_range("confidence", f64::NAN).is_err());
    }
}
