//! Validation utilities for the Cupping Journal
//!
//! Every rejection names the offending field so the form layer can point at it.

use rust_decimal::Decimal;

use crate::error::{ScoringError, ScoringResult};

/// Lowest value on the SCA slider
pub const SLIDER_MIN: Decimal = Decimal::from_parts(6, 0, 0, false, 0);
/// Highest value on the SCA slider
pub const SLIDER_MAX: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

// ============================================================================
// Score Validations
// ============================================================================

/// Accept a slider score unchanged if it lies in [6, 10] on a 0.25 grid
pub fn clamp_slider_score(field: &str, value: Decimal) -> ScoringResult<Decimal> {
    if value < SLIDER_MIN || value > SLIDER_MAX {
        return Err(ScoringError::validation(
            field,
            format!("{} must be between 6 and 10, got {}", field, value),
        ));
    }
    if !(value * Decimal::from(4)).fract().is_zero() {
        return Err(ScoringError::validation(
            field,
            format!("{} must be a multiple of 0.25, got {}", field, value),
        ));
    }
    Ok(value)
}

// ============================================================================
// Name Validations
// ============================================================================

/// Comparison form of a coffee name: trimmed and case-folded
pub fn normalize_coffee_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Reject blank coffee names
pub fn validate_coffee_name(name: &str) -> ScoringResult<()> {
    if name.trim().is_empty() {
        return Err(ScoringError::validation(
            "coffee_name",
            "Coffee name is required",
        ));
    }
    Ok(())
}

/// Reject a coffee name already used by another record of the same owner
pub fn ensure_unique_coffee_name<'a, I>(name: &str, existing: I) -> ScoringResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted = normalize_coffee_name(name);
    if existing
        .into_iter()
        .any(|other| normalize_coffee_name(other) == wanted)
    {
        return Err(ScoringError::DuplicateName(name.trim().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_slider_bounds_inclusive() {
        assert_eq!(clamp_slider_score("flavor", dec("6")).unwrap(), dec("6"));
        assert_eq!(clamp_slider_score("flavor", dec("10")).unwrap(), dec("10"));
        assert_eq!(clamp_slider_score("flavor", dec("8.75")).unwrap(), dec("8.75"));
    }

    #[test]
    fn test_slider_out_of_range() {
        let err = clamp_slider_score("acidity", dec("5.75")).unwrap_err();
        assert_eq!(err.field(), Some("acidity"));
        assert!(clamp_slider_score("acidity", dec("10.25")).is_err());
        assert!(clamp_slider_score("acidity", dec("-8")).is_err());
    }

    #[test]
    fn test_slider_off_grid() {
        let err = clamp_slider_score("body", dec("8.1")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("body"));
        assert!(clamp_slider_score("body", dec("7.125")).is_err());
    }

    #[test]
    fn test_blank_coffee_name() {
        assert!(validate_coffee_name("Ethiopia Guji").is_ok());
        assert!(validate_coffee_name("").is_err());
        assert_eq!(
            validate_coffee_name("   ").unwrap_err().field(),
            Some("coffee_name")
        );
    }

    #[test]
    fn test_duplicate_name_is_case_insensitive() {
        let existing = ["Ethiopia Guji", "Kenya AA"];
        let err = ensure_unique_coffee_name("kenya aa", existing).unwrap_err();
        assert!(matches!(err, ScoringError::DuplicateName(ref n) if n == "kenya aa"));
        assert!(ensure_unique_coffee_name("  ETHIOPIA GUJI ", existing).is_err());
        assert!(ensure_unique_coffee_name("Colombia Huila", existing).is_ok());
    }

    #[test]
    fn test_unique_name_against_empty_scope() {
        assert!(ensure_unique_coffee_name("Anything", std::iter::empty()).is_ok());
    }
}
