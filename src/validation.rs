// src/validation.rs
use crate::error::ValidationError;
use crate::models::NewEntry;
use crate::stats::parse_amount;

pub fn validate_food_name(food_name: &str) -> Result<String, ValidationError> {
    let trimmed = food_name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyFoodName);
    }
    Ok(trimmed.to_string())
}

pub fn validate_amount(amount: f64) -> Result<f64, ValidationError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    Ok(amount)
}

/// Checks a payload before it is handed to the store, trimming the food name on the way.
pub fn validate_new_entry(mut entry: NewEntry) -> Result<NewEntry, ValidationError> {
    entry.food_name = validate_food_name(&entry.food_name)?;
    validate_amount(parse_amount(&entry.amount)?)?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AmountError;
    use serde_json::Value;

    #[test]
    fn test_valid_entry_is_trimmed() {
        let entry = validate_new_entry(NewEntry::new("2024-03-01", "  Pizza ", 120.0)).unwrap();
        assert_eq!(entry.food_name, "Pizza");
    }

    #[test]
    fn test_rejects_blank_food_name() {
        assert_eq!(
            validate_new_entry(NewEntry::new("2024-03-01", "   ", 120.0)),
            Err(ValidationError::EmptyFoodName)
        );
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        assert_eq!(validate_amount(0.0), Err(ValidationError::NonPositiveAmount(0.0)));
        assert_eq!(validate_amount(-3.0), Err(ValidationError::NonPositiveAmount(-3.0)));
        assert!(validate_amount(f64::INFINITY).is_err());
        assert_eq!(validate_amount(0.5), Ok(0.5));
    }

    #[test]
    fn test_rejects_unparseable_amount() {
        let mut entry = NewEntry::new("2024-03-01", "Tea", 1.0);
        entry.amount = Value::Null;
        assert_eq!(
            validate_new_entry(entry),
            Err(ValidationError::InvalidAmount(AmountError::Missing))
        );
    }
}
