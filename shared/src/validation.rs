//! Validation utilities for evaluation and loan data
//!
//! Form payloads arrive loosely typed (numbers or numeric strings). The
//! helpers here turn a single field into a typed value or a field-level
//! [`ValidationError`].

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

/// A single field failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Re-attribute an error raised by a shared parser to a form field.
    pub fn for_field(mut self, field: &str) -> Self {
        self.field = field.to_string();
        self
    }
}

// ============================================================================
// Field parsing
// ============================================================================

/// Parse a required numeric field.
///
/// Accepts JSON numbers and numeric strings (plain or scientific notation).
/// Blank strings and `null` count as missing.
pub fn required_decimal(field: &str, value: Option<&Value>) -> Result<Decimal, ValidationError> {
    let raw = match value {
        None | Some(Value::Null) => return Err(ValidationError::new(field, "is required")),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(ValidationError::new(field, "is required"))
        }
        Some(Value::String(s)) => s.trim().to_string(),
        Some(_) => return Err(ValidationError::new(field, "must be a number")),
    };

    parse_decimal(&raw).ok_or_else(|| ValidationError::new(field, "must be a number"))
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Parse a required free-text field, trimming surrounding whitespace.
pub fn required_text(field: &str, value: Option<&Value>) -> Result<String, ValidationError> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            Err(ValidationError::new(field, "is required"))
        }
        Some(_) => Err(ValidationError::new(field, "must be text")),
    }
}

/// Parse a required field into any type with a string parser.
pub fn required_choice<T>(field: &str, value: Option<&Value>) -> Result<T, ValidationError>
where
    T: FromStr<Err = ValidationError>,
{
    let text = required_text(field, value)?;
    text.parse::<T>().map_err(|e| e.for_field(field))
}

// ============================================================================
// Range checks
// ============================================================================

/// Value must be strictly greater than zero
pub fn ensure_positive(field: &str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::new(field, "must be greater than 0"));
    }
    Ok(value)
}

/// Value must be zero or greater
pub fn ensure_non_negative(field: &str, value: Decimal) -> Result<Decimal, ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::new(field, "cannot be negative"));
    }
    Ok(value)
}

/// Value must lie within `[min, max]`
pub fn ensure_within(
    field: &str,
    value: Decimal,
    min: Decimal,
    max: Decimal,
) -> Result<Decimal, ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::new(
            field,
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(value)
}

/// Largest farm size the store can hold (`NUMERIC(12, 2)`)
pub const MAX_FARM_SIZE_ACRES: Decimal = Decimal::from_parts(999_999_999, 0, 0, false, 2);

/// Largest loan amount the store can hold (`NUMERIC(14, 2)`)
pub const MAX_LOAN_AMOUNT: Decimal = Decimal::from_parts(
    99_999_999_999u64 as u32,
    (99_999_999_999u64 >> 32) as u32,
    0,
    false,
    2,
);

/// Value must not exceed `max`
pub fn ensure_at_most(field: &str, value: Decimal, max: Decimal) -> Result<Decimal, ValidationError> {
    if value > max {
        return Err(ValidationError::new(field, format!("cannot exceed {}", max)));
    }
    Ok(value)
}

/// Validate an evaluated farm size: positive and storable
pub fn validate_farm_size(field: &str, acres: Decimal) -> Result<Decimal, ValidationError> {
    ensure_positive(field, acres).and_then(|v| ensure_at_most(field, v, MAX_FARM_SIZE_ACRES))
}

/// Validate soil pH is on the pH scale
pub fn validate_soil_ph(field: &str, ph: Decimal) -> Result<Decimal, ValidationError> {
    ensure_within(field, ph, Decimal::ZERO, Decimal::from(14))
}

/// Validate a loan amount
pub fn validate_loan_amount(amount: Decimal) -> Result<Decimal, ValidationError> {
    ensure_positive("loan_amount", amount)
        .and_then(|v| ensure_at_most("loan_amount", v, MAX_LOAN_AMOUNT))
}
