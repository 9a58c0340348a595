//! Field-level checks shared by the employee and client records.

use rust_decimal::Decimal;

use crate::errors::ValidationError;

pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Blank(field))
    } else {
        Ok(())
    }
}

/// Loose shape check: `local@domain`, no whitespace.
pub fn require_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let well_formed = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(field))
    }
}

/// Decimal places kept by the `NUMERIC(_, 2)` columns.
pub const MONEY_SCALE: u32 = 2;

/// Exclusive upper bound of a `NUMERIC(14, 2)` column.
pub fn money_limit() -> Decimal {
    Decimal::from(1_000_000_000_000_i64)
}

/// Rejects values the database would silently round.
pub fn require_scale(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value.normalize().scale() > MONEY_SCALE {
        Err(ValidationError::TooPrecise(field))
    } else {
        Ok(())
    }
}

/// A non-negative amount that fits a money column exactly.
pub fn require_money(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    require_non_negative(field, value)?;
    require_scale(field, value)?;
    let limit = money_limit();
    if value >= limit {
        return Err(ValidationError::TooLarge(field, limit));
    }
    Ok(())
}

pub fn require_non_negative(field: &'static str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        Err(ValidationError::Negative(field))
    } else {
        Ok(())
    }
}
