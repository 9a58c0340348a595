use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::errors::ValidationError;
use crate::fields::{require_money, require_scale};
use crate::models::offer::{Discount, NewOffer, OfferHeader, TimeFrame, STATUS_DRAFT};

pub const MIN_RISK_MULTIPLIER: Decimal = Decimal::ONE;
pub const MAX_RISK_MULTIPLIER: Decimal = Decimal::TWO;

/// A `NewOffer` whose invariants have been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidOffer {
    pub client_id: i64,
    pub time_frame: TimeFrame,
    pub requirements_url: String,
    pub risk_multiplier: Decimal,
    pub discount: Option<Discount>,
    pub employees: Vec<i64>,
}

impl ValidOffer {
    /// Header row for a freshly created offer: status `draft`, both
    /// timestamps set to `now`.
    pub fn draft_header(&self, now: DateTime<Utc>) -> OfferHeader {
        OfferHeader {
            client_id: self.client_id,
            time_frame: self.time_frame,
            requirements_url: self.requirements_url.clone(),
            risk_multiplier: self.risk_multiplier,
            discount: self.discount.clone(),
            status: STATUS_DRAFT.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Checks, in order: time frame, risk multiplier, discount, employee
/// list, requirements reference. Returns the first violation.
pub fn validate_new_offer(offer: &NewOffer) -> Result<ValidOffer, ValidationError> {
    let time_frame = TimeFrame::try_from(offer.time_frame)
        .map_err(|_| ValidationError::InvalidTimeFrame(offer.time_frame))?;

    validate_risk_multiplier(offer.risk_multiplier)?;

    if let Some(discount) = &offer.discount {
        validate_discount(discount)?;
    }

    let mut seen = HashSet::with_capacity(offer.employees.len());
    if let Some(duplicate) = offer.employees.iter().find(|id| !seen.insert(**id)) {
        return Err(ValidationError::DuplicateEmployee(*duplicate));
    }

    if offer.requirements_url.trim().is_empty() {
        return Err(ValidationError::Blank("requirements_url"));
    }

    Ok(ValidOffer {
        client_id: offer.client_id,
        time_frame,
        requirements_url: offer.requirements_url.clone(),
        risk_multiplier: offer.risk_multiplier,
        discount: offer.discount.clone(),
        employees: offer.employees.clone(),
    })
}

/// Range check plus scale: the column keeps two decimal places, so a
/// finer multiplier would be priced differently once stored.
pub fn validate_risk_multiplier(risk: Decimal) -> Result<(), ValidationError> {
    if !(MIN_RISK_MULTIPLIER..=MAX_RISK_MULTIPLIER).contains(&risk) {
        return Err(ValidationError::RiskMultiplierOutOfRange(risk));
    }
    require_scale("risk_multiplier", risk)
}

pub fn validate_discount(discount: &Discount) -> Result<(), ValidationError> {
    if discount.amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveDiscount(discount.amount));
    }
    require_money("discount_amount", discount.amount)?;
    if discount.explanation.trim().is_empty() {
        return Err(ValidationError::MissingDiscountExplanation);
    }
    Ok(())
}
