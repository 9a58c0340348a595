//! Offer pricing.
//!
//! price = risk_multiplier × Σ ((salary + yearly_cost) / 24 × time_frame_units) − discount
//!
//! The price is never clamped: a discount larger than the risk-adjusted
//! cost produces a negative price, so adding a discount of `A` always lowers
//! the price by exactly `A`.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::employee::EmployeeCost;
use crate::models::offer::{Discount, Offer, TimeFrame};
use crate::store::CostLookup;

/// Pricing periods per year; one period is half a month.
const PERIODS_PER_YEAR: i64 = 24;

/// The inputs of a price calculation, borrowed from an offer or a draft.
#[derive(Debug, Clone, Copy)]
pub struct PricingTerms<'a> {
    pub employees: &'a [i64],
    pub time_frame: TimeFrame,
    pub risk_multiplier: Decimal,
    pub discount: Option<&'a Discount>,
}

impl<'a> From<&'a Offer> for PricingTerms<'a> {
    fn from(offer: &'a Offer) -> Self {
        Self {
            employees: &offer.employees,
            time_frame: offer.time_frame,
            risk_multiplier: offer.risk_multiplier,
            discount: offer.discount.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    /// Σ of per-employee project costs before risk.
    pub staffing_cost: Decimal,
    pub risk_adjusted_cost: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Cost of one employee for the length of the project.
pub fn project_cost(cost: &EmployeeCost, time_frame: TimeFrame) -> Decimal {
    (cost.yearly_salary + cost.yearly_cost) / Decimal::from(PERIODS_PER_YEAR)
        * Decimal::from(time_frame.units())
}

pub fn price_from_costs(
    costs: &[EmployeeCost],
    time_frame: TimeFrame,
    risk_multiplier: Decimal,
    discount: Option<&Discount>,
) -> PriceQuote {
    let staffing_cost: Decimal = costs.iter().map(|c| project_cost(c, time_frame)).sum();
    let risk_adjusted_cost = staffing_cost * risk_multiplier;
    let discount = discount.map(|d| d.amount).unwrap_or(Decimal::ZERO);

    PriceQuote {
        staffing_cost,
        risk_adjusted_cost,
        discount,
        total: risk_adjusted_cost - discount,
    }
}

/// Looks up every assigned employee's costs and prices the offer.
///
/// Fails with `NotFound` if an assigned employee has no cost row, or with
/// the store's error if the lookup itself fails.
pub async fn calculate_offer_price(
    lookup: &dyn CostLookup,
    terms: PricingTerms<'_>,
) -> Result<PriceQuote, AppError> {
    let found: HashMap<i64, EmployeeCost> = lookup
        .costs_for(terms.employees)
        .await?
        .into_iter()
        .map(|cost| (cost.employee_id, cost))
        .collect();

    let costs = terms
        .employees
        .iter()
        .map(|id| {
            found
                .get(id)
                .copied()
                .ok_or_else(|| AppError::NotFound(format!("Employee {id} not found")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(price_from_costs(
        &costs,
        terms.time_frame,
        terms.risk_multiplier,
        terms.discount,
    ))
}
