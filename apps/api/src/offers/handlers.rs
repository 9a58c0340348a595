//! Axum route handlers for the Offers API.

use std::str::FromStr;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::documents::requirements_key;
use crate::errors::AppError;
use crate::models::offer::{Discount, NewOffer, Offer};
use crate::offers::pricing::{calculate_offer_price, PriceQuote, PricingTerms};
use crate::offers::validation::validate_new_offer;
use crate::offers::workflow::create_offer;
use crate::state::AppState;

const DEFAULT_CONTENT_TYPE: &str = "text/markdown";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct OfferPriceResponse {
    pub offer_id: i64,
    #[serde(flatten)]
    pub quote: PriceQuote,
}

struct UploadedDocument {
    file_name: Option<String>,
    content_type: String,
    bytes: Bytes,
}

/// Fields of the multipart offer form. `timeframe` and `risk_factor` are
/// accepted as aliases of `time_frame` and `risk_multiplier`.
#[derive(Default)]
struct OfferForm {
    client_id: Option<i64>,
    time_frame: Option<i32>,
    risk_multiplier: Option<Decimal>,
    discount_amount: Option<Decimal>,
    discount_explanation: Option<String>,
    employees: Vec<i64>,
    requirements: Option<UploadedDocument>,
}

impl OfferForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "requirements" {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.requirements = Some(UploadedDocument {
                    file_name,
                    content_type,
                    bytes,
                });
                continue;
            }

            let value = field.text().await.map_err(multipart_error)?;
            match name.as_str() {
                "client_id" => form.client_id = Some(parse_field(&name, &value)?),
                "time_frame" | "timeframe" => {
                    form.time_frame = Some(parse_field(&name, &value)?)
                }
                "risk_multiplier" | "risk_factor" => {
                    form.risk_multiplier = Some(parse_field(&name, &value)?)
                }
                "discount_amount" if !value.trim().is_empty() => {
                    form.discount_amount = Some(parse_field(&name, &value)?)
                }
                "discount_explanation" => form.discount_explanation = Some(value),
                "employee_id" => form.employees.push(parse_field(&name, &value)?),
                _ => {}
            }
        }

        Ok(form)
    }

    /// A zero or absent discount amount means no discount.
    fn discount(&self) -> Result<Option<Discount>, AppError> {
        match self.discount_amount {
            None => Ok(None),
            Some(amount) if amount.is_zero() => Ok(None),
            Some(amount) if amount < Decimal::ZERO => Err(AppError::Validation(format!(
                "discount_amount must not be negative, got {amount}"
            ))),
            Some(amount) => Ok(Some(Discount {
                amount,
                explanation: self.discount_explanation.clone().unwrap_or_default(),
            })),
        }
    }

    fn into_new_offer(self, requirements_url: String) -> Result<NewOffer, AppError> {
        let discount = self.discount()?;
        Ok(NewOffer {
            client_id: self.client_id.ok_or_else(|| missing("client_id"))?,
            time_frame: self.time_frame.ok_or_else(|| missing("time_frame"))?,
            requirements_url,
            risk_multiplier: self
                .risk_multiplier
                .ok_or_else(|| missing("risk_multiplier"))?,
            discount,
            employees: self.employees,
        })
    }
}

fn missing(field: &str) -> AppError {
    AppError::Validation(format!("{field} is required"))
}

fn parse_field<T: FromStr>(name: &str, value: &str) -> Result<T, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("{name} has an invalid value: '{value}'")))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(err.body_text())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/offers
pub async fn handle_list_offers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Offer>>, AppError> {
    Ok(Json(state.offers.list_offers().await?))
}

/// GET /api/v1/offers/:id
pub async fn handle_get_offer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Offer>, AppError> {
    let offer = state
        .offers
        .get_offer(id)
        .await
        .map_err(|e| AppError::from_store(e, || format!("Offer {id}")))?;
    Ok(Json(offer))
}

/// POST /api/v1/offers
///
/// Multipart form: offer fields plus the `requirements` file. The form is
/// validated before the document is uploaded; the document is removed again
/// if the offer cannot be written.
pub async fn handle_create_offer(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Offer>), AppError> {
    let mut form = OfferForm::read(multipart).await?;

    let document = form
        .requirements
        .take()
        .filter(|doc| !doc.bytes.is_empty())
        .ok_or_else(|| AppError::Validation("Missing requirements file".to_string()))?;

    let key = requirements_key(document.file_name.as_deref());
    let new_offer = form.into_new_offer(key.clone())?;
    validate_new_offer(&new_offer)?;

    state
        .requirements
        .put(&key, document.bytes, &document.content_type)
        .await?;

    match create_offer(state.offers.as_ref(), &new_offer).await {
        Ok(offer) => Ok((StatusCode::CREATED, Json(offer))),
        Err(e) => {
            if let Err(cleanup_err) = state.requirements.delete(&key).await {
                warn!("Failed to remove orphaned requirements document {key}: {cleanup_err}");
            }
            Err(e)
        }
    }
}

/// GET /api/v1/offers/:id/price
pub async fn handle_price_offer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OfferPriceResponse>, AppError> {
    let offer = state
        .offers
        .get_offer(id)
        .await
        .map_err(|e| AppError::from_store(e, || format!("Offer {id}")))?;

    let quote = calculate_offer_price(state.costs.as_ref(), PricingTerms::from(&offer)).await?;

    Ok(Json(OfferPriceResponse {
        offer_id: offer.id,
        quote,
    }))
}
