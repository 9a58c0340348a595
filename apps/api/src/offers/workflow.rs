//! Offer creation.
//!
//! Flow: validate → draft header → begin → insert header → insert one
//! assignment per employee → commit. Validation failures never open a
//! unit of work; any failure after `begin` rolls the whole unit back.

use chrono::Utc;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::offer::{NewOffer, Offer, OfferHeader};
use crate::offers::validation::{validate_new_offer, ValidOffer};
use crate::store::{OfferStore, OfferUnitOfWork, StoreError};

/// Validates and persists an offer with its employee assignments as one
/// atomic unit. No retries: the caller decides whether to try again.
pub async fn create_offer(store: &dyn OfferStore, new_offer: &NewOffer) -> Result<Offer, AppError> {
    let valid = validate_new_offer(new_offer)?;
    let header = valid.draft_header(Utc::now());

    let mut uow = store.begin().await?;
    let offer_id = match write_offer(uow.as_mut(), &valid, &header).await {
        Ok(id) => id,
        Err(e) => {
            if let Err(rollback_err) = uow.rollback().await {
                warn!("Rollback after failed offer insert also failed: {rollback_err}");
            }
            return Err(e.into());
        }
    };
    uow.commit().await?;

    info!(
        "Created offer {offer_id} for client {} with {} employee(s)",
        valid.client_id,
        valid.employees.len()
    );

    Ok(header.into_offer(offer_id, valid.employees))
}

async fn write_offer(
    uow: &mut dyn OfferUnitOfWork,
    valid: &ValidOffer,
    header: &OfferHeader,
) -> Result<i64, StoreError> {
    let offer_id = uow.insert_offer_header(header).await?;
    for &employee_id in &valid.employees {
        uow.insert_assignment(offer_id, employee_id).await?;
    }
    Ok(offer_id)
}
