use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status every offer starts in.
pub const STATUS_DRAFT: &str = "draft";

/// Project length class. Only two lengths are sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum TimeFrame {
    TwoWeeks,
    SixWeeks,
}

impl TimeFrame {
    /// Number of units the class stands for; this is the pricing multiplier.
    pub fn units(self) -> i32 {
        match self {
            TimeFrame::TwoWeeks => 2,
            TimeFrame::SixWeeks => 6,
        }
    }
}

impl TryFrom<i32> for TimeFrame {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(TimeFrame::TwoWeeks),
            6 => Ok(TimeFrame::SixWeeks),
            other => Err(format!("time frame must be 2 or 6, got {other}")),
        }
    }
}

impl From<TimeFrame> for i32 {
    fn from(value: TimeFrame) -> Self {
        value.units()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Discount {
    pub amount: Decimal,
    /// Why the discount was granted. Required.
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    pub id: i64,
    pub client_id: i64,
    pub time_frame: TimeFrame,
    pub requirements_url: String,
    pub risk_multiplier: Decimal,
    pub discount: Option<Discount>,
    pub employees: Vec<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_link: Option<String>,
}

/// Unvalidated offer as submitted by a caller.
///
/// `time_frame` stays a raw integer so out-of-range values are reported by
/// offer validation instead of failing the decoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOffer {
    pub client_id: i64,
    pub time_frame: i32,
    pub requirements_url: String,
    pub risk_multiplier: Decimal,
    #[serde(default)]
    pub discount: Option<Discount>,
    #[serde(default)]
    pub employees: Vec<i64>,
}

/// Header columns written by the creation workflow, after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferHeader {
    pub client_id: i64,
    pub time_frame: TimeFrame,
    pub requirements_url: String,
    pub risk_multiplier: Decimal,
    pub discount: Option<Discount>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OfferHeader {
    pub fn into_offer(self, id: i64, employees: Vec<i64>) -> Offer {
        Offer {
            id,
            client_id: self.client_id,
            time_frame: self.time_frame,
            requirements_url: self.requirements_url,
            risk_multiplier: self.risk_multiplier,
            discount: self.discount,
            employees,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            signing_link: None,
        }
    }
}

/// Flat row shape of `offers` joined with its aggregated assignments.
#[derive(Debug, Clone, FromRow)]
pub struct OfferRow {
    pub id: i64,
    pub client_id: i64,
    pub time_frame: i32,
    pub requirements_url: String,
    pub risk_multiplier: Decimal,
    pub discount_amount: Option<Decimal>,
    pub discount_explanation: Option<String>,
    pub employees: Vec<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub signing_link: Option<String>,
}

impl TryFrom<OfferRow> for Offer {
    type Error = String;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        let discount = match (row.discount_amount, row.discount_explanation) {
            (Some(amount), Some(explanation)) => Some(Discount {
                amount,
                explanation,
            }),
            (None, None) => None,
            _ => return Err(format!("offer {} has a partial discount", row.id)),
        };
        Ok(Offer {
            id: row.id,
            client_id: row.client_id,
            time_frame: TimeFrame::try_from(row.time_frame)?,
            requirements_url: row.requirements_url,
            risk_multiplier: row.risk_multiplier,
            discount,
            employees: row.employees,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            signing_link: row.signing_link,
        })
    }
}
