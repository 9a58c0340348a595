//! Persistence ports.
//!
//! Services talk to storage only through these traits. `PgStore` is the
//! production adapter; `memory::MemoryStore` backs the test suite.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::client::{Client, ClientInput};
use crate::models::employee::{Employee, EmployeeCost, EmployeeInput};
use crate::models::offer::{Offer, OfferHeader};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// A uniqueness, foreign-key or check constraint rejected the write.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The database rejected a value it cannot represent (SQLSTATE class 22),
    /// e.g. a numeric overflow.
    #[error("invalid value: {0}")]
    Invalid(String),

    /// The store could not be reached or the connection broke mid-request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be mapped back to a domain record.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db)
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation() =>
            {
                StoreError::Conflict(db.message().to_string())
            }
            sqlx::Error::Database(db) if is_data_exception(db.code().as_deref()) => {
                StoreError::Invalid(db.message().to_string())
            }
            decode @ (sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::TypeNotFound { .. }
            | sqlx::Error::Decode(_)) => StoreError::Corrupt(decode.to_string()),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

fn is_data_exception(sqlstate: Option<&str>) -> bool {
    sqlstate.is_some_and(|code| code.starts_with("22"))
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn create_employee(&self, input: &EmployeeInput) -> Result<Employee, StoreError>;
    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;
    async fn get_employee(&self, id: i64) -> Result<Employee, StoreError>;
    async fn update_employee(&self, employee: &Employee) -> Result<(), StoreError>;
    async fn delete_employee(&self, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn create_client(&self, input: &ClientInput) -> Result<Client, StoreError>;
    /// Clients ordered by name.
    async fn list_clients(&self) -> Result<Vec<Client>, StoreError>;
    async fn get_client(&self, id: i64) -> Result<Client, StoreError>;
    /// Replaces the editable fields and refreshes `updated_at`.
    async fn update_client(&self, id: i64, input: &ClientInput) -> Result<Client, StoreError>;
    async fn delete_client(&self, id: i64) -> Result<(), StoreError>;
}

/// Salary and yearly cost lookup used by offer pricing.
#[async_trait]
pub trait CostLookup: Send + Sync {
    /// One entry per known employee id; unknown ids are omitted.
    async fn costs_for(&self, employee_ids: &[i64]) -> Result<Vec<EmployeeCost>, StoreError>;
}

#[async_trait]
pub trait OfferStore: Send + Sync {
    /// Opens a unit of work. Nothing written through it is visible to other
    /// readers until `commit` returns.
    async fn begin(&self) -> Result<Box<dyn OfferUnitOfWork>, StoreError>;
    /// Offers, newest first.
    async fn list_offers(&self) -> Result<Vec<Offer>, StoreError>;
    async fn get_offer(&self, id: i64) -> Result<Offer, StoreError>;
}

/// An open offer transaction. Dropping it without `commit` discards every
/// write made through it.
#[async_trait]
pub trait OfferUnitOfWork: Send {
    /// Writes the header row and returns its generated id.
    async fn insert_offer_header(&mut self, header: &OfferHeader) -> Result<i64, StoreError>;
    async fn insert_assignment(&mut self, offer_id: i64, employee_id: i64)
        -> Result<(), StoreError>;
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
