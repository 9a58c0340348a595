//! In-memory store used by the test suite.
//!
//! Mirrors the constraints of the Postgres schema that the services rely on:
//! foreign keys between offers, clients and employees, the unique
//! `(offer_id, employee_id)` pair, `NUMERIC(_, 2)` rounding and overflow,
//! the offer check constraints, and unit-of-work isolation.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::client::{Client, ClientInput};
use crate::models::employee::{Employee, EmployeeCost, EmployeeInput};
use crate::models::offer::{Offer, OfferHeader};
use crate::store::{
    ClientStore, CostLookup, EmployeeStore, OfferStore, OfferUnitOfWork, StoreError,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    employees: BTreeMap<i64, Employee>,
    clients: BTreeMap<i64, Client>,
    offers: BTreeMap<i64, OfferHeader>,
    /// (offer_id, employee_id) in insertion order.
    assignments: Vec<(i64, i64)>,
    unavailable: bool,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn offer(&self, id: i64, header: &OfferHeader) -> Offer {
        let employees = self
            .assignments
            .iter()
            .filter(|(offer_id, _)| *offer_id == id)
            .map(|(_, employee_id)| *employee_id)
            .collect();
        header.clone().into_offer(id, employees)
    }
}

/// Writes `value` into a `NUMERIC(p, 2)` column with `integer_digits = p - 2`:
/// rounded half away from zero, overflow rejected as invalid input.
fn numeric_2dp(value: Decimal, integer_digits: u32) -> Result<Decimal, StoreError> {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.abs() >= Decimal::from(10_i64.pow(integer_digits)) {
        return Err(StoreError::Invalid("numeric field overflow".to_string()));
    }
    Ok(rounded)
}

fn stored_employee(mut employee: Employee) -> Result<Employee, StoreError> {
    employee.yearly_salary = numeric_2dp(employee.yearly_salary, 12)?;
    employee.yearly_cost = numeric_2dp(employee.yearly_cost, 12)?;
    if employee.yearly_salary < Decimal::ZERO || employee.yearly_cost < Decimal::ZERO {
        return Err(StoreError::Conflict(
            "employee salary and cost must not be negative".to_string(),
        ));
    }
    Ok(employee)
}

fn stored_header(header: &OfferHeader) -> Result<OfferHeader, StoreError> {
    let mut header = header.clone();
    header.risk_multiplier = numeric_2dp(header.risk_multiplier, 2)?;
    if !(Decimal::ONE..=Decimal::TWO).contains(&header.risk_multiplier) {
        return Err(StoreError::Conflict(
            "offers_risk_multiplier_check".to_string(),
        ));
    }
    if let Some(discount) = header.discount.as_mut() {
        discount.amount = numeric_2dp(discount.amount, 12)?;
        if discount.amount <= Decimal::ZERO {
            return Err(StoreError::Conflict("offers_discount_amount_check".to_string()));
        }
        if discount.explanation.trim().is_empty() {
            return Err(StoreError::Conflict("discount_is_explained".to_string()));
        }
    }
    Ok(header)
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    /// Makes every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    pub fn offer_row_count(&self) -> usize {
        self.lock().offers.len()
    }

    pub fn assignment_row_count(&self) -> usize {
        self.lock().assignments.len()
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn create_employee(&self, input: &EmployeeInput) -> Result<Employee, StoreError> {
        let mut tables = self.lock();
        tables.check_available()?;
        let id = tables.allocate_id();
        let employee = stored_employee(input.clone().into_employee(id))?;
        tables.employees.insert(id, employee.clone());
        Ok(employee)
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        let tables = self.lock();
        tables.check_available()?;
        let mut employees: Vec<_> = tables.employees.values().cloned().collect();
        employees.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(employees)
    }

    async fn get_employee(&self, id: i64) -> Result<Employee, StoreError> {
        let tables = self.lock();
        tables.check_available()?;
        tables.employees.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        let mut tables = self.lock();
        tables.check_available()?;
        let slot = tables
            .employees
            .get_mut(&employee.id)
            .ok_or(StoreError::NotFound)?;
        *slot = stored_employee(employee.clone())?;
        Ok(())
    }

    async fn delete_employee(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.lock();
        tables.check_available()?;
        if tables.assignments.iter().any(|(_, e)| *e == id) {
            return Err(StoreError::Conflict(format!(
                "employee {id} is assigned to an offer"
            )));
        }
        tables
            .employees
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn create_client(&self, input: &ClientInput) -> Result<Client, StoreError> {
        let mut tables = self.lock();
        tables.check_available()?;
        let id = tables.allocate_id();
        let now = Utc::now();
        let client = Client {
            id,
            name: input.name.clone(),
            email: input.email.clone(),
            address: input.address.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.clients.insert(id, client.clone());
        Ok(client)
    }

    async fn list_clients(&self) -> Result<Vec<Client>, StoreError> {
        let tables = self.lock();
        tables.check_available()?;
        let mut clients: Vec<_> = tables.clients.values().cloned().collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(clients)
    }

    async fn get_client(&self, id: i64) -> Result<Client, StoreError> {
        let tables = self.lock();
        tables.check_available()?;
        tables.clients.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_client(&self, id: i64, input: &ClientInput) -> Result<Client, StoreError> {
        let mut tables = self.lock();
        tables.check_available()?;
        let client = tables.clients.get_mut(&id).ok_or(StoreError::NotFound)?;
        client.name = input.name.clone();
        client.email = input.email.clone();
        client.address = input.address.clone();
        client.updated_at = Utc::now();
        Ok(client.clone())
    }

    async fn delete_client(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.lock();
        tables.check_available()?;
        if tables.offers.values().any(|o| o.client_id == id) {
            return Err(StoreError::Conflict(format!("client {id} has offers")));
        }
        tables
            .clients
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl CostLookup for MemoryStore {
    async fn costs_for(&self, employee_ids: &[i64]) -> Result<Vec<EmployeeCost>, StoreError> {
        let tables = self.lock();
        tables.check_available()?;
        Ok(tables
            .employees
            .values()
            .filter(|e| employee_ids.contains(&e.id))
            .map(|e| EmployeeCost {
                employee_id: e.id,
                yearly_salary: e.yearly_salary,
                yearly_cost: e.yearly_cost,
            })
            .collect())
    }
}

#[async_trait]
impl OfferStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn OfferUnitOfWork>, StoreError> {
        self.lock().check_available()?;
        Ok(Box::new(MemoryUnitOfWork {
            tables: Arc::clone(&self.tables),
            headers: Vec::new(),
            assignments: Vec::new(),
        }))
    }

    async fn list_offers(&self) -> Result<Vec<Offer>, StoreError> {
        let tables = self.lock();
        tables.check_available()?;
        let mut offers: Vec<_> = tables
            .offers
            .iter()
            .map(|(id, header)| tables.offer(*id, header))
            .collect();
        offers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(offers)
    }

    async fn get_offer(&self, id: i64) -> Result<Offer, StoreError> {
        let tables = self.lock();
        tables.check_available()?;
        let header = tables.offers.get(&id).ok_or(StoreError::NotFound)?;
        Ok(tables.offer(id, header))
    }
}

/// Buffers writes until `commit`, so a dropped or rolled back unit leaves
/// the tables untouched.
struct MemoryUnitOfWork {
    tables: Arc<Mutex<Tables>>,
    headers: Vec<(i64, OfferHeader)>,
    assignments: Vec<(i64, i64)>,
}

impl MemoryUnitOfWork {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }
}

#[async_trait]
impl OfferUnitOfWork for MemoryUnitOfWork {
    async fn insert_offer_header(&mut self, header: &OfferHeader) -> Result<i64, StoreError> {
        let header = stored_header(header)?;
        let id = {
            let mut tables = self.lock();
            tables.check_available()?;
            if !tables.clients.contains_key(&header.client_id) {
                return Err(StoreError::Conflict(format!(
                    "client {} does not exist",
                    header.client_id
                )));
            }
            tables.allocate_id()
        };
        self.headers.push((id, header));
        Ok(id)
    }

    async fn insert_assignment(
        &mut self,
        offer_id: i64,
        employee_id: i64,
    ) -> Result<(), StoreError> {
        {
            let tables = self.lock();
            tables.check_available()?;
            if !tables.employees.contains_key(&employee_id) {
                return Err(StoreError::Conflict(format!(
                    "employee {employee_id} does not exist"
                )));
            }
        }
        if !self.headers.iter().any(|(id, _)| *id == offer_id) {
            return Err(StoreError::Conflict(format!(
                "offer {offer_id} does not exist"
            )));
        }
        if self.assignments.contains(&(offer_id, employee_id)) {
            return Err(StoreError::Conflict(format!(
                "employee {employee_id} already assigned to offer {offer_id}"
            )));
        }
        self.assignments.push((offer_id, employee_id));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryUnitOfWork {
            tables,
            headers,
            assignments,
        } = *self;
        let mut guard = tables.lock().unwrap();
        guard.check_available()?;
        guard.offers.extend(headers);
        guard.assignments.extend(assignments);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::Role;
    use crate::models::offer::{Discount, TimeFrame, STATUS_DRAFT};

    fn header(client_id: i64) -> OfferHeader {
        let now = Utc::now();
        OfferHeader {
            client_id,
            time_frame: TimeFrame::TwoWeeks,
            requirements_url: "req.md".to_string(),
            risk_multiplier: Decimal::ONE,
            discount: None,
            status: STATUS_DRAFT.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    async fn client(store: &MemoryStore) -> i64 {
        store
            .create_client(&ClientInput {
                name: "Acme".to_string(),
                email: "ops@acme.test".to_string(),
                address: "1 Main St".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_invisible() {
        let store = MemoryStore::new();
        let client_id = client(&store).await;

        let mut uow = store.begin().await.unwrap();
        uow.insert_offer_header(&header(client_id)).await.unwrap();
        assert_eq!(store.offer_row_count(), 0);

        uow.commit().await.unwrap();
        assert_eq!(store.offer_row_count(), 1);
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_discards_writes() {
        let store = MemoryStore::new();
        let client_id = client(&store).await;

        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_offer_header(&header(client_id)).await.unwrap();
        }
        assert_eq!(store.offer_row_count(), 0);
    }

    #[tokio::test]
    async fn test_header_for_unknown_client_is_a_conflict() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let err = uow.insert_offer_header(&header(99)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_numeric_columns_round_like_postgres() {
        let store = MemoryStore::new();
        let client_id = client(&store).await;

        let mut precise = header(client_id);
        precise.risk_multiplier = Decimal::new(1555, 3);
        let mut uow = store.begin().await.unwrap();
        let id = uow.insert_offer_header(&precise).await.unwrap();
        uow.commit().await.unwrap();

        let stored = store.get_offer(id).await.unwrap();
        assert_eq!(stored.risk_multiplier, Decimal::new(156, 2));
    }

    #[tokio::test]
    async fn test_discount_rounding_to_zero_hits_check_constraint() {
        let store = MemoryStore::new();
        let client_id = client(&store).await;

        let mut tiny = header(client_id);
        tiny.discount = Some(Discount {
            amount: Decimal::new(4, 3),
            explanation: "Rounding".to_string(),
        });
        let mut uow = store.begin().await.unwrap();
        let err = uow.insert_offer_header(&tiny).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_salary_overflow_is_invalid_input() {
        let store = MemoryStore::new();
        let err = store
            .create_employee(&EmployeeInput {
                name: "Big Earner".to_string(),
                email: "big@acme.test".to_string(),
                role: Role::Principal,
                yearly_salary: Decimal::from(10_000_000_000_000_i64),
                yearly_cost: Decimal::ZERO,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert!(store.list_employees().await.unwrap().is_empty());
    }
}
