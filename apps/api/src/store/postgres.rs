use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::client::{Client, ClientInput};
use crate::models::employee::{Employee, EmployeeCost, EmployeeInput, EmployeeRow};
use crate::models::offer::{Offer, OfferHeader, OfferRow};
use crate::store::{
    ClientStore, CostLookup, EmployeeStore, OfferStore, OfferUnitOfWork, StoreError,
};

const EMPLOYEE_COLUMNS: &str = "id, name, email, role, yearly_salary, yearly_cost";

const OFFER_SELECT: &str = r#"
    SELECT o.id, o.client_id, o.time_frame, o.requirements_url, o.risk_multiplier,
           o.discount_amount, o.discount_explanation,
           COALESCE(
               array_agg(oe.employee_id ORDER BY oe.id) FILTER (WHERE oe.employee_id IS NOT NULL),
               '{}'::BIGINT[]
           ) AS employees,
           o.status, o.created_at, o.updated_at, o.signing_link
    FROM offers o
    LEFT JOIN offer_employees oe ON oe.offer_id = o.id
"#;

/// Postgres adapter for every store port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn employee_from_row(row: EmployeeRow) -> Result<Employee, StoreError> {
    Employee::try_from(row).map_err(StoreError::Corrupt)
}

fn offer_from_row(row: OfferRow) -> Result<Offer, StoreError> {
    Offer::try_from(row).map_err(StoreError::Corrupt)
}

fn expect_affected(rows: u64) -> Result<(), StoreError> {
    if rows == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

#[async_trait]
impl EmployeeStore for PgStore {
    async fn create_employee(&self, input: &EmployeeInput) -> Result<Employee, StoreError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            r#"
            INSERT INTO employees (name, email, role, yearly_salary, yearly_cost)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(input.role.as_str())
        .bind(input.yearly_salary)
        .bind(input.yearly_cost)
        .fetch_one(&self.pool)
        .await?;
        employee_from_row(row)
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY name ASC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(employee_from_row)
        .collect()
    }

    async fn get_employee(&self, id: i64) -> Result<Employee, StoreError> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        employee_from_row(row)
    }

    async fn update_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET name = $1, email = $2, role = $3, yearly_salary = $4, yearly_cost = $5
            WHERE id = $6
            "#,
        )
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(employee.role.as_str())
        .bind(employee.yearly_salary)
        .bind(employee.yearly_cost)
        .bind(employee.id)
        .execute(&self.pool)
        .await?;
        expect_affected(result.rows_affected())
    }

    async fn delete_employee(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected())
    }
}

#[async_trait]
impl ClientStore for PgStore {
    async fn create_client(&self, input: &ClientInput) -> Result<Client, StoreError> {
        let now = Utc::now();
        Ok(sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, email, address, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, name, email, address, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.address)
        .bind(now)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_clients(&self) -> Result<Vec<Client>, StoreError> {
        Ok(sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, email, address, created_at, updated_at
            FROM clients
            ORDER BY name ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_client(&self, id: i64) -> Result<Client, StoreError> {
        sqlx::query_as::<_, Client>(
            "SELECT id, name, email, address, created_at, updated_at FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn update_client(&self, id: i64, input: &ClientInput) -> Result<Client, StoreError> {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $1, email = $2, address = $3, updated_at = $4
            WHERE id = $5
            RETURNING id, name, email, address, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.address)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_client(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_affected(result.rows_affected())
    }
}

#[async_trait]
impl CostLookup for PgStore {
    async fn costs_for(&self, employee_ids: &[i64]) -> Result<Vec<EmployeeCost>, StoreError> {
        Ok(sqlx::query_as::<_, EmployeeCost>(
            r#"
            SELECT id AS employee_id, yearly_salary, yearly_cost
            FROM employees
            WHERE id = ANY($1)
            "#,
        )
        .bind(employee_ids)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[async_trait]
impl OfferStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn OfferUnitOfWork>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn list_offers(&self) -> Result<Vec<Offer>, StoreError> {
        sqlx::query_as::<_, OfferRow>(&format!(
            "{OFFER_SELECT} GROUP BY o.id ORDER BY o.created_at DESC, o.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(offer_from_row)
        .collect()
    }

    async fn get_offer(&self, id: i64) -> Result<Offer, StoreError> {
        let row = sqlx::query_as::<_, OfferRow>(&format!(
            "{OFFER_SELECT} WHERE o.id = $1 GROUP BY o.id"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        offer_from_row(row)
    }
}

/// One Postgres transaction. sqlx rolls the transaction back if it is
/// dropped before `commit`.
struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OfferUnitOfWork for PgUnitOfWork {
    async fn insert_offer_header(&mut self, header: &OfferHeader) -> Result<i64, StoreError> {
        let (discount_amount, discount_explanation) = match &header.discount {
            Some(discount) => (Some(discount.amount), Some(discount.explanation.as_str())),
            None => (None, None),
        };

        Ok(sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO offers
                (client_id, time_frame, requirements_url, risk_multiplier,
                 discount_amount, discount_explanation, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(header.client_id)
        .bind(header.time_frame.units())
        .bind(&header.requirements_url)
        .bind(header.risk_multiplier)
        .bind(discount_amount)
        .bind(discount_explanation)
        .bind(&header.status)
        .bind(header.created_at)
        .bind(header.updated_at)
        .fetch_one(&mut *self.tx)
        .await?)
    }

    async fn insert_assignment(
        &mut self,
        offer_id: i64,
        employee_id: i64,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO offer_employees (offer_id, employee_id) VALUES ($1, $2)")
            .bind(offer_id)
            .bind(employee_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
