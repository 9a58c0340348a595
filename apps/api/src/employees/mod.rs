pub mod handlers;

use tracing::info;

use crate::errors::{AppError, ValidationError};
use crate::fields::{require_email, require_money, require_text};
use crate::models::employee::{Employee, EmployeeInput};
use crate::store::EmployeeStore;

/// Role validity is enforced by `Role` at decode time; this covers the rest.
pub fn validate_employee(input: &EmployeeInput) -> Result<(), ValidationError> {
    require_text("name", &input.name)?;
    require_email("email", &input.email)?;
    require_money("yearly_salary", input.yearly_salary)?;
    require_money("yearly_cost", input.yearly_cost)?;
    Ok(())
}

pub async fn create_employee(
    store: &dyn EmployeeStore,
    input: &EmployeeInput,
) -> Result<Employee, AppError> {
    validate_employee(input)?;
    let employee = store.create_employee(input).await?;
    info!("Created employee {} ({})", employee.id, employee.role);
    Ok(employee)
}

pub async fn get_employee(store: &dyn EmployeeStore, id: i64) -> Result<Employee, AppError> {
    store
        .get_employee(id)
        .await
        .map_err(|e| AppError::from_store(e, || format!("Employee {id}")))
}

pub async fn update_employee(
    store: &dyn EmployeeStore,
    id: i64,
    input: EmployeeInput,
) -> Result<Employee, AppError> {
    validate_employee(&input)?;
    let employee = input.into_employee(id);
    store
        .update_employee(&employee)
        .await
        .map_err(|e| AppError::from_store(e, || format!("Employee {id}")))?;
    info!("Updated employee {id}");
    Ok(employee)
}

pub async fn delete_employee(store: &dyn EmployeeStore, id: i64) -> Result<(), AppError> {
    store
        .delete_employee(id)
        .await
        .map_err(|e| AppError::from_store(e, || format!("Employee {id}")))?;
    info!("Deleted employee {id}");
    Ok(())
}
