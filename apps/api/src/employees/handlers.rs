use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::employees;
use crate::errors::AppError;
use crate::models::employee::{Employee, EmployeeInput};
use crate::state::AppState;

/// GET /api/v1/employees
pub async fn handle_list_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<Employee>>, AppError> {
    Ok(Json(state.employees.list_employees().await?))
}

/// POST /api/v1/employees
pub async fn handle_create_employee(
    State(state): State<AppState>,
    Json(input): Json<EmployeeInput>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    let employee = employees::create_employee(state.employees.as_ref(), &input).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

/// GET /api/v1/employees/:id
pub async fn handle_get_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Employee>, AppError> {
    Ok(Json(
        employees::get_employee(state.employees.as_ref(), id).await?,
    ))
}

/// PUT /api/v1/employees/:id
pub async fn handle_update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<EmployeeInput>,
) -> Result<Json<Employee>, AppError> {
    Ok(Json(
        employees::update_employee(state.employees.as_ref(), id, input).await?,
    ))
}

/// DELETE /api/v1/employees/:id
pub async fn handle_delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    employees::delete_employee(state.employees.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
