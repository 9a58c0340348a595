use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::clients;
use crate::errors::AppError;
use crate::models::client::{Client, ClientInput};
use crate::state::AppState;

/// GET /api/v1/clients
pub async fn handle_list_clients(
    State(state): State<AppState>,
) -> Result<Json<Vec<Client>>, AppError> {
    Ok(Json(state.clients.list_clients().await?))
}

/// POST /api/v1/clients
pub async fn handle_create_client(
    State(state): State<AppState>,
    Json(input): Json<ClientInput>,
) -> Result<(StatusCode, Json<Client>), AppError> {
    let client = clients::create_client(state.clients.as_ref(), &input).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /api/v1/clients/:id
pub async fn handle_get_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Client>, AppError> {
    Ok(Json(clients::get_client(state.clients.as_ref(), id).await?))
}

/// PUT /api/v1/clients/:id
pub async fn handle_update_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ClientInput>,
) -> Result<Json<Client>, AppError> {
    Ok(Json(
        clients::update_client(state.clients.as_ref(), id, &input).await?,
    ))
}

/// DELETE /api/v1/clients/:id
pub async fn handle_delete_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    clients::delete_client(state.clients.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
