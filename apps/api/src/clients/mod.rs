pub mod handlers;

use tracing::info;

use crate::errors::{AppError, ValidationError};
use crate::fields::{require_email, require_text};
use crate::models::client::{Client, ClientInput};
use crate::store::ClientStore;

pub fn validate_client(input: &ClientInput) -> Result<(), ValidationError> {
    require_text("name", &input.name)?;
    require_email("email", &input.email)?;
    require_text("address", &input.address)?;
    Ok(())
}

pub async fn create_client(store: &dyn ClientStore, input: &ClientInput) -> Result<Client, AppError> {
    validate_client(input)?;
    let client = store.create_client(input).await?;
    info!("Created client {}", client.id);
    Ok(client)
}

pub async fn get_client(store: &dyn ClientStore, id: i64) -> Result<Client, AppError> {
    store
        .get_client(id)
        .await
        .map_err(|e| AppError::from_store(e, || format!("Client {id}")))
}

pub async fn update_client(
    store: &dyn ClientStore,
    id: i64,
    input: &ClientInput,
) -> Result<Client, AppError> {
    validate_client(input)?;
    let client = store
        .update_client(id, input)
        .await
        .map_err(|e| AppError::from_store(e, || format!("Client {id}")))?;
    info!("Updated client {id}");
    Ok(client)
}

pub async fn delete_client(store: &dyn ClientStore, id: i64) -> Result<(), AppError> {
    store
        .delete_client(id)
        .await
        .map_err(|e| AppError::from_store(e, || format!("Client {id}")))?;
    info!("Deleted client {id}");
    Ok(())
}
