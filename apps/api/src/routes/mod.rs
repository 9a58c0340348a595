pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::clients::handlers as clients;
use crate::employees::handlers as employees;
use crate::offers::handlers as offers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Employees
        .route(
            "/api/v1/employees",
            get(employees::handle_list_employees).post(employees::handle_create_employee),
        )
        .route(
            "/api/v1/employees/:id",
            get(employees::handle_get_employee)
                .put(employees::handle_update_employee)
                .delete(employees::handle_delete_employee),
        )
        // Clients
        .route(
            "/api/v1/clients",
            get(clients::handle_list_clients).post(clients::handle_create_client),
        )
        .route(
            "/api/v1/clients/:id",
            get(clients::handle_get_client)
                .put(clients::handle_update_client)
                .delete(clients::handle_delete_client),
        )
        // Offers
        .route(
            "/api/v1/offers",
            get(offers::handle_list_offers).post(offers::handle_create_offer),
        )
        .route("/api/v1/offers/:id", get(offers::handle_get_offer))
        .route("/api/v1/offers/:id/price", get(offers::handle_price_offer))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
