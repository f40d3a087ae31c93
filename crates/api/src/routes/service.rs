use axum::{
    Router,
    routing::{get, patch},
};
use std::sync::Arc;

use crate::{ApiState, handlers::service};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/services",
            get(service::list_services).post(service::create_service),
        )
        .route("/api/services/:id", get(service::get_service))
        .route(
            "/api/services/:id/discount",
            patch(service::update_discount).delete(service::remove_discount),
        )
}
