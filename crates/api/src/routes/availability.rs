use axum::{
    Router,
    routing::get,
};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/settings/working-hours",
            get(handlers::availability::get_working_hours)
                .put(handlers::availability::update_working_hours),
        )
        .route(
            "/api/settings/available-slots",
            get(handlers::availability::available_slots),
        )
}
