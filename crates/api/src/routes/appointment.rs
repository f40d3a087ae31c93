use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers::appointment};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/appointments", post(appointment::create_appointment))
        .route(
            "/api/appointments/user",
            get(appointment::list_user_appointments),
        )
        .route("/api/appointments/:id", get(appointment::get_appointment))
        .route(
            "/api/appointments/:id/receipt",
            patch(appointment::upload_receipt),
        )
}
