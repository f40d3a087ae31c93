use axum::{
    Router,
    routing::{delete, get, patch},
};
use std::sync::Arc;

use crate::{ApiState, handlers::notification};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/notifications", get(notification::list_notifications))
        .route("/api/notifications/:id/read", patch(notification::mark_read))
        .route(
            "/api/notifications/:id",
            delete(notification::delete_notification),
        )
}
