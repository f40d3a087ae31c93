use axum::{
    Router,
    routing::{get, patch},
};
use std::sync::Arc;

use crate::{ApiState, handlers::admin};

/// Administrator-only endpoints. Access is checked per handler by the
/// `AdminUser` extractor.
pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/admin/appointments", get(admin::list_appointments))
        .route(
            "/api/admin/appointments/:id/approve",
            patch(admin::approve_appointment),
        )
        .route(
            "/api/admin/appointments/:id/reject",
            patch(admin::reject_appointment),
        )
        .route(
            "/api/admin/appointments/:id/result",
            patch(admin::record_result),
        )
        .route("/api/admin/dashboard/stats", get(admin::dashboard_stats))
        .route("/api/admin/audit-logs", get(admin::audit_logs))
}
