//! # Availability Handlers
//!
//! Working-hours settings and the slot availability query used by the
//! booking form. The slot computation itself lives in
//! `smokecheck_core::availability`.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::json;
use smokecheck_core::{
    availability, booking,
    models::{
        audit::{AuditAction, AuditTarget, NewAuditEntry},
        user::MessageResponse,
        working_hours::WorkingHoursConfig,
    },
    schedule::SlotAvailability,
};
use tracing::info;

use crate::{
    ApiState,
    middleware::{
        auth::AdminUser,
        error_handling::{ApiJson, ApiQuery, AppError},
    },
};

/// Query parameters for the available slots endpoint
///
/// * `date` - calendar date, `YYYY-MM-DD`
/// * `serviceId` - service whose duration sets the slot length
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsQuery {
    pub date: String,
    pub service_id: String,
}

/// Stored working hours, or the standard week when none were saved.
#[axum::debug_handler]
pub async fn get_working_hours(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<WorkingHoursConfig>, AppError> {
    let config = availability::working_hours_or_default(state.stores.working_hours.as_ref()).await?;
    Ok(Json(config))
}

/// Replaces the whole working-hours configuration.
#[axum::debug_handler]
pub async fn update_working_hours(
    State(state): State<Arc<ApiState>>,
    AdminUser(admin): AdminUser,
    ApiJson(config): ApiJson<WorkingHoursConfig>,
) -> Result<Json<MessageResponse>, AppError> {
    config.validate()?;
    state.stores.working_hours.put(&config).await?;
    info!(admin_id = %admin.user_id, "working hours updated");

    booking::record_audit(
        state.stores.audit.as_ref(),
        NewAuditEntry {
            admin_id: admin.user_id,
            admin_email: admin.email.clone(),
            action: AuditAction::UpdatedWorkingHours,
            target_type: AuditTarget::Settings,
            target_id: "working_hours".to_string(),
            details: json!({ "workingHours": config }),
        },
    )
    .await;

    Ok(Json(MessageResponse::new("Working hours updated successfully")))
}

/// Bookable start times for a service on a date
///
/// # Endpoint
///
/// ```text
/// GET /api/settings/available-slots?date=2024-06-03&serviceId=<uuid>
/// ```
///
/// # Errors
///
/// * 400 - missing parameters or a malformed date
/// * 404 - unknown service
#[axum::debug_handler]
pub async fn available_slots(
    State(state): State<Arc<ApiState>>,
    ApiQuery(query): ApiQuery<AvailableSlotsQuery>,
) -> Result<Json<SlotAvailability>, AppError> {
    let slots = availability::available_slots(
        state.stores.working_hours.as_ref(),
        state.stores.services.as_ref(),
        state.stores.appointments.as_ref(),
        &query.date,
        &query.service_id,
    )
    .await?;
    Ok(Json(slots))
}
