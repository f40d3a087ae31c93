//! Administrator review of bookings, the dashboard and the audit trail.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use serde::Deserialize;
use smokecheck_core::{
    booking,
    models::{
        appointment::{
            Appointment, AppointmentActionResponse, AppointmentStatus, ApproveAppointmentRequest,
            DashboardStats, RecordResultRequest, RejectAppointmentRequest,
        },
        audit::{AuditEntry, AuditQuery},
    },
};
use uuid::Uuid;

use crate::{
    ApiState, mailer,
    middleware::{
        auth::AdminUser,
        error_handling::{ApiJson, ApiPath, ApiQuery, AppError},
    },
};

const DEFAULT_AUDIT_LIMIT: i64 = 100;
const MAX_AUDIT_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct AppointmentListQuery {
    pub status: Option<AppointmentStatus>,
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    AdminUser(_admin): AdminUser,
    ApiQuery(query): ApiQuery<AppointmentListQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = state.stores.appointments.list(query.status).await?;
    Ok(Json(appointments))
}

/// Approves a verified booking.
///
/// The body may be left out entirely. One that is sent must be valid JSON
/// of the right shape.
#[axum::debug_handler]
pub async fn approve_appointment(
    State(state): State<Arc<ApiState>>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    payload: Result<Json<ApproveAppointmentRequest>, JsonRejection>,
) -> Result<Json<AppointmentActionResponse>, AppError> {
    let ApproveAppointmentRequest {
        emission_test_result,
    } = match payload {
        Ok(Json(payload)) => payload,
        Err(JsonRejection::MissingJsonContentType(_)) => ApproveAppointmentRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };

    let appointment = booking::approve(&state.stores, &admin, id, emission_test_result, Utc::now()).await?;
    mailer::deliver(
        state.mailer.as_ref(),
        &appointment.user_email,
        mailer::appointment_approved(&appointment),
    )
    .await;

    Ok(Json(AppointmentActionResponse {
        id: appointment.id,
        status: appointment.status,
        message: "Appointment approved successfully".to_string(),
    }))
}

#[axum::debug_handler]
pub async fn reject_appointment(
    State(state): State<Arc<ApiState>>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<RejectAppointmentRequest>,
) -> Result<Json<AppointmentActionResponse>, AppError> {
    let appointment = booking::reject(&state.stores, &admin, id, payload.reason, Utc::now()).await?;

    let reason = appointment.rejection_reason.clone().unwrap_or_default();
    mailer::deliver(
        state.mailer.as_ref(),
        &appointment.user_email,
        mailer::appointment_rejected(&appointment, &reason),
    )
    .await;

    Ok(Json(AppointmentActionResponse {
        id: appointment.id,
        status: appointment.status,
        message: "Appointment rejected".to_string(),
    }))
}

#[axum::debug_handler]
pub async fn record_result(
    State(state): State<Arc<ApiState>>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<RecordResultRequest>,
) -> Result<Json<AppointmentActionResponse>, AppError> {
    let result = payload.emission_test_result;
    let appointment = booking::record_result(&state.stores, &admin, id, result.clone()).await?;

    mailer::deliver(
        state.mailer.as_ref(),
        &appointment.user_email,
        mailer::test_completed(&appointment, &result),
    )
    .await;

    Ok(Json(AppointmentActionResponse {
        id: appointment.id,
        status: appointment.status,
        message: "Test results saved".to_string(),
    }))
}

#[axum::debug_handler]
pub async fn dashboard_stats(
    State(state): State<Arc<ApiState>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<DashboardStats>, AppError> {
    let appointments = state.stores.appointments.list(None).await?;
    let stats = DashboardStats::tally(appointments.iter().map(|appointment| appointment.status));
    Ok(Json(stats))
}

#[axum::debug_handler]
pub async fn audit_logs(
    State(state): State<Arc<ApiState>>,
    AdminUser(_admin): AdminUser,
    ApiQuery(query): ApiQuery<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT);
    let entries = state.stores.audit.recent(limit).await?;
    Ok(Json(entries))
}
