use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use smokecheck_core::{
    booking,
    models::appointment::{
        Appointment, AppointmentActionResponse, CreateAppointmentRequest,
        CreateAppointmentResponse, UploadReceiptRequest,
    },
};
use uuid::Uuid;

use crate::{
    ApiState, mailer,
    middleware::{
        auth::CurrentUser,
        error_handling::{ApiJson, ApiPath, AppError},
    },
};

/// Books a slot for the caller.
///
/// The amount is priced server-side from the service's current discount.
/// A time that is no longer available is refused with 409.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    CurrentUser(caller): CurrentUser,
    ApiJson(payload): ApiJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<CreateAppointmentResponse>), AppError> {
    let appointment = booking::book_appointment(&state.stores, &caller, payload, Utc::now()).await?;

    mailer::deliver(
        state.mailer.as_ref(),
        &appointment.user_email,
        mailer::booking_confirmation(&appointment),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(CreateAppointmentResponse {
            appointment_id: appointment.id,
            amount: appointment.payment_details.amount,
            status: appointment.status,
        }),
    ))
}

#[axum::debug_handler]
pub async fn list_user_appointments(
    State(state): State<Arc<ApiState>>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = state.stores.appointments.list_for_user(caller.user_id).await?;
    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = booking::visible_appointment(&state.stores, &caller, id).await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn upload_receipt(
    State(state): State<Arc<ApiState>>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UploadReceiptRequest>,
) -> Result<Json<AppointmentActionResponse>, AppError> {
    let appointment = booking::upload_receipt(&state.stores, &caller, id, payload.receipt_base64).await?;

    Ok(Json(AppointmentActionResponse {
        id: appointment.id,
        status: appointment.status,
        message: "Receipt uploaded successfully".to_string(),
    }))
}
