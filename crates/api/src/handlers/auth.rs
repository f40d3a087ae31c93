use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use smokecheck_core::{
    errors::BookingError,
    models::user::{
        LoginRequest, MessageResponse, RegisterRequest, RegisterResponse, ResetPasswordRequest,
        SendOtpRequest, Session, VerifyOtpRequest, VerifyTokenResponse,
    },
};
use tracing::info;

use crate::{
    ApiState, mailer,
    middleware::{
        auth::CurrentUser,
        error_handling::{ApiJson, AppError},
    },
};

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    payload.validate()?;

    let user = state
        .identity
        .register(&payload.email, &payload.password, &payload.display_name())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(BookingError::Validation("Email and password are required".to_string()).into());
    }

    let session = state.identity.login(&payload.email, &payload.password).await?;
    Ok(Json(session))
}

#[axum::debug_handler(state = Arc<ApiState>)]
pub async fn verify(CurrentUser(caller): CurrentUser) -> Json<VerifyTokenResponse> {
    Json(VerifyTokenResponse { user: caller })
}

/// Issues a password-reset code and emails it.
#[axum::debug_handler]
pub async fn send_otp(
    State(state): State<Arc<ApiState>>,
    ApiJson(payload): ApiJson<SendOtpRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if payload.email.trim().is_empty() {
        return Err(BookingError::Validation("Email is required".to_string()).into());
    }

    let (user, code) = state.identity.issue_otp(&payload.email).await?;
    mailer::deliver(
        state.mailer.as_ref(),
        &user.email,
        mailer::one_time_code(&code, state.otp_ttl_minutes),
    )
    .await;
    info!(user_id = %user.id, "one-time code issued");

    Ok(Json(MessageResponse::new("OTP sent to your email")))
}

#[axum::debug_handler]
pub async fn verify_otp(
    State(state): State<Arc<ApiState>>,
    ApiJson(payload): ApiJson<VerifyOtpRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.identity.verify_otp(&payload.email, &payload.otp).await? {
        return Err(BookingError::Validation("Invalid or expired code".to_string()).into());
    }
    Ok(Json(MessageResponse::new("OTP verified")))
}

#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<Arc<ApiState>>,
    ApiJson(payload): ApiJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .identity
        .reset_password(&payload.email, &payload.otp, &payload.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}
