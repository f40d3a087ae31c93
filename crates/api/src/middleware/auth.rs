//! # Authentication Module
//!
//! Extractors that resolve the `Authorization: Bearer <token>` header into
//! the calling identity. Handlers that take [`CurrentUser`] require a valid
//! session; handlers that take [`AdminUser`] additionally require the
//! administrator marker.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use smokecheck_core::{errors::BookingError, models::user::Caller};

use crate::{ApiState, middleware::error_handling::AppError};

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Caller);

/// An authenticated caller carrying the administrator marker.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Caller);

/// The token of a `Bearer` authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BookingError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| BookingError::Authentication("No token provided".to_string()))
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<ApiState>) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let caller = state.identity.verify_token(token).await?;
        Ok(CurrentUser(caller))
    }
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<ApiState>) -> Result<Self, Self::Rejection> {
        let CurrentUser(caller) = CurrentUser::from_request_parts(parts, state).await?;
        caller.require_admin()?;
        Ok(AdminUser(caller))
    }
}
