use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde_json::json;
use smokecheck_core::{
    booking,
    errors::BookingError,
    models::{
        audit::{AuditAction, AuditTarget, NewAuditEntry},
        service::{NewService, ServiceResponse, UpdateDiscountRequest},
        user::{Caller, MessageResponse},
    },
    pricing,
};
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        auth::AdminUser,
        error_handling::{ApiJson, ApiPath, AppError},
    },
};

fn service_not_found() -> BookingError {
    BookingError::NotFound("Service not found".to_string())
}

async fn audit_service_change(
    state: &ApiState,
    admin: &Caller,
    action: AuditAction,
    service_id: Uuid,
    details: serde_json::Value,
) {
    booking::record_audit(
        state.stores.audit.as_ref(),
        NewAuditEntry {
            admin_id: admin.user_id,
            admin_email: admin.email.clone(),
            action,
            target_type: AuditTarget::Service,
            target_id: service_id.to_string(),
            details,
        },
    )
    .await;
}

/// Every service with its price after any live discount.
#[axum::debug_handler]
pub async fn list_services(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<ServiceResponse>>, AppError> {
    let now = Utc::now();
    let services = state.stores.services.list().await?;
    Ok(Json(
        services
            .into_iter()
            .map(|service| pricing::priced(service, now))
            .collect(),
    ))
}

#[axum::debug_handler]
pub async fn get_service(
    State(state): State<Arc<ApiState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ServiceResponse>, AppError> {
    let service = state
        .stores
        .services
        .get(id)
        .await?
        .ok_or_else(service_not_found)?;
    Ok(Json(pricing::priced(service, Utc::now())))
}

#[axum::debug_handler]
pub async fn create_service(
    State(state): State<Arc<ApiState>>,
    AdminUser(admin): AdminUser,
    ApiJson(payload): ApiJson<NewService>,
) -> Result<(StatusCode, Json<ServiceResponse>), AppError> {
    payload.validate()?;

    let service = state.stores.services.create(payload).await?;
    audit_service_change(
        &state,
        &admin,
        AuditAction::CreatedService,
        service.id,
        json!({ "name": service.name, "price": service.price }),
    )
    .await;

    Ok((StatusCode::CREATED, Json(pricing::priced(service, Utc::now()))))
}

/// Validates and stores a discount, replacing any existing one.
#[axum::debug_handler]
pub async fn update_discount(
    State(state): State<Arc<ApiState>>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateDiscountRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let discount = payload.into_discount(Utc::now())?;
    let details = serde_json::to_value(&discount).unwrap_or_default();

    if !state.stores.services.set_discount(id, Some(discount)).await? {
        return Err(service_not_found().into());
    }
    audit_service_change(&state, &admin, AuditAction::UpdatedDiscount, id, details).await;

    Ok(Json(MessageResponse::new("Discount updated successfully")))
}

#[axum::debug_handler]
pub async fn remove_discount(
    State(state): State<Arc<ApiState>>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.stores.services.set_discount(id, None).await? {
        return Err(service_not_found().into());
    }
    audit_service_change(&state, &admin, AuditAction::RemovedDiscount, id, json!({})).await;

    Ok(Json(MessageResponse::new("Discount removed successfully")))
}
