use std::sync::Arc;

use axum::{Json, extract::State};
use smokecheck_core::{
    errors::BookingError,
    models::{
        notification::{Notification, NotificationQuery},
        user::MessageResponse,
    },
};
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{
        auth::CurrentUser,
        error_handling::{ApiPath, ApiQuery, AppError},
    },
};

fn notification_not_found() -> BookingError {
    BookingError::NotFound("Notification not found".to_string())
}

/// The caller's inbox, or their trash with `?deleted=true`.
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<Arc<ApiState>>,
    CurrentUser(caller): CurrentUser,
    ApiQuery(query): ApiQuery<NotificationQuery>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = state
        .stores
        .notifications
        .list_for_user(caller.user_id, query.deleted)
        .await?;
    Ok(Json(notifications))
}

#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<Arc<ApiState>>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.stores.notifications.mark_read(id, caller.user_id).await? {
        return Err(notification_not_found().into());
    }
    Ok(Json(MessageResponse::new("Notification marked as read")))
}

#[axum::debug_handler]
pub async fn delete_notification(
    State(state): State<Arc<ApiState>>,
    CurrentUser(caller): CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.stores.notifications.soft_delete(id, caller.user_id).await? {
        return Err(notification_not_found().into());
    }
    Ok(Json(MessageResponse::new("Notification deleted")))
}
