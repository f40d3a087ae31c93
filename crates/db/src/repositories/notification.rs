use crate::models::DbNotification;
use chrono::Utc;
use eyre::Result;
use smokecheck_core::models::notification::NewNotification;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_notification(
    pool: &Pool<Postgres>,
    notification: &NewNotification,
) -> Result<DbNotification> {
    let created = sqlx::query_as::<_, DbNotification>(
        r#"
        INSERT INTO notifications (id, user_id, kind, message, appointment_id, is_read, is_deleted, created_at)
        VALUES ($1, $2, $3, $4, $5, FALSE, FALSE, $6)
        RETURNING id, user_id, kind, message, appointment_id, is_read, is_deleted, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(notification.user_id)
    .bind(notification.kind.as_str())
    .bind(&notification.message)
    .bind(notification.appointment_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(created)
}

pub async fn list_notifications_by_user(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    deleted: bool,
) -> Result<Vec<DbNotification>> {
    let notifications = sqlx::query_as::<_, DbNotification>(
        r#"
        SELECT id, user_id, kind, message, appointment_id, is_read, is_deleted, created_at
        FROM notifications
        WHERE user_id = $1 AND is_deleted = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(deleted)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

pub async fn mark_notification_read(pool: &Pool<Postgres>, id: Uuid, user_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE notifications
        SET is_read = TRUE
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn soft_delete_notification(pool: &Pool<Postgres>, id: Uuid, user_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE notifications
        SET is_deleted = TRUE
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
