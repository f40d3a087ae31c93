use crate::models::DbAuditLog;
use chrono::Utc;
use eyre::Result;
use smokecheck_core::models::audit::NewAuditEntry;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_audit_log(pool: &Pool<Postgres>, entry: &NewAuditEntry) -> Result<DbAuditLog> {
    let log = sqlx::query_as::<_, DbAuditLog>(
        r#"
        INSERT INTO audit_logs (id, admin_id, admin_email, action, target_type, target_id, details, logged_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, admin_id, admin_email, action, target_type, target_id, details, logged_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(entry.admin_id)
    .bind(&entry.admin_email)
    .bind(entry.action.as_str())
    .bind(entry.target_type.as_str())
    .bind(&entry.target_id)
    .bind(&entry.details)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(log)
}

pub async fn list_recent_audit_logs(pool: &Pool<Postgres>, limit: i64) -> Result<Vec<DbAuditLog>> {
    let logs = sqlx::query_as::<_, DbAuditLog>(
        r#"
        SELECT id, admin_id, admin_email, action, target_type, target_id, details, logged_at
        FROM audit_logs
        ORDER BY logged_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}
