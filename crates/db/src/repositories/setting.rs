use crate::models::DbSetting;
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};

pub const WORKING_HOURS_KEY: &str = "working_hours";

pub async fn get_setting(pool: &Pool<Postgres>, key: &str) -> Result<Option<DbSetting>> {
    let setting = sqlx::query_as::<_, DbSetting>(
        r#"
        SELECT key, value, updated_at
        FROM settings
        WHERE key = $1
        "#,
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(setting)
}

/// Replaces the whole value stored under `key`.
pub async fn put_setting(pool: &Pool<Postgres>, key: &str, value: &serde_json::Value) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (key)
        DO UPDATE SET value = $2, updated_at = $3
        "#,
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}
