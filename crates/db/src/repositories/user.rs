use crate::models::{DbOtpCode, DbSession, DbUser};
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_user(
    pool: &Pool<Postgres>,
    email: &str,
    display_name: &str,
    password_hash: &str,
) -> Result<DbUser> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating user: id={}, email={}", id, email);

    let user = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (id, email, display_name, password_hash, is_admin, created_at)
        VALUES ($1, $2, $3, $4, FALSE, $5)
        RETURNING id, email, display_name, password_hash, is_admin, created_at
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(display_name)
    .bind(password_hash)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(pool: &Pool<Postgres>, email: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, display_name, password_hash, is_admin, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn update_password(pool: &Pool<Postgres>, id: Uuid, password_hash: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(password_hash)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_session(
    pool: &Pool<Postgres>,
    token: &str,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<DbSession> {
    let session = sqlx::query_as::<_, DbSession>(
        r#"
        INSERT INTO sessions (token, user_id, expires_at, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING token, user_id, expires_at, created_at
        "#,
    )
    .bind(token)
    .bind(user_id)
    .bind(expires_at)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(session)
}

/// The user behind an unexpired session token.
pub async fn get_session_user(
    pool: &Pool<Postgres>,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT u.id, u.email, u.display_name, u.password_hash, u.is_admin, u.created_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = $1 AND s.expires_at > $2
        "#,
    )
    .bind(token)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn delete_sessions_for_user(pool: &Pool<Postgres>, user_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Stores a code for `email`, replacing any outstanding one.
pub async fn upsert_otp(
    pool: &Pool<Postgres>,
    email: &str,
    code: &str,
    expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO otp_codes (email, code, expires_at, created_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email)
        DO UPDATE SET code = $2, expires_at = $3, created_at = $4
        "#,
    )
    .bind(email)
    .bind(code)
    .bind(expires_at)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_otp(pool: &Pool<Postgres>, email: &str) -> Result<Option<DbOtpCode>> {
    let otp = sqlx::query_as::<_, DbOtpCode>(
        r#"
        SELECT email, code, expires_at
        FROM otp_codes
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(otp)
}

pub async fn delete_otp(pool: &Pool<Postgres>, email: &str) -> Result<()> {
    sqlx::query("DELETE FROM otp_codes WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await?;

    Ok(())
}
