use crate::models::DbService;
use chrono::Utc;
use eyre::Result;
use smokecheck_core::models::service::{Discount, NewService};
use sqlx::types::Json;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn list_services(pool: &Pool<Postgres>) -> Result<Vec<DbService>> {
    let services = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, name, description, category, duration_minutes, price, discount, created_at
        FROM services
        ORDER BY name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(services)
}

pub async fn get_service_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbService>> {
    let service = sqlx::query_as::<_, DbService>(
        r#"
        SELECT id, name, description, category, duration_minutes, price, discount, created_at
        FROM services
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(service)
}

pub async fn create_service(pool: &Pool<Postgres>, service: &NewService) -> Result<DbService> {
    let id = Uuid::new_v4();

    tracing::debug!("Creating service: id={}, name={}", id, service.name);

    let created = sqlx::query_as::<_, DbService>(
        r#"
        INSERT INTO services (id, name, description, category, duration_minutes, price, discount, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, NULL, $7)
        RETURNING id, name, description, category, duration_minutes, price, discount, created_at
        "#,
    )
    .bind(id)
    .bind(&service.name)
    .bind(&service.description)
    .bind(&service.category)
    .bind(service.duration_minutes)
    .bind(service.price)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Writes or clears the discount. Returns `false` when no row matched.
pub async fn set_discount(
    pool: &Pool<Postgres>,
    id: Uuid,
    discount: Option<&Discount>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE services
        SET discount = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(discount.map(Json))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
