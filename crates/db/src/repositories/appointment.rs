use crate::models::DbAppointment;
use chrono::{DateTime, NaiveDate, Utc};
use eyre::Result;
use smokecheck_core::models::appointment::{AppointmentStatus, AppointmentUpdate, NewAppointment};
use sqlx::types::Json;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const COLUMNS: &str = r#"
    id, user_id, user_email, user_name, service_id, service_name, vehicle_info,
    appointment_date, appointment_time, payment_details, notes, status,
    receipt_base64, emission_test_result, rejection_reason, approved_by,
    approved_at, rejected_by, rejected_at, created_at, updated_at
"#;

/// Appointments on `date` in any of `statuses`.
pub async fn get_appointments_by_date(
    pool: &Pool<Postgres>,
    date: NaiveDate,
    statuses: &[AppointmentStatus],
) -> Result<Vec<DbAppointment>> {
    let statuses: Vec<&str> = statuses.iter().map(AppointmentStatus::as_str).collect();

    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM appointments
        WHERE appointment_date = $1 AND status = ANY($2)
        ORDER BY appointment_time ASC
        "#
    ))
    .bind(date)
    .bind(statuses)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Inserts a `pending` appointment.
///
/// Fails with a unique violation when a blocking appointment already holds
/// the same date and time; see [`super::is_unique_violation`].
pub async fn create_appointment(
    pool: &Pool<Postgres>,
    appointment: &NewAppointment,
) -> Result<DbAppointment> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!(
        "Creating appointment: id={}, date={}, time={}",
        id, appointment.appointment_date, appointment.appointment_time
    );

    let created = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments (
            id, user_id, user_email, user_name, service_id, service_name, vehicle_info,
            appointment_date, appointment_time, payment_details, notes, status,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(appointment.user_id)
    .bind(&appointment.user_email)
    .bind(&appointment.user_name)
    .bind(appointment.service_id)
    .bind(&appointment.service_name)
    .bind(Json(&appointment.vehicle_info))
    .bind(appointment.appointment_date)
    .bind(&appointment.appointment_time)
    .bind(Json(&appointment.payment_details))
    .bind(&appointment.notes)
    .bind(AppointmentStatus::Pending.as_str())
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

pub async fn get_appointment_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(&format!(
        "SELECT {COLUMNS} FROM appointments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(appointment)
}

pub async fn list_appointments_by_user(pool: &Pool<Postgres>, user_id: Uuid) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM appointments
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

pub async fn list_appointments(
    pool: &Pool<Postgres>,
    status: Option<AppointmentStatus>,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM appointments
        WHERE ($1::TEXT IS NULL OR status = $1)
        ORDER BY created_at DESC
        "#
    ))
    .bind(status.map(|status| status.as_str()))
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}

/// Applies a status change and the fields that travel with it.
///
/// The row is only touched while its status is one the update may leave
/// from. Returns `None` when no appointment has that id or its status has
/// already moved on.
pub async fn update_appointment(
    pool: &Pool<Postgres>,
    id: Uuid,
    update: &AppointmentUpdate,
    now: DateTime<Utc>,
) -> Result<Option<DbAppointment>> {
    let status = update.status().as_str();
    let allowed_from: Vec<&str> = update.allowed_from().iter().map(AppointmentStatus::as_str).collect();

    let row = match update {
        AppointmentUpdate::ReceiptUploaded { receipt_base64 } => {
            let sql = format!(
                r#"
                UPDATE appointments
                SET status = $2, updated_at = $3, receipt_base64 = $4
                WHERE id = $1 AND status = ANY($5)
                RETURNING {COLUMNS}
                "#
            );
            sqlx::query_as::<_, DbAppointment>(&sql)
                .bind(id)
                .bind(status)
                .bind(now)
                .bind(receipt_base64)
                .bind(allowed_from)
                .fetch_optional(pool)
                .await?
        }
        AppointmentUpdate::Approved { by, at, result } => {
            let sql = format!(
                r#"
                UPDATE appointments
                SET status = $2, updated_at = $3, approved_by = $4, approved_at = $5,
                    emission_test_result = $6
                WHERE id = $1 AND status = ANY($7)
                RETURNING {COLUMNS}
                "#
            );
            sqlx::query_as::<_, DbAppointment>(&sql)
                .bind(id)
                .bind(status)
                .bind(now)
                .bind(by)
                .bind(at)
                .bind(result.as_ref().map(Json))
                .bind(allowed_from)
                .fetch_optional(pool)
                .await?
        }
        AppointmentUpdate::Rejected { by, at, reason } => {
            let sql = format!(
                r#"
                UPDATE appointments
                SET status = $2, updated_at = $3, rejected_by = $4, rejected_at = $5,
                    rejection_reason = $6
                WHERE id = $1 AND status = ANY($7)
                RETURNING {COLUMNS}
                "#
            );
            sqlx::query_as::<_, DbAppointment>(&sql)
                .bind(id)
                .bind(status)
                .bind(now)
                .bind(by)
                .bind(at)
                .bind(reason)
                .bind(allowed_from)
                .fetch_optional(pool)
                .await?
        }
        AppointmentUpdate::Completed { result } => {
            let sql = format!(
                r#"
                UPDATE appointments
                SET status = $2, updated_at = $3, emission_test_result = $4
                WHERE id = $1 AND status = ANY($5)
                RETURNING {COLUMNS}
                "#
            );
            sqlx::query_as::<_, DbAppointment>(&sql)
                .bind(id)
                .bind(status)
                .bind(now)
                .bind(Json(result))
                .bind(allowed_from)
                .fetch_optional(pool)
                .await?
        }
    };

    Ok(row)
}
