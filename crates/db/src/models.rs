//! Row types as they come out of Postgres, and their conversion into the
//! domain types of `smokecheck-core`.

use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Result, eyre};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

use smokecheck_core::models::{
    appointment::{Appointment, AppointmentStatus, EmissionTestResult, PaymentDetails, VehicleInfo},
    audit::AuditEntry,
    notification::{Notification, NotificationKind},
    service::{Discount, Service},
    user::{Caller, User},
};

#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            is_admin: row.is_admin,
            created_at: row.created_at,
        }
    }
}

impl From<DbUser> for Caller {
    fn from(row: DbUser) -> Self {
        User::from(row).into()
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbSession {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbOtpCode {
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbService {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
    pub discount: Option<Json<Discount>>,
    pub created_at: DateTime<Utc>,
}

impl From<DbService> for Service {
    fn from(row: DbService) -> Self {
        Service {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            duration_minutes: row.duration_minutes,
            price: row.price,
            discount: row.discount.map(|Json(discount)| discount),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub user_name: String,
    pub service_id: Uuid,
    pub service_name: String,
    pub vehicle_info: Json<VehicleInfo>,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub payment_details: Json<PaymentDetails>,
    pub notes: String,
    pub status: String,
    pub receipt_base64: Option<String>,
    pub emission_test_result: Option<Json<EmissionTestResult>>,
    pub rejection_reason: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<Uuid>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbAppointment> for Appointment {
    type Error = eyre::Report;

    fn try_from(row: DbAppointment) -> Result<Self> {
        let status: AppointmentStatus = row
            .status
            .parse()
            .map_err(|_| eyre!("appointment {} has unknown status '{}'", row.id, row.status))?;

        Ok(Appointment {
            id: row.id,
            user_id: row.user_id,
            user_email: row.user_email,
            user_name: row.user_name,
            service_id: row.service_id,
            service_name: row.service_name,
            vehicle_info: row.vehicle_info.0,
            appointment_date: row.appointment_date,
            appointment_time: row.appointment_time,
            payment_details: row.payment_details.0,
            notes: row.notes,
            status,
            receipt_base64: row.receipt_base64,
            emission_test_result: row.emission_test_result.map(|Json(result)| result),
            rejection_reason: row.rejection_reason,
            approved_by: row.approved_by,
            approved_at: row.approved_at,
            rejected_by: row.rejected_by,
            rejected_at: row.rejected_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub message: String,
    pub appointment_id: Option<Uuid>,
    pub is_read: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbNotification> for Notification {
    type Error = eyre::Report;

    fn try_from(row: DbNotification) -> Result<Self> {
        let kind: NotificationKind = row.kind.parse().map_err(|err: String| eyre!(err))?;
        Ok(Notification {
            id: row.id,
            user_id: row.user_id,
            kind,
            message: row.message,
            appointment_id: row.appointment_id,
            read: row.is_read,
            deleted: row.is_deleted,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbAuditLog {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub admin_email: String,
    pub action: String,
    pub target_type: String,
    pub target_id: String,
    pub details: serde_json::Value,
    pub logged_at: DateTime<Utc>,
}

impl From<DbAuditLog> for AuditEntry {
    fn from(row: DbAuditLog) -> Self {
        AuditEntry {
            id: row.id,
            admin_id: row.admin_id,
            admin_email: row.admin_email,
            action: row.action,
            target_type: row.target_type,
            target_id: row.target_id,
            details: row.details,
            timestamp: row.logged_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbSetting {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
