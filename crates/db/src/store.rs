//! Postgres implementation of the store traits.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use eyre::WrapErr;
use tracing::{info, warn};
use uuid::Uuid;

use smokecheck_core::errors::{BookingError, BookingResult};
use smokecheck_core::models::{
    appointment::{Appointment, AppointmentStatus, AppointmentUpdate, NewAppointment},
    audit::{AuditEntry, NewAuditEntry},
    notification::{NewNotification, Notification},
    service::{Discount, NewService, Service},
    user::{Caller, Session, User, validate_password},
    working_hours::WorkingHoursConfig,
};
use smokecheck_core::store::{
    AppointmentStore, AuditStore, IdentityProvider, NotificationStore, ServiceStore,
    WorkingHoursStore,
};

use crate::DbPool;
use crate::credentials::{self, IdentityConfig};
use crate::repositories::{self, is_unique_violation};

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
    identity: IdentityConfig,
}

impl PgStore {
    pub fn new(pool: DbPool, identity: IdentityConfig) -> Self {
        Self { pool, identity }
    }
}

fn slot_taken() -> BookingError {
    BookingError::Conflict("This time slot is already booked".to_string())
}

fn status_moved_on() -> BookingError {
    BookingError::Conflict("Appointment status changed concurrently".to_string())
}

fn invalid_credentials() -> BookingError {
    BookingError::Authentication("Invalid email or password".to_string())
}

#[async_trait]
impl WorkingHoursStore for PgStore {
    async fn get(&self) -> BookingResult<Option<WorkingHoursConfig>> {
        let Some(setting) =
            repositories::setting::get_setting(&self.pool, repositories::setting::WORKING_HOURS_KEY).await?
        else {
            return Ok(None);
        };

        let config = serde_json::from_value(setting.value)
            .wrap_err("Stored working hours are not a valid configuration")?;
        Ok(Some(config))
    }

    async fn put(&self, config: &WorkingHoursConfig) -> BookingResult<()> {
        let value = serde_json::to_value(config).wrap_err("Failed to encode working hours")?;
        repositories::setting::put_setting(&self.pool, repositories::setting::WORKING_HOURS_KEY, &value)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ServiceStore for PgStore {
    async fn list(&self) -> BookingResult<Vec<Service>> {
        let rows = repositories::service::list_services(&self.pool).await?;
        Ok(rows.into_iter().map(Service::from).collect())
    }

    async fn get(&self, id: Uuid) -> BookingResult<Option<Service>> {
        let row = repositories::service::get_service_by_id(&self.pool, id).await?;
        Ok(row.map(Service::from))
    }

    async fn create(&self, service: NewService) -> BookingResult<Service> {
        let row = repositories::service::create_service(&self.pool, &service).await?;
        Ok(row.into())
    }

    async fn set_discount(&self, id: Uuid, discount: Option<Discount>) -> BookingResult<bool> {
        let updated = repositories::service::set_discount(&self.pool, id, discount.as_ref()).await?;
        Ok(updated)
    }
}

#[async_trait]
impl AppointmentStore for PgStore {
    async fn query(
        &self,
        date: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> BookingResult<Vec<Appointment>> {
        let rows = repositories::appointment::get_appointments_by_date(&self.pool, date, statuses).await?;
        rows.into_iter()
            .map(|row| Appointment::try_from(row).map_err(BookingError::from))
            .collect()
    }

    async fn create(&self, appointment: NewAppointment) -> BookingResult<Appointment> {
        match repositories::appointment::create_appointment(&self.pool, &appointment).await {
            Ok(row) => Ok(row.try_into()?),
            Err(err) if is_unique_violation(&err) => {
                warn!(
                    date = %appointment.appointment_date,
                    time = %appointment.appointment_time,
                    "concurrent booking rejected by slot index"
                );
                Err(slot_taken())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, id: Uuid) -> BookingResult<Option<Appointment>> {
        let row = repositories::appointment::get_appointment_by_id(&self.pool, id).await?;
        Ok(row.map(Appointment::try_from).transpose()?)
    }

    async fn list_for_user(&self, user_id: Uuid) -> BookingResult<Vec<Appointment>> {
        let rows = repositories::appointment::list_appointments_by_user(&self.pool, user_id).await?;
        rows.into_iter()
            .map(|row| Appointment::try_from(row).map_err(BookingError::from))
            .collect()
    }

    async fn list(&self, status: Option<AppointmentStatus>) -> BookingResult<Vec<Appointment>> {
        let rows = repositories::appointment::list_appointments(&self.pool, status).await?;
        rows.into_iter()
            .map(|row| Appointment::try_from(row).map_err(BookingError::from))
            .collect()
    }

    async fn update(&self, id: Uuid, update: AppointmentUpdate) -> BookingResult<Appointment> {
        // Approving a verified booking makes it hold its slot again, which
        // the slot index refuses if someone else took the time meanwhile.
        match repositories::appointment::update_appointment(&self.pool, id, &update, Utc::now()).await {
            Ok(Some(row)) => Ok(row.try_into()?),
            Ok(None) => match repositories::appointment::get_appointment_by_id(&self.pool, id).await? {
                Some(_) => Err(status_moved_on()),
                None => Err(BookingError::NotFound("Appointment not found".to_string())),
            },
            Err(err) if is_unique_violation(&err) => Err(slot_taken()),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn create(&self, notification: NewNotification) -> BookingResult<Notification> {
        let row = repositories::notification::create_notification(&self.pool, &notification).await?;
        Ok(row.try_into()?)
    }

    async fn list_for_user(&self, user_id: Uuid, deleted: bool) -> BookingResult<Vec<Notification>> {
        let rows =
            repositories::notification::list_notifications_by_user(&self.pool, user_id, deleted).await?;
        rows.into_iter()
            .map(|row| Notification::try_from(row).map_err(BookingError::from))
            .collect()
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> BookingResult<bool> {
        Ok(repositories::notification::mark_notification_read(&self.pool, id, user_id).await?)
    }

    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> BookingResult<bool> {
        Ok(repositories::notification::soft_delete_notification(&self.pool, id, user_id).await?)
    }
}

#[async_trait]
impl AuditStore for PgStore {
    async fn record(&self, entry: NewAuditEntry) -> BookingResult<AuditEntry> {
        let row = repositories::audit::create_audit_log(&self.pool, &entry).await?;
        Ok(row.into())
    }

    async fn recent(&self, limit: i64) -> BookingResult<Vec<AuditEntry>> {
        let rows = repositories::audit::list_recent_audit_logs(&self.pool, limit).await?;
        Ok(rows.into_iter().map(AuditEntry::from).collect())
    }
}

#[async_trait]
impl IdentityProvider for PgStore {
    async fn register(&self, email: &str, password: &str, display_name: &str) -> BookingResult<User> {
        let email = credentials::normalize_email(email);
        validate_password(password)?;
        let password_hash = credentials::hash_password(password)?;

        match repositories::user::create_user(&self.pool, &email, display_name, &password_hash).await {
            Ok(row) => {
                info!(user_id = %row.id, "user registered");
                Ok(row.into())
            }
            Err(err) if is_unique_violation(&err) => Err(BookingError::Conflict(
                "An account with this email already exists".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    async fn login(&self, email: &str, password: &str) -> BookingResult<Session> {
        let email = credentials::normalize_email(email);
        let user = repositories::user::get_user_by_email(&self.pool, &email)
            .await?
            .ok_or_else(invalid_credentials)?;
        if !credentials::verify_password(password, &user.password_hash)? {
            return Err(invalid_credentials());
        }

        let token = credentials::generate_token();
        let expires_at = Utc::now() + self.identity.session_ttl;
        repositories::user::create_session(&self.pool, &token, user.id, expires_at).await?;

        Ok(Session {
            token,
            expires_at,
            user: user.into(),
        })
    }

    async fn verify_token(&self, token: &str) -> BookingResult<Caller> {
        repositories::user::get_session_user(&self.pool, token, Utc::now())
            .await?
            .map(Caller::from)
            .ok_or_else(|| BookingError::Authentication("Invalid or expired token".to_string()))
    }

    async fn issue_otp(&self, email: &str) -> BookingResult<(User, String)> {
        let email = credentials::normalize_email(email);
        let user = repositories::user::get_user_by_email(&self.pool, &email)
            .await?
            .ok_or_else(|| BookingError::NotFound("No account found for this email".to_string()))?;

        let code = credentials::generate_otp();
        let expires_at = Utc::now() + self.identity.otp_ttl;
        repositories::user::upsert_otp(&self.pool, &email, &code, expires_at).await?;

        Ok((user.into(), code))
    }

    async fn verify_otp(&self, email: &str, code: &str) -> BookingResult<bool> {
        let email = credentials::normalize_email(email);
        let otp = repositories::user::get_otp(&self.pool, &email).await?;
        Ok(otp.is_some_and(|otp| otp.code == code.trim() && otp.expires_at > Utc::now()))
    }

    async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> BookingResult<()> {
        validate_password(new_password)?;
        if !self.verify_otp(email, code).await? {
            return Err(BookingError::Validation("Invalid or expired code".to_string()));
        }

        let email = credentials::normalize_email(email);
        let user = repositories::user::get_user_by_email(&self.pool, &email)
            .await?
            .ok_or_else(|| BookingError::NotFound("No account found for this email".to_string()))?;

        let password_hash = credentials::hash_password(new_password)?;
        repositories::user::update_password(&self.pool, user.id, &password_hash).await?;
        repositories::user::delete_otp(&self.pool, &email).await?;
        repositories::user::delete_sessions_for_user(&self.pool, user.id).await?;

        info!(user_id = %user.id, "password reset");
        Ok(())
    }
}
