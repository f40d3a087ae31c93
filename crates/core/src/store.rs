//! Collaborator interfaces.
//!
//! Every piece of external state (documents, identities) is reached through
//! one of these traits so the booking logic can run against Postgres in
//! production and an in-memory store in tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::BookingResult;
use crate::models::{
    appointment::{Appointment, AppointmentStatus, AppointmentUpdate, NewAppointment},
    audit::{AuditEntry, NewAuditEntry},
    notification::{NewNotification, Notification},
    service::{Discount, NewService, Service},
    user::{Caller, Session, User},
    working_hours::WorkingHoursConfig,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkingHoursStore: Send + Sync {
    /// The stored configuration, if an administrator ever saved one.
    async fn get(&self) -> BookingResult<Option<WorkingHoursConfig>>;

    /// Replaces the whole configuration.
    async fn put(&self, config: &WorkingHoursConfig) -> BookingResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceStore: Send + Sync {
    async fn list(&self) -> BookingResult<Vec<Service>>;

    async fn get(&self, id: Uuid) -> BookingResult<Option<Service>>;

    async fn create(&self, service: NewService) -> BookingResult<Service>;

    /// Sets or clears the discount. Returns `false` when the service does not exist.
    async fn set_discount(&self, id: Uuid, discount: Option<Discount>) -> BookingResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Appointments on `date` whose status is one of `statuses`.
    async fn query(
        &self,
        date: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> BookingResult<Vec<Appointment>>;

    /// Stores a new `pending` appointment.
    ///
    /// Fails with `Conflict` when another blocking appointment already holds
    /// the same date and time.
    async fn create(&self, appointment: NewAppointment) -> BookingResult<Appointment>;

    async fn get(&self, id: Uuid) -> BookingResult<Option<Appointment>>;

    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> BookingResult<Vec<Appointment>>;

    /// Newest first, optionally restricted to one status.
    async fn list(&self, status: Option<AppointmentStatus>) -> BookingResult<Vec<Appointment>>;

    /// Applies `update` atomically with a check of the current status.
    ///
    /// Fails with `Conflict` when the appointment has left every status in
    /// [`AppointmentUpdate::allowed_from`] or when the move would make it
    /// hold a slot someone else already holds.
    async fn update(&self, id: Uuid, update: AppointmentUpdate) -> BookingResult<Appointment>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, notification: NewNotification) -> BookingResult<Notification>;

    /// Newest first; `deleted` selects the trash instead of the inbox.
    async fn list_for_user(&self, user_id: Uuid, deleted: bool) -> BookingResult<Vec<Notification>>;

    /// Returns `false` when no notification with that id belongs to the user.
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> BookingResult<bool>;

    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> BookingResult<bool>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn record(&self, entry: NewAuditEntry) -> BookingResult<AuditEntry>;

    async fn recent(&self, limit: i64) -> BookingResult<Vec<AuditEntry>>;
}

/// Credential issuance and verification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn register(&self, email: &str, password: &str, display_name: &str) -> BookingResult<User>;

    /// Fails with `Authentication` on unknown email or wrong password.
    async fn login(&self, email: &str, password: &str) -> BookingResult<Session>;

    /// Fails with `Authentication` when the token is unknown or expired.
    async fn verify_token(&self, token: &str) -> BookingResult<Caller>;

    /// Issues a fresh one-time code for a password reset, replacing any
    /// outstanding one. Fails with `NotFound` for an unknown email.
    async fn issue_otp(&self, email: &str) -> BookingResult<(User, String)>;

    async fn verify_otp(&self, email: &str, code: &str) -> BookingResult<bool>;

    /// Consumes a valid code and sets the new password.
    async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> BookingResult<()>;
}
