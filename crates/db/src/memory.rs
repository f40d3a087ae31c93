//! In-process implementation of every store trait.
//!
//! Backs local runs without Postgres and the HTTP-level tests. Enforces the
//! same one-live-booking-per-slot rule as the Postgres slot index.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::info;
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

use crate::credentials::{self, IdentityConfig};

struct Account {
    user: User,
    password_hash: String,
}

struct OtpCode {
    code: String,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    working_hours: Option<WorkingHoursConfig>,
    services: HashMap<Uuid, Service>,
    appointments: HashMap<Uuid, Appointment>,
    notifications: HashMap<Uuid, Notification>,
    audit: Vec<AuditEntry>,
    accounts: HashMap<String, Account>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
    otps: HashMap<String, OtpCode>,
}

impl State {
    fn slot_held(&self, date: NaiveDate, time: &str, except: Option<Uuid>) -> bool {
        self.appointments.values().any(|appointment| {
            Some(appointment.id) != except
                && appointment.appointment_date == date
                && appointment.appointment_time == time
                && appointment.status.occupies_slot()
        })
    }

    fn account_by_id(&self, id: Uuid) -> Option<&Account> {
        self.accounts.values().find(|account| account.user.id == id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    identity: IdentityConfig,
}

fn slot_taken() -> BookingError {
    BookingError::Conflict("This time slot is already booked".to_string())
}

fn invalid_credentials() -> BookingError {
    BookingError::Authentication("Invalid email or password".to_string())
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
}

impl MemoryStore {
    pub fn new(identity: IdentityConfig) -> Self {
        Self {
            state: RwLock::default(),
            identity,
        }
    }

    /// Registers an account and grants it the administrator marker.
    pub async fn create_admin(&self, email: &str, password: &str, display_name: &str) -> BookingResult<User> {
        let user = self.register(email, password, display_name).await?;

        let mut state = self.state.write().await;
        let account = state
            .accounts
            .get_mut(&user.email)
            .ok_or_else(|| BookingError::NotFound("User not found".to_string()))?;
        account.user.is_admin = true;
        Ok(account.user.clone())
    }
}

#[async_trait]
impl WorkingHoursStore for MemoryStore {
    async fn get(&self) -> BookingResult<Option<WorkingHoursConfig>> {
        Ok(self.state.read().await.working_hours.clone())
    }

    async fn put(&self, config: &WorkingHoursConfig) -> BookingResult<()> {
        self.state.write().await.working_hours = Some(config.clone());
        Ok(())
    }
}

#[async_trait]
impl ServiceStore for MemoryStore {
    async fn list(&self) -> BookingResult<Vec<Service>> {
        let mut services: Vec<Service> = self.state.read().await.services.values().cloned().collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn get(&self, id: Uuid) -> BookingResult<Option<Service>> {
        Ok(self.state.read().await.services.get(&id).cloned())
    }

    async fn create(&self, service: NewService) -> BookingResult<Service> {
        let service = Service {
            id: Uuid::new_v4(),
            name: service.name,
            description: service.description,
            category: service.category,
            duration_minutes: service.duration_minutes,
            price: service.price,
            discount: None,
            created_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .services
            .insert(service.id, service.clone());
        Ok(service)
    }

    async fn set_discount(&self, id: Uuid, discount: Option<Discount>) -> BookingResult<bool> {
        let mut state = self.state.write().await;
        match state.services.get_mut(&id) {
            Some(service) => {
                service.discount = discount;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn query(
        &self,
        date: NaiveDate,
        statuses: &[AppointmentStatus],
    ) -> BookingResult<Vec<Appointment>> {
        let state = self.state.read().await;
        let mut appointments: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|appointment| {
                appointment.appointment_date == date && statuses.contains(&appointment.status)
            })
            .cloned()
            .collect();
        appointments.sort_by(|a, b| a.appointment_time.cmp(&b.appointment_time));
        Ok(appointments)
    }

    async fn create(&self, appointment: NewAppointment) -> BookingResult<Appointment> {
        let mut state = self.state.write().await;
        if state.slot_held(appointment.appointment_date, &appointment.appointment_time, None) {
            return Err(slot_taken());
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            user_id: appointment.user_id,
            user_email: appointment.user_email,
            user_name: appointment.user_name,
            service_id: appointment.service_id,
            service_name: appointment.service_name,
            vehicle_info: appointment.vehicle_info,
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time,
            payment_details: appointment.payment_details,
            notes: appointment.notes,
            status: AppointmentStatus::Pending,
            receipt_base64: None,
            emission_test_result: None,
            rejection_reason: None,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            created_at: now,
            updated_at: now,
        };
        state.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn get(&self, id: Uuid) -> BookingResult<Option<Appointment>> {
        Ok(self.state.read().await.appointments.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> BookingResult<Vec<Appointment>> {
        let state = self.state.read().await;
        let mut appointments: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|appointment| appointment.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut appointments, |appointment| appointment.created_at);
        Ok(appointments)
    }

    async fn list(&self, status: Option<AppointmentStatus>) -> BookingResult<Vec<Appointment>> {
        let state = self.state.read().await;
        let mut appointments: Vec<Appointment> = state
            .appointments
            .values()
            .filter(|appointment| status.is_none_or(|status| appointment.status == status))
            .cloned()
            .collect();
        newest_first(&mut appointments, |appointment| appointment.created_at);
        Ok(appointments)
    }

    async fn update(&self, id: Uuid, update: AppointmentUpdate) -> BookingResult<Appointment> {
        let mut state = self.state.write().await;
        let (date, time) = match state.appointments.get(&id) {
            Some(appointment) if !update.allowed_from().contains(&appointment.status) => {
                return Err(BookingError::Conflict(
                    "Appointment status changed concurrently".to_string(),
                ));
            }
            Some(appointment) => (appointment.appointment_date, appointment.appointment_time.clone()),
            None => return Err(BookingError::NotFound("Appointment not found".to_string())),
        };
        if update.status().occupies_slot() && state.slot_held(date, &time, Some(id)) {
            return Err(slot_taken());
        }

        let appointment = state
            .appointments
            .get_mut(&id)
            .ok_or_else(|| BookingError::NotFound("Appointment not found".to_string()))?;
        update.apply(appointment, Utc::now());
        Ok(appointment.clone())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, notification: NewNotification) -> BookingResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: notification.user_id,
            kind: notification.kind,
            message: notification.message,
            appointment_id: notification.appointment_id,
            read: false,
            deleted: false,
            created_at: Utc::now(),
        };
        self.state
            .write()
            .await
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn list_for_user(&self, user_id: Uuid, deleted: bool) -> BookingResult<Vec<Notification>> {
        let state = self.state.read().await;
        let mut notifications: Vec<Notification> = state
            .notifications
            .values()
            .filter(|notification| notification.user_id == user_id && notification.deleted == deleted)
            .cloned()
            .collect();
        newest_first(&mut notifications, |notification| notification.created_at);
        Ok(notifications)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> BookingResult<bool> {
        let mut state = self.state.write().await;
        match state.notifications.get_mut(&id) {
            Some(notification) if notification.user_id == user_id => {
                notification.read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn soft_delete(&self, id: Uuid, user_id: Uuid) -> BookingResult<bool> {
        let mut state = self.state.write().await;
        match state.notifications.get_mut(&id) {
            Some(notification) if notification.user_id == user_id => {
                notification.deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn record(&self, entry: NewAuditEntry) -> BookingResult<AuditEntry> {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            admin_id: entry.admin_id,
            admin_email: entry.admin_email,
            action: entry.action.as_str().to_string(),
            target_type: entry.target_type.as_str().to_string(),
            target_id: entry.target_id,
            details: entry.details,
            timestamp: Utc::now(),
        };
        self.state.write().await.audit.push(entry.clone());
        Ok(entry)
    }

    async fn recent(&self, limit: i64) -> BookingResult<Vec<AuditEntry>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let state = self.state.read().await;
        Ok(state.audit.iter().rev().take(limit).cloned().collect())
    }
}

#[async_trait]
impl IdentityProvider for MemoryStore {
    async fn register(&self, email: &str, password: &str, display_name: &str) -> BookingResult<User> {
        let email = credentials::normalize_email(email);
        validate_password(password)?;
        let password_hash = credentials::hash_password(password)?;

        let mut state = self.state.write().await;
        if state.accounts.contains_key(&email) {
            return Err(BookingError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.clone(),
            display_name: display_name.to_string(),
            is_admin: false,
            created_at: Utc::now(),
        };
        state.accounts.insert(
            email,
            Account {
                user: user.clone(),
                password_hash,
            },
        );
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> BookingResult<Session> {
        let email = credentials::normalize_email(email);
        let (user, password_hash) = {
            let state = self.state.read().await;
            let account = state.accounts.get(&email).ok_or_else(invalid_credentials)?;
            (account.user.clone(), account.password_hash.clone())
        };
        if !credentials::verify_password(password, &password_hash)? {
            return Err(invalid_credentials());
        }

        let token = credentials::generate_token();
        let now = Utc::now();
        let expires_at = now + self.identity.session_ttl;

        let mut state = self.state.write().await;
        state.sessions.retain(|_, (_, session_expiry)| *session_expiry > now);
        state.sessions.insert(token.clone(), (user.id, expires_at));

        Ok(Session {
            token,
            expires_at,
            user,
        })
    }

    async fn verify_token(&self, token: &str) -> BookingResult<Caller> {
        let state = self.state.read().await;
        state
            .sessions
            .get(token)
            .filter(|(_, expires_at)| *expires_at > Utc::now())
            .and_then(|(user_id, _)| state.account_by_id(*user_id))
            .map(|account| Caller::from(account.user.clone()))
            .ok_or_else(|| BookingError::Authentication("Invalid or expired token".to_string()))
    }

    async fn issue_otp(&self, email: &str) -> BookingResult<(User, String)> {
        let email = credentials::normalize_email(email);
        let mut state = self.state.write().await;
        let user = state
            .accounts
            .get(&email)
            .map(|account| account.user.clone())
            .ok_or_else(|| BookingError::NotFound("No account found for this email".to_string()))?;

        let code = credentials::generate_otp();
        state.otps.insert(
            email,
            OtpCode {
                code: code.clone(),
                expires_at: Utc::now() + self.identity.otp_ttl,
            },
        );
        Ok((user, code))
    }

    async fn verify_otp(&self, email: &str, code: &str) -> BookingResult<bool> {
        let email = credentials::normalize_email(email);
        let state = self.state.read().await;
        Ok(state
            .otps
            .get(&email)
            .is_some_and(|otp| otp.code == code.trim() && otp.expires_at > Utc::now()))
    }

    async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> BookingResult<()> {
        validate_password(new_password)?;
        if !self.verify_otp(email, code).await? {
            return Err(BookingError::Validation("Invalid or expired code".to_string()));
        }

        let email = credentials::normalize_email(email);
        let password_hash = credentials::hash_password(new_password)?;
        let mut state = self.state.write().await;
        let account = state
            .accounts
            .get_mut(&email)
            .ok_or_else(|| BookingError::NotFound("No account found for this email".to_string()))?;
        account.password_hash = password_hash;
        let user_id = account.user.id;

        state.otps.remove(&email);
        state.sessions.retain(|_, (session_user, _)| *session_user != user_id);
        Ok(())
    }
}
