//! # Booking Workflow
//!
//! Creation of appointments and the status transitions administrators and
//! customers drive. Notification and audit records written after a
//! transition are best-effort: their failures are logged and the transition
//! still succeeds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::availability;
use crate::errors::{BookingError, BookingResult};
use crate::models::{
    appointment::{
        Appointment, AppointmentUpdate, CreateAppointmentRequest,
        EmissionTestResult, NewAppointment, PaymentDetails,
    },
    audit::{AuditAction, AuditTarget, NewAuditEntry},
    notification::{
        NewNotification, NotificationKind, appointment_approved_message,
        appointment_rejected_message,
    },
    user::Caller,
};
use crate::pricing;
use crate::schedule;
use crate::store::{AppointmentStore, AuditStore, NotificationStore, ServiceStore, WorkingHoursStore};

/// Handles to every document store the workflow touches.
#[derive(Clone)]
pub struct Stores {
    pub working_hours: Arc<dyn WorkingHoursStore>,
    pub services: Arc<dyn ServiceStore>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub audit: Arc<dyn AuditStore>,
}

fn appointment_not_found() -> BookingError {
    BookingError::NotFound("Appointment not found".to_string())
}

/// Loads an appointment the caller is allowed to see.
pub async fn visible_appointment(stores: &Stores, caller: &Caller, id: Uuid) -> BookingResult<Appointment> {
    let appointment = stores
        .appointments
        .get(id)
        .await?
        .ok_or_else(appointment_not_found)?;

    if !caller.can_view(&appointment) {
        return Err(BookingError::Authorization("Access denied".to_string()));
    }
    Ok(appointment)
}

/// Books a slot for the caller at the service's effective price.
///
/// The requested time must be one of the currently available slots. The
/// check and the write are not atomic; the store reports a concurrent
/// booking of the same slot as `Conflict`.
pub async fn book_appointment(
    stores: &Stores,
    caller: &Caller,
    request: CreateAppointmentRequest,
    now: DateTime<Utc>,
) -> BookingResult<Appointment> {
    request.validate()?;
    let date = schedule::parse_date(&request.appointment_date)?;
    let time = schedule::format_time_of_day(schedule::parse_time_of_day(&request.appointment_time)?);

    let service = stores
        .services
        .get(request.service_id)
        .await?
        .ok_or_else(|| BookingError::NotFound("Service not found".to_string()))?;

    let availability = availability::availability_for_service(
        stores.working_hours.as_ref(),
        stores.appointments.as_ref(),
        &service,
        date,
    )
    .await?;
    if !availability.available_slots.contains(&time) {
        return Err(BookingError::Conflict(format!(
            "The {} slot on {} is not available",
            time, date
        )));
    }

    let payment_details = PaymentDetails {
        method: request.payment_method,
        amount: pricing::effective_price(service.price, service.discount.as_ref(), now),
        original_amount: service.price,
        discount: pricing::applied_discount(&service, now),
    };

    let appointment = stores
        .appointments
        .create(NewAppointment {
            user_id: caller.user_id,
            user_email: caller.email.clone(),
            user_name: caller.display_name.clone(),
            service_id: service.id,
            service_name: service.name,
            vehicle_info: request.vehicle_info,
            appointment_date: date,
            appointment_time: time,
            payment_details,
            notes: request.notes.unwrap_or_default(),
        })
        .await?;

    info!(
        appointment_id = %appointment.id,
        user_id = %caller.user_id,
        date = %appointment.appointment_date,
        time = %appointment.appointment_time,
        "appointment booked"
    );
    Ok(appointment)
}

/// Attaches the payment receipt and moves the booking to verification.
/// Only the owner may upload.
pub async fn upload_receipt(
    stores: &Stores,
    caller: &Caller,
    id: Uuid,
    receipt_base64: String,
) -> BookingResult<Appointment> {
    if receipt_base64.trim().is_empty() {
        return Err(BookingError::Validation("Receipt is required".to_string()));
    }

    let appointment = stores
        .appointments
        .get(id)
        .await?
        .ok_or_else(appointment_not_found)?;
    if !appointment.is_owned_by(caller.user_id) {
        return Err(BookingError::Authorization("Access denied".to_string()));
    }

    let update = AppointmentUpdate::ReceiptUploaded { receipt_base64 };
    appointment.status.transition_to(update.status())?;
    stores.appointments.update(id, update).await
}

pub async fn approve(
    stores: &Stores,
    admin: &Caller,
    id: Uuid,
    result: Option<EmissionTestResult>,
    now: DateTime<Utc>,
) -> BookingResult<Appointment> {
    admin.require_admin()?;
    if let Some(result) = &result {
        result.validate()?;
    }

    let appointment = transition(
        stores,
        id,
        AppointmentUpdate::Approved {
            by: admin.user_id,
            at: now,
            result,
        },
    )
    .await?;

    notify(
        stores,
        NewNotification {
            user_id: appointment.user_id,
            kind: NotificationKind::Approved,
            message: appointment_approved_message(
                &appointment.service_name,
                appointment.appointment_date,
                &appointment.appointment_time,
            ),
            appointment_id: Some(appointment.id),
        },
    )
    .await;
    audit(
        stores,
        admin,
        AuditAction::ApprovedAppointment,
        &appointment,
        json!({ "serviceName": appointment.service_name }),
    )
    .await;

    Ok(appointment)
}

pub async fn reject(
    stores: &Stores,
    admin: &Caller,
    id: Uuid,
    reason: String,
    now: DateTime<Utc>,
) -> BookingResult<Appointment> {
    admin.require_admin()?;
    let reason = reason.trim().to_string();
    if reason.is_empty() {
        return Err(BookingError::Validation("Rejection reason is required".to_string()));
    }

    let appointment = transition(
        stores,
        id,
        AppointmentUpdate::Rejected {
            by: admin.user_id,
            at: now,
            reason: reason.clone(),
        },
    )
    .await?;

    notify(
        stores,
        NewNotification {
            user_id: appointment.user_id,
            kind: NotificationKind::Rejected,
            message: appointment_rejected_message(&appointment.service_name, &reason),
            appointment_id: Some(appointment.id),
        },
    )
    .await;
    audit(
        stores,
        admin,
        AuditAction::RejectedAppointment,
        &appointment,
        json!({ "reason": reason, "serviceName": appointment.service_name }),
    )
    .await;

    Ok(appointment)
}

/// Stores the emission test result and completes the appointment.
/// No customer notification is sent for this step.
pub async fn record_result(
    stores: &Stores,
    admin: &Caller,
    id: Uuid,
    result: EmissionTestResult,
) -> BookingResult<Appointment> {
    admin.require_admin()?;
    result.validate()?;

    let outcome = result.result;
    let appointment = transition(stores, id, AppointmentUpdate::Completed { result }).await?;

    audit(
        stores,
        admin,
        AuditAction::EnteredResults,
        &appointment,
        json!({ "result": outcome }),
    )
    .await;

    Ok(appointment)
}

async fn transition(stores: &Stores, id: Uuid, update: AppointmentUpdate) -> BookingResult<Appointment> {
    let current = stores
        .appointments
        .get(id)
        .await?
        .ok_or_else(appointment_not_found)?;
    current.status.transition_to(update.status())?;

    let updated = stores.appointments.update(id, update).await?;
    info!(
        appointment_id = %id,
        from = %current.status,
        to = %updated.status,
        "appointment status changed"
    );
    Ok(updated)
}

async fn notify(stores: &Stores, notification: NewNotification) {
    let user_id = notification.user_id;
    if let Err(err) = stores.notifications.create(notification).await {
        warn!(%user_id, error = %err, "failed to create notification");
    }
}

async fn audit(
    stores: &Stores,
    admin: &Caller,
    action: AuditAction,
    appointment: &Appointment,
    details: serde_json::Value,
) {
    let entry = NewAuditEntry {
        admin_id: admin.user_id,
        admin_email: admin.email.clone(),
        action,
        target_type: AuditTarget::Appointment,
        target_id: appointment.id.to_string(),
        details,
    };
    record_audit(stores.audit.as_ref(), entry).await;
}

/// Writes an audit entry, logging instead of failing when the store is down.
pub async fn record_audit(store: &dyn AuditStore, entry: NewAuditEntry) {
    let action = entry.action;
    if let Err(err) = store.record(entry).await {
        warn!(action = action.as_str(), error = %err, "failed to write audit log");
    }
}
