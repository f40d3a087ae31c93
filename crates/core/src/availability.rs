use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::models::appointment::AppointmentStatus;
use crate::models::service::Service;
use crate::models::working_hours::WorkingHoursConfig;
use crate::schedule::{self, SlotAvailability};
use crate::store::{AppointmentStore, ServiceStore, WorkingHoursStore};

/// Stored working hours, or the standard week when none were saved.
pub async fn working_hours_or_default(
    store: &dyn WorkingHoursStore,
) -> BookingResult<WorkingHoursConfig> {
    Ok(store.get().await?.unwrap_or_else(WorkingHoursConfig::standard))
}

/// Times on `date` already held by a blocking appointment.
pub async fn booked_slots(
    store: &dyn AppointmentStore,
    date: NaiveDate,
) -> BookingResult<BTreeSet<String>> {
    let appointments = store.query(date, &AppointmentStatus::BLOCKING).await?;
    Ok(appointments
        .into_iter()
        .map(|appointment| appointment.appointment_time)
        .collect())
}

/// Availability of an already loaded service on `date`.
pub async fn availability_for_service(
    working_hours: &dyn WorkingHoursStore,
    appointments: &dyn AppointmentStore,
    service: &Service,
    date: NaiveDate,
) -> BookingResult<SlotAvailability> {
    let config = working_hours_or_default(working_hours).await?;

    let Some(day) = schedule::resolve_day(&config, date) else {
        debug!(%date, "working hours closed, no slots");
        return Ok(SlotAvailability::default());
    };
    let generated = schedule::slots_for_day(day, i64::from(service.duration_minutes))?;

    let booked = booked_slots(appointments, date).await?;
    let available_slots = schedule::filter_available(generated, &booked);

    debug!(
        %date,
        service_id = %service.id,
        available = available_slots.len(),
        booked = booked.len(),
        "computed slot availability"
    );

    Ok(SlotAvailability {
        available_slots,
        booked_slots: booked.into_iter().collect(),
    })
}

/// Bookable start times for `service_id` on `date`.
///
/// Both parameters are checked before any store is consulted. An empty one
/// is a validation failure; an id that is not a UUID cannot name a stored
/// service and is reported as not found.
pub async fn available_slots(
    working_hours: &dyn WorkingHoursStore,
    services: &dyn ServiceStore,
    appointments: &dyn AppointmentStore,
    date: &str,
    service_id: &str,
) -> BookingResult<SlotAvailability> {
    if date.trim().is_empty() || service_id.trim().is_empty() {
        return Err(BookingError::Validation(
            "Date and serviceId are required".to_string(),
        ));
    }
    let date = schedule::parse_date(date)?;
    let service_id = Uuid::parse_str(service_id.trim())
        .map_err(|_| BookingError::NotFound("Service not found".to_string()))?;

    let service = services
        .get(service_id)
        .await?
        .ok_or_else(|| BookingError::NotFound("Service not found".to_string()))?;

    availability_for_service(working_hours, appointments, &service, date).await
}
