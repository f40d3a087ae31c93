use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BookingError;
use crate::models::service::DiscountKind;

/// Lifecycle of a booking.
///
/// `pending -> pending_verification -> approved | rejected`, then
/// `approved -> completed`. `rejected` and `completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    PendingVerification,
    Approved,
    Rejected,
    Completed,
}

impl AppointmentStatus {
    /// Statuses whose appointments hold their slot against re-booking.
    ///
    /// `PendingVerification` is deliberately absent: a slot whose booking is
    /// awaiting receipt review can be claimed again.
    pub const BLOCKING: [AppointmentStatus; 2] =
        [AppointmentStatus::Pending, AppointmentStatus::Approved];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::PendingVerification => "pending_verification",
            AppointmentStatus::Approved => "approved",
            AppointmentStatus::Rejected => "rejected",
            AppointmentStatus::Completed => "completed",
        }
    }

    pub fn occupies_slot(&self) -> bool {
        Self::BLOCKING.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Rejected | AppointmentStatus::Completed)
    }

    /// Legal moves of the state machine. Re-uploading a receipt while
    /// awaiting verification keeps the appointment in place.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;

        matches!(
            (self, next),
            (Pending, PendingVerification)
                | (PendingVerification, PendingVerification)
                | (PendingVerification, Approved)
                | (PendingVerification, Rejected)
                | (Approved, Completed)
        )
    }

    pub fn transition_to(self, next: AppointmentStatus) -> Result<AppointmentStatus, BookingError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(BookingError::Validation(format!(
                "Cannot move appointment from {} to {}",
                self, next
            )))
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "pending_verification" => Ok(AppointmentStatus::PendingVerification),
            "approved" => Ok(AppointmentStatus::Approved),
            "rejected" => Ok(AppointmentStatus::Rejected),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(BookingError::Validation(format!(
                "Unknown appointment status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    pub make: String,
    pub model: String,
    pub year: String,
    pub plate_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: f64,
    pub savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub method: String,
    pub amount: f64,
    pub original_amount: f64,
    pub discount: Option<AppliedDiscount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestOutcome {
    Passed,
    Failed,
}

impl TestOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TestOutcome::Passed => "PASSED",
            TestOutcome::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionTestResult {
    pub co2_level: f64,
    pub smoke_opacity: f64,
    pub result: TestOutcome,
    pub remarks: Option<String>,
}

impl EmissionTestResult {
    pub fn validate(&self) -> Result<(), BookingError> {
        if !self.co2_level.is_finite() || self.co2_level < 0.0 {
            return Err(BookingError::Validation("CO2 level must be a non-negative number".to_string()));
        }
        if !self.smoke_opacity.is_finite() || self.smoke_opacity < 0.0 {
            return Err(BookingError::Validation(
                "Smoke opacity must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub user_name: String,
    pub service_id: Uuid,
    pub service_name: String,
    pub vehicle_info: VehicleInfo,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub payment_details: PaymentDetails,
    pub notes: String,
    pub status: AppointmentStatus,
    pub receipt_base64: Option<String>,
    pub emission_test_result: Option<EmissionTestResult>,
    pub rejection_reason: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_by: Option<Uuid>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Fields written when a booking is first stored; it always starts `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub user_id: Uuid,
    pub user_email: String,
    pub user_name: String,
    pub service_id: Uuid,
    pub service_name: String,
    pub vehicle_info: VehicleInfo,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub payment_details: PaymentDetails,
    pub notes: String,
}

/// A status change together with the fields that travel with it.
#[derive(Debug, Clone, PartialEq)]
pub enum AppointmentUpdate {
    ReceiptUploaded {
        receipt_base64: String,
    },
    Approved {
        by: Uuid,
        at: DateTime<Utc>,
        result: Option<EmissionTestResult>,
    },
    Rejected {
        by: Uuid,
        at: DateTime<Utc>,
        reason: String,
    },
    Completed {
        result: EmissionTestResult,
    },
}

impl AppointmentUpdate {
    pub fn status(&self) -> AppointmentStatus {
        match self {
            AppointmentUpdate::ReceiptUploaded { .. } => AppointmentStatus::PendingVerification,
            AppointmentUpdate::Approved { .. } => AppointmentStatus::Approved,
            AppointmentUpdate::Rejected { .. } => AppointmentStatus::Rejected,
            AppointmentUpdate::Completed { .. } => AppointmentStatus::Completed,
        }
    }

    /// Statuses an appointment may be in for this update to apply.
    pub fn allowed_from(&self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentUpdate::ReceiptUploaded { .. } => {
                &[AppointmentStatus::Pending, AppointmentStatus::PendingVerification]
            }
            AppointmentUpdate::Approved { .. } | AppointmentUpdate::Rejected { .. } => {
                &[AppointmentStatus::PendingVerification]
            }
            AppointmentUpdate::Completed { .. } => &[AppointmentStatus::Approved],
        }
    }

    /// Applies the update to an in-memory record.
    pub fn apply(self, appointment: &mut Appointment, now: DateTime<Utc>) {
        appointment.status = self.status();
        appointment.updated_at = now;
        match self {
            AppointmentUpdate::ReceiptUploaded { receipt_base64 } => {
                appointment.receipt_base64 = Some(receipt_base64);
            }
            AppointmentUpdate::Approved { by, at, result } => {
                appointment.approved_by = Some(by);
                appointment.approved_at = Some(at);
                appointment.emission_test_result = result;
            }
            AppointmentUpdate::Rejected { by, at, reason } => {
                appointment.rejected_by = Some(by);
                appointment.rejected_at = Some(at);
                appointment.rejection_reason = Some(reason);
            }
            AppointmentUpdate::Completed { result } => {
                appointment.emission_test_result = Some(result);
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub service_id: Uuid,
    pub vehicle_info: VehicleInfo,
    pub appointment_date: String,
    pub appointment_time: String,
    pub payment_method: String,
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    pub fn validate(&self) -> Result<(), BookingError> {
        let vehicle = &self.vehicle_info;
        if vehicle.plate_number.trim().is_empty() {
            return Err(BookingError::Validation("Vehicle plate number is required".to_string()));
        }
        if vehicle.make.trim().is_empty() || vehicle.model.trim().is_empty() {
            return Err(BookingError::Validation("Vehicle make and model are required".to_string()));
        }
        if self.payment_method.trim().is_empty() {
            return Err(BookingError::Validation("Payment method is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentResponse {
    pub appointment_id: Uuid,
    pub amount: f64,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceiptRequest {
    pub receipt_base64: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAppointmentRequest {
    pub emission_test_result: Option<EmissionTestResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectAppointmentRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResultRequest {
    pub emission_test_result: EmissionTestResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentActionResponse {
    pub id: Uuid,
    pub status: AppointmentStatus,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub completed: usize,
}

impl DashboardStats {
    /// Tallies statuses; `pending` counts both pending stages.
    pub fn tally<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = AppointmentStatus>,
    {
        let mut stats = DashboardStats::default();
        for status in statuses {
            stats.total += 1;
            match status {
                AppointmentStatus::Pending | AppointmentStatus::PendingVerification => {
                    stats.pending += 1
                }
                AppointmentStatus::Approved => stats.approved += 1,
                AppointmentStatus::Rejected => stats.rejected += 1,
                AppointmentStatus::Completed => stats.completed += 1,
            }
        }
        stats
    }
}
