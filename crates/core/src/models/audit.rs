use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ApprovedAppointment,
    RejectedAppointment,
    EnteredResults,
    CreatedService,
    UpdatedDiscount,
    RemovedDiscount,
    UpdatedWorkingHours,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ApprovedAppointment => "approved_appointment",
            AuditAction::RejectedAppointment => "rejected_appointment",
            AuditAction::EnteredResults => "entered_results",
            AuditAction::CreatedService => "created_service",
            AuditAction::UpdatedDiscount => "updated_discount",
            AuditAction::RemovedDiscount => "removed_discount",
            AuditAction::UpdatedWorkingHours => "updated_working_hours",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditTarget {
    Appointment,
    Service,
    Settings,
}

impl AuditTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditTarget::Appointment => "appointment",
            AuditTarget::Service => "service",
            AuditTarget::Settings => "settings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub admin_email: String,
    pub action: String,
    pub target_type: String,
    pub target_id: String,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditEntry {
    pub admin_id: Uuid,
    pub admin_email: String,
    pub action: AuditAction,
    pub target_type: AuditTarget,
    pub target_id: String,
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}
