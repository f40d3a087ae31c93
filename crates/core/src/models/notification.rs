use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Approved,
    Rejected,
    Completed,
    Reminder,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Approved => "approved",
            NotificationKind::Rejected => "rejected",
            NotificationKind::Completed => "completed",
            NotificationKind::Reminder => "reminder",
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(NotificationKind::Approved),
            "rejected" => Ok(NotificationKind::Rejected),
            "completed" => Ok(NotificationKind::Completed),
            "reminder" => Ok(NotificationKind::Reminder),
            other => Err(format!("unknown notification type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub appointment_id: Option<Uuid>,
    pub read: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub appointment_id: Option<Uuid>,
}

pub fn appointment_approved_message(service_name: &str, date: NaiveDate, time: &str) -> String {
    format!(
        "Your appointment for {} on {} at {} has been approved!",
        service_name, date, time
    )
}

pub fn appointment_rejected_message(service_name: &str, reason: &str) -> String {
    format!(
        "Your appointment for {} was rejected. Reason: {}",
        service_name, reason
    )
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub deleted: bool,
}
