use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BookingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

impl std::str::FromStr for DiscountKind {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountKind::Percentage),
            "fixed" => Ok(DiscountKind::Fixed),
            _ => Err(BookingError::Validation(
                "Invalid discount type. Must be \"percentage\" or \"fixed\"".to_string(),
            )),
        }
    }
}

/// The reduction a discount grants, tagged by its `type` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DiscountAmount {
    Percentage { value: f64 },
    Fixed { value: f64 },
}

impl DiscountAmount {
    pub fn new(kind: DiscountKind, value: f64) -> Self {
        match kind {
            DiscountKind::Percentage => DiscountAmount::Percentage { value },
            DiscountKind::Fixed => DiscountAmount::Fixed { value },
        }
    }

    pub fn kind(&self) -> DiscountKind {
        match self {
            DiscountAmount::Percentage { .. } => DiscountKind::Percentage,
            DiscountAmount::Fixed { .. } => DiscountKind::Fixed,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            DiscountAmount::Percentage { value } | DiscountAmount::Fixed { value } => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    #[serde(flatten)]
    pub amount: DiscountAmount,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Discount {
    /// Percentage values live in `[0, 100]`, fixed values are non-negative.
    pub fn validate(&self) -> Result<(), BookingError> {
        let value = self.amount.value();
        if !value.is_finite() {
            return Err(BookingError::Validation(
                "Discount value must be a number".to_string(),
            ));
        }
        if let DiscountAmount::Percentage { value } = self.amount {
            if !(0.0..=100.0).contains(&value) {
                return Err(BookingError::Validation(
                    "Percentage discount must be between 0 and 100".to_string(),
                ));
            }
        }
        if value < 0.0 {
            return Err(BookingError::Validation(
                "Discount value cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the discount is switched on and not past its expiry at `now`.
    pub fn applies_at(&self, now: DateTime<Utc>) -> bool {
        self.active && self.expires_at.is_none_or(|expires_at| expires_at >= now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
    pub discount: Option<Discount>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
}

impl NewService {
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.name.trim().is_empty() {
            return Err(BookingError::Validation("Service name is required".to_string()));
        }
        if self.duration_minutes <= 0 {
            return Err(BookingError::Validation(
                "Service duration must be a positive number of minutes".to_string(),
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(BookingError::Validation(
                "Service price cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDiscountRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
    pub active: Option<bool>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl UpdateDiscountRequest {
    /// Builds the stored discount, rejecting unknown types and out-of-range values.
    pub fn into_discount(self, now: DateTime<Utc>) -> Result<Discount, BookingError> {
        let kind: DiscountKind = self.kind.parse()?;
        let discount = Discount {
            amount: DiscountAmount::new(kind, self.value),
            active: self.active.unwrap_or(true),
            expires_at: self.expires_at,
            updated_at: Some(now),
        };
        discount.validate()?;
        Ok(discount)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    #[serde(flatten)]
    pub service: Service,
    pub effective_price: f64,
}
