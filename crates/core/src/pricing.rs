//! Effective price of a service at booking time.
//!
//! The result is not clamped: a fixed discount larger than the list price
//! yields a negative amount.

use chrono::{DateTime, Utc};

use crate::models::appointment::AppliedDiscount;
use crate::models::service::{Discount, DiscountAmount, Service, ServiceResponse};

/// List price after applying `discount`, if it is active and unexpired at `now`.
pub fn effective_price(price: f64, discount: Option<&Discount>, now: DateTime<Utc>) -> f64 {
    match discount {
        Some(discount) if discount.applies_at(now) => match discount.amount {
            DiscountAmount::Percentage { value } => price * (1.0 - value / 100.0),
            DiscountAmount::Fixed { value } => price - value,
        },
        _ => price,
    }
}

/// The discount actually applied to a booking, with the amount saved.
pub fn applied_discount(service: &Service, now: DateTime<Utc>) -> Option<AppliedDiscount> {
    let discount = service.discount.as_ref().filter(|d| d.applies_at(now))?;
    Some(AppliedDiscount {
        kind: discount.amount.kind(),
        value: discount.amount.value(),
        savings: service.price - effective_price(service.price, Some(discount), now),
    })
}

pub fn priced(service: Service, now: DateTime<Utc>) -> ServiceResponse {
    let effective_price = effective_price(service.price, service.discount.as_ref(), now);
    ServiceResponse {
        service,
        effective_price,
    }
}
