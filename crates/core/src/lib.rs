//! # SmokeCheck Core
//!
//! Domain types and booking rules for the smoke-emission test booking
//! service: the slot availability engine, discount pricing, the appointment
//! status machine and the store traits the rest of the workspace implements.

pub mod availability;
pub mod booking;
pub mod errors;
pub mod models;
pub mod pricing;
pub mod schedule;
pub mod store;

pub use booking::Stores;
pub use errors::{BookingError, BookingResult};
