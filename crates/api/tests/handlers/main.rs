//! HTTP-level tests for the API, run against the in-memory store.

mod admin_test;
mod appointment_test;
mod auth_test;
mod availability_test;
mod health_test;
mod notification_test;
mod test_utils;
