//! Route tables, one module per API area. Each returns a router over the
//! shared [`ApiState`](crate::ApiState) that `app` merges together.

pub mod admin;
pub mod appointment;
pub mod auth;
pub mod availability;
pub mod health;
pub mod notification;
pub mod service;
