pub mod admin;
pub mod appointment;
pub mod auth;
pub mod availability;
pub mod notification;
pub mod service;
