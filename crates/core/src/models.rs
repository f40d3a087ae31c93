pub mod appointment;
pub mod audit;
pub mod notification;
pub mod service;
pub mod user;
pub mod working_hours;
