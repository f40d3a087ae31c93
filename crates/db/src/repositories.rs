pub mod appointment;
pub mod audit;
pub mod notification;
pub mod service;
pub mod setting;
pub mod user;

/// True when the report wraps a Postgres unique-constraint violation.
pub fn is_unique_violation(err: &eyre::Report) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|err| err.as_database_error())
        .is_some_and(|err| err.is_unique_violation())
}
