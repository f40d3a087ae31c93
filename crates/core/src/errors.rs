use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl BookingError {
    /// True for failures the caller can fix by changing the request.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, BookingError::Upstream(_) | BookingError::Internal(_))
    }
}

pub type BookingResult<T> = Result<T, BookingError>;

/// Failures of the slot generator and weekday resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("service duration must be positive, got {0} minutes")]
    InvalidDuration(i64),

    #[error("working window ends ({end}) before it starts ({start})")]
    InvalidWindow { start: String, end: String },

    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

impl From<ScheduleError> for BookingError {
    fn from(err: ScheduleError) -> Self {
        BookingError::Validation(err.to_string())
    }
}
