//! Error type shared by every persistence port.
//!
//! Adapters classify driver failures into these variants (unique and
//! foreign-key violations already translated into user-facing messages), and
//! services convert them into domain [`Error`]s with `?`.

use tracing::{error, warn};

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Persistence failures raised by repository adapters.
    pub enum RepositoryError {
        /// No connection could be obtained.
        Connection { message: String } => "repository connection failed: {message}",
        /// Query or mutation failed for an unclassified reason.
        Query { message: String } => "repository query failed: {message}",
        /// A uniqueness rule or a restricting reference blocked the write.
        Conflict { message: String } => "{message}",
        /// The write referenced a row that does not exist.
        MissingReference { message: String } => "{message}",
        /// A check or not-null rule rejected the values.
        ConstraintViolation { message: String } => "{message}",
        /// Serialization failure or deadlock; the statement may be retried.
        Retryable { message: String } => "transient repository failure: {message}",
    }
}

impl From<RepositoryError> for Error {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Connection { message } => {
                error!(%message, "database connection failed");
                Self::service_unavailable("database unavailable, please retry")
            }
            RepositoryError::Retryable { message } => {
                warn!(%message, "transient database failure");
                Self::service_unavailable("temporary database conflict, please retry")
            }
            RepositoryError::Query { message } => {
                error!(%message, "database query failed");
                Self::internal(format!("database query failed: {message}"))
            }
            RepositoryError::Conflict { message } => Self::conflict(message),
            RepositoryError::MissingReference { message } => Self::not_found(message),
            RepositoryError::ConstraintViolation { message } => Self::invalid_request(message),
        }
    }
}
