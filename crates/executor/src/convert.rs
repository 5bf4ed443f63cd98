//! Error conversion from internal error types.
//!
//! This module provides conversions from internal population errors to
//! the executor's [`Error`] type.

use crate::Error;
use population_core::PopulationError;

/// Convert a PopulationError to an executor Error.
///
/// This preserves all error details while mapping to the appropriate
/// executor error variant.
impl From<PopulationError> for Error {
    fn from(err: PopulationError) -> Self {
        match err {
            PopulationError::AlreadyExists { id } => Error::AlreadyExists { id },

            PopulationError::NotFound { id } => Error::NotFound { id },

            PopulationError::Decode { message } => Error::Decode { reason: message },

            PopulationError::NotificationFailure { event, reason } => {
                Error::NotificationFailed { event, reason }
            }

            // Conflict errors (temporal failures)
            PopulationError::Conflict {
                key,
                read_version,
                current_version,
            } => Error::Conflict {
                reason: format!(
                    "key {} changed from version {} to {} before commit",
                    key, read_version, current_version
                ),
            },

            PopulationError::InvalidInput { message } => Error::InvalidInput { reason: message },

            PopulationError::Config { message } => Error::Config { reason: message },

            // System errors
            PopulationError::Storage { message, source } => {
                let reason = if let Some(ref src) = source {
                    format!("{}: {}", message, src)
                } else {
                    message
                };
                Error::Io { reason }
            }

            PopulationError::Corruption { message } => Error::Io {
                reason: format!("Data corruption: {}", message),
            },
        }
    }
}

/// Convert a population_core::PopulationResult to an executor Result.
pub fn convert_result<T>(result: population_core::PopulationResult<T>) -> crate::Result<T> {
    result.map_err(Error::from)
}
