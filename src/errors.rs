//! Unified error type for the donation desk.
//!
//! Local failures (validation, address resolution, wizard misuse) block a state
//! transition and never reach the store. Backend failures come from SeaORM and are
//! reported to users as one generic message.

use crate::core::wizard::WizardStep;
use crate::models::RequestStatus;
use thiserror::Error;

/// Generic message shown for every backend failure.
pub const BACKEND_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// All errors produced by the crate
#[derive(Debug, Error)]
pub enum Error {
    /// A required field is missing or malformed
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// The resolved shipping snapshot lacks required fields
    #[error("Incomplete shipping information, missing: {}", missing.join(", "))]
    IncompleteShippingInfo {
        /// Every required field that was empty
        missing: Vec<&'static str>,
    },

    /// A saved address must be selected but none (or a stale one) is
    #[error("No saved address is selected")]
    MissingAddressSelection,

    /// The wizard cannot perform `action` from `step`
    #[error("Cannot {action} while in step {step:?}")]
    InvalidStep {
        /// Current wizard step
        step: WizardStep,
        /// Attempted operation
        action: &'static str,
    },

    /// A request status change outside the allowed transition table
    #[error("Cannot move request from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: RequestStatus,
        /// Requested status
        to: RequestStatus,
    },

    /// No user is signed in
    #[error("You must be signed in")]
    NotAuthenticated,

    /// The signed-in user lacks the admin role
    #[error("Administrator access required")]
    Unauthorized,

    /// A destructive operation was invoked without interactive confirmation
    #[error("This action must be confirmed first")]
    ConfirmationRequired,

    /// A row that should exist does not
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind (e.g. "donation item")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// A stored row failed validation when parsed into a domain value
    #[error("Invalid row in {table}: {message}")]
    InvalidRow {
        /// Source table
        table: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// The identity provider rejected an operation
    #[error("Identity provider error: {message}")]
    Identity {
        /// Provider message
        message: String,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Store failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl Error {
    /// Shorthand for a [`Error::Validation`].
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// True for failures detected before any store call.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::IncompleteShippingInfo { .. }
                | Self::MissingAddressSelection
                | Self::InvalidStep { .. }
                | Self::InvalidTransition { .. }
                | Self::NotAuthenticated
                | Self::Unauthorized
                | Self::ConfirmationRequired
        )
    }

    /// The single message a user sees for this error.
    ///
    /// Local errors keep their own text. Everything that came back from the store or
    /// the identity provider collapses into [`BACKEND_FAILURE_MESSAGE`].
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::IncompleteShippingInfo { .. } => {
                "Please fill in all required shipping fields".to_string()
            }
            Self::MissingAddressSelection => "Please select a shipping address".to_string(),
            Self::Identity { message } => message.clone(),
            e if e.is_local() => e.to_string(),
            _ => BACKEND_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_render_generic_message() {
        let err = Error::Database(sea_orm::DbErr::Custom("connection reset".to_string()));
        assert!(!err.is_local());
        assert_eq!(err.user_message(), BACKEND_FAILURE_MESSAGE);

        let err = Error::not_found("donation item", 7);
        assert_eq!(err.user_message(), BACKEND_FAILURE_MESSAGE);
    }

    #[test]
    fn test_local_errors_keep_their_text() {
        let err = Error::validation("item name", "cannot be empty");
        assert!(err.is_local());
        assert_eq!(err.user_message(), "Invalid item name: cannot be empty");

        let err = Error::IncompleteShippingInfo {
            missing: vec!["phone", "city"],
        };
        assert_eq!(
            err.to_string(),
            "Incomplete shipping information, missing: phone, city"
        );
    }
}
