//! Error handling
use thiserror::Error;

/// Primary error type.
///
/// Some members of this enum implement ``From``
/// in order to redirect other error types.
#[derive(Error, Debug, PartialEq)]
pub enum AsgError {
    /// A model parameter is out of range.
    #[error("invalid value for {name}: {value}")]
    InvalidParameter {
        /// The parameter name
        name: &'static str,
        /// The rejected value
        value: String,
    },

    /// Too many internal lineages to enumerate their types.
    #[error("{internal} internal lineages exceed the enumeration limit of {limit}")]
    EnumerationTooLarge {
        /// Number of internal lineages in the history
        internal: usize,
        /// The configured limit
        limit: usize,
    },

    /// A history refers to lineages in a way
    /// that the dual process cannot produce.
    #[error("inconsistent history at event {index}: {reason}")]
    InconsistentHistory {
        /// Position of the offending event
        index: usize,
        /// What went wrong
        reason: String,
    },

    /// A redirection of a [``asgsim_core::Error``]
    #[error("{value:?}")]
    CoreError {
        /// The redirected error
        #[from]
        value: asgsim_core::Error,
    },

    /// A redirection of a [``asgsim_genetics::Error``]
    #[error("{value}")]
    MutationError {
        /// The redirected error
        #[from]
        value: asgsim_genetics::Error,
    },
}

impl AsgError {
    pub(crate) fn invalid_parameter<T: std::fmt::Display>(name: &'static str, value: T) -> Self {
        AsgError::InvalidParameter {
            name,
            value: value.to_string(),
        }
    }

    pub(crate) fn inconsistent<T: Into<String>>(index: usize, reason: T) -> Self {
        AsgError::InconsistentHistory {
            index,
            reason: reason.into(),
        }
    }
}
