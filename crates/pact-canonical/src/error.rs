use thiserror::Error;

/// Errors from canonical serialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("non-finite number cannot be canonicalized")]
    NonFiniteNumber,
}
