use thiserror::Error;

/// Errors from constitution handling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstitutionError {
    #[error("unknown constitution hash: {hash}")]
    UnknownHash { hash: String },
}
