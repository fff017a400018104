use thiserror::Error;

/// Errors from sealing or opening a pack.
///
/// Checksum, recompute and missing-file findings during re-verification
/// are not errors: they surface as `mismatches[]` in the report. Errors
/// here mean the operation itself could not run.
#[derive(Error, Debug)]
pub enum PackError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("transcript parse error: {0}")]
    Parse(#[from] pact_verifier::ParseError),

    #[error("constitution error: {0}")]
    Constitution(#[from] pact_constitution::ConstitutionError),

    #[error("canonicalization error: {0}")]
    Canonical(#[from] pact_canonical::CanonicalError),

    #[error("malformed pack entry {path}: {reason}")]
    MalformedEntry { path: String, reason: String },

    #[error("failed to persist pack atomically: {0}")]
    Persist(String),
}
