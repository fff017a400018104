use thiserror::Error;

/// Structural parse failures. Fatal to the operation: no report is
/// produced for a document that does not parse.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transcript is not a JSON object")]
    NotAnObject,

    #[error("missing required field: {path}")]
    MissingField { path: String },

    #[error("invalid field {path}: {reason}")]
    InvalidField { path: String, reason: String },

    #[error("rounds must be a non-empty array")]
    EmptyRounds,

    #[error("duplicate round_number {round_number}")]
    DuplicateRoundNumber { round_number: u64 },

    #[error("round_number sequence is not strictly increasing at index {index}")]
    NonMonotonicRoundNumber { index: usize },
}
