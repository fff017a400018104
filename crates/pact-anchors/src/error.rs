use thiserror::Error;

/// Registry-side errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("anchor not found: {anchor_id}")]
    AnchorNotFound { anchor_id: String },

    #[error("duplicate anchor {existing_anchor_id} for this (subject, type, method, fingerprint)")]
    DuplicateAnchor { existing_anchor_id: String },

    #[error("payload is missing account_id_fingerprint")]
    MissingFingerprint,

    #[error("fingerprint must be sha256:<hex>, got {value}")]
    BadFingerprint { value: String },

    #[error("payload field {field} looks like raw identity material; only fingerprints are stored")]
    RawIdentityMaterial { field: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to persist store atomically: {0}")]
    Persist(String),
}
