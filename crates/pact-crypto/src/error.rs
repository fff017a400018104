use thiserror::Error;

/// Errors from the crypto primitives.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid encoding")]
    InvalidEncoding,

    #[error("bad public key")]
    BadKey,

    #[error("bad signature")]
    BadSignature,
}
