//! # pact-anchors
//!
//! The anchor registry: issuer-signed attestations about signer public
//! keys. The registry never stores raw identity material; payloads carry
//! `sha256:<hex>` fingerprints only. `issue` and `revoke` serialize per
//! subject through the registry's single writer; reads see a consistent
//! snapshot.

mod error;
mod registry;
mod store;

pub use error::RegistryError;
pub use registry::{verify_attestation, AnchorRegistry};
pub use store::{load_store, save_store};

/// Result alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
