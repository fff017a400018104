//! # pact-pack
//!
//! Seals auditor packs and re-verifies them byte-for-byte.
//!
//! A pack is a ZIP with a fixed layout: the source transcript, the
//! constitution in force, every derived artifact (GC view, judgment,
//! insurer summary, plus optional passport snapshot, contention report
//! and outcome events), a manifest, per-file SHA-256 checksums and a
//! README. Derived artifacts are canonical JSON, so re-verification can
//! recompute them from the embedded transcript and compare hashes.

mod artifacts;
mod error;
mod layout;
mod manifest;
mod reverify;
mod seal;

pub use artifacts::{build_contention_report, build_outcome_events, Derived};
pub use error::PackError;
pub use layout::{paths, REQUIRED_FILES};
pub use manifest::Manifest;
pub use reverify::{verify_pack, PackVerifyReport};
pub use seal::{seal_pack, SealOptions, SealOutcome};

/// Pack format version written into every manifest.
pub const PACKAGE_VERSION: &str = "auditor-pack/1.0";

/// Result alias for pack operations.
pub type Result<T> = std::result::Result<T, PackError>;
