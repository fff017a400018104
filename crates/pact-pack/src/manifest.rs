//! The pack manifest.

use serde::{Deserialize, Serialize};

use pact_types::{ExecutiveSummary, Integrity, Responsibility};

/// `manifest.json`: provenance of the pack plus echoed derivation
/// headlines for quick triage without opening the derived files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub package_version: String,
    pub created_at_ms: i64,
    pub constitution_version: String,
    pub constitution_hash: String,

    /// Set when the pack was sealed with a rulebook outside the accepted
    /// set. Re-verification reports it.
    #[serde(default)]
    pub nonstandard_constitution: bool,

    pub transcript_id: String,

    /// SHA-256 of the canonical transcript document.
    pub transcript_hash: String,

    pub tool_version: String,
    pub included_artifacts: Vec<String>,

    pub integrity: Integrity,
    pub outcome: ExecutiveSummary,
    pub responsibility: Responsibility,
}
