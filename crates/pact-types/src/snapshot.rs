//! Entity/reliability graph fused from transcripts and anchors.

use serde::{Deserialize, Serialize};

use crate::anchor::AnchorType;

/// Canonicalization mode for snapshot hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotMode {
    /// Normal canonicalization; already stable.
    #[default]
    Standard,
    /// Additionally sorts keys inside embedded raw values before hashing.
    Deterministic,
}

/// Per-domain metrics for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMetrics {
    /// Reliability in [0, 100], rounded to an integer before serialization.
    pub reliability_score: i64,
}

/// One scored domain on an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEntry {
    /// Domain id, e.g. `art:authenticity` or `api:weather`.
    pub domain_id: String,
    pub metrics: DomainMetrics,
}

/// Anchor badge attached to an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorBadge {
    pub anchor_id: String,
    pub anchor_type: AnchorType,
    pub revoked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// One entity in the snapshot graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntity {
    /// `entity-<sha256(canonical({signer_public_key_b58}))>`.
    pub entity_id: String,
    pub signer_public_key_b58: String,

    /// Identity-level reliability: 50 baseline, +5 with a live trust
    /// anchor, −10 per revoked anchor capped at −20.
    pub base_reliability: i64,

    pub domains: Vec<DomainEntry>,
    pub anchors: Vec<AnchorBadge>,
}

/// A recommendation emitted by the snapshot builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Kind slug: `rerun_escalate`, `cleared`, `trust_gate`,
    /// `provider_selection`, `avoid_revoked_identity`, `revocation_warning`.
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,

    pub detail: String,
}

/// The full snapshot (`pact-passport-snapshot/0.0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,

    /// `snapshot-<sha256(canonical({version, entities, recommendations}))>`.
    pub snapshot_id: String,

    pub mode: SnapshotMode,

    /// Sorted by `entity_id` ascending.
    pub entities: Vec<SnapshotEntity>,

    pub recommendations: Vec<Recommendation>,
}
