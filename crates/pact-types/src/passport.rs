//! Per-signer passport (reputation) state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reputation tier, derived from score thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    A,
    B,
    C,
    D,
}

impl Tier {
    /// Thresholds: A ≥ 0.20, B ≥ −0.10, C ≥ −0.50, D otherwise.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.20 {
            Self::A
        } else if score >= -0.10 {
            Self::B
        } else if score >= -0.50 {
            Self::C
        } else {
            Self::D
        }
    }
}

/// Settlement counters folded over a signer's transcripts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassportCounters {
    pub total_settlements: u64,
    pub successful_settlements: u64,
    pub disputes_lost: u64,
    pub disputes_won: u64,
    pub sla_violations: u64,
    pub policy_aborts: u64,
}

/// One folded transcript contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Stable transcript id the contribution came from.
    pub stable_id: String,

    /// BUYER, PROVIDER or UNKNOWN for this signer in that transcript.
    pub role: String,

    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<String>,

    /// Raw judgment impact and the confidence that clamped it.
    pub impact: i64,
    pub confidence: f64,

    /// Effective score delta applied.
    pub delta: f64,
}

/// Compact per-signer state (`passport/1.0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassportState {
    /// Signer public key; the sole canonical identity.
    pub agent_id: String,

    pub score: f64,
    pub tier: Tier,
    pub counters: PassportCounters,

    /// Millisecond timestamp of the recompute that produced this state.
    pub last_updated: i64,

    pub constitution_hash: String,

    /// SHA-256 over canonical `{agent_id, score, counters}`.
    pub state_hash: String,
}

/// Rich per-signer record: compact state plus fold history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassportRecord {
    #[serde(flatten)]
    pub state: PassportState,
    pub history: Vec<HistoryEntry>,
}

/// Recompute output over a set of transcript directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassportRegistry {
    pub version: String,
    pub generated_at_ms: i64,

    /// Compact states keyed by signer public key.
    pub states: BTreeMap<String, PassportState>,

    /// Rich records keyed by signer public key.
    pub records: BTreeMap<String, PassportRecord>,

    /// One warning per duplicate transcript dropped during dedup.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
