//! Blame resolver judgment (camelCase wire names).

use serde::{Deserialize, Serialize};

/// Fault attribution produced by the blame resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultDomain {
    NoFault,
    BuyerAtFault,
    ProviderAtFault,
    Inconclusive,
}

impl std::fmt::Display for FaultDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NoFault => "NO_FAULT",
            Self::BuyerAtFault => "BUYER_AT_FAULT",
            Self::ProviderAtFault => "PROVIDER_AT_FAULT",
            Self::Inconclusive => "INCONCLUSIVE",
        };
        f.write_str(s)
    }
}

/// The actor that must move next to resolve the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NextActor {
    None,
    Buyer,
    Provider,
    Auditor,
}

/// Deterministic blame judgment over one transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Judgment {
    /// Normalized outcome, mirrors the GC view status.
    pub status: String,

    /// `PACT-<n>` failure code, when the transaction failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<String>,

    /// Greatest round index whose signature and chain link verify.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_valid_round: Option<u64>,

    /// Human-oriented summary of that round.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_valid_summary: Option<String>,

    /// That round's signed payload hash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_valid_signed_hash: Option<String>,

    pub dbl_determination: FaultDomain,
    pub required_next_actor: NextActor,
    pub required_action: String,
    pub terminal: bool,

    /// Confidence in [0, 1].
    pub confidence: f64,

    /// Raw reputation impact; the passport engine clamps by confidence.
    pub passport_impact: i64,

    pub recommendation: String,

    /// Rule IDs consulted while resolving.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules_applied: Vec<String>,
}
