//! The signed, hash-chained transcript of one Pact transaction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::RoundContent;

/// All-zero hash used as `prev_hash_hex` of round 0.
pub const GENESIS_PREV_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// A full transcript (`pact-transcript/4.0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Wire format version tag. Some early producers omitted it.
    #[serde(default)]
    pub version: String,

    /// Opaque transcript identifier.
    pub transcript_id: String,

    /// Intent tag, e.g. `api.procurement` or `art.acquisition`.
    pub intent_type: String,

    /// Creation time, integer milliseconds since epoch.
    pub created_at_ms: i64,

    /// Hash of the policy in force when the transcript was produced.
    pub policy_hash: String,

    /// Ordered, non-empty round sequence.
    pub rounds: Vec<Round>,

    /// Terminal failure marker, when the transaction did not complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_event: Option<FailureEvent>,

    /// Expected chain tip, when the producer recorded one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_hash: Option<String>,

    /// Extensible producer metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Transcript {
    /// Insertion-ordered unique sequence of signer public keys.
    pub fn signers(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for round in &self.rounds {
            let key = round.signer_key();
            if !key.is_empty() && !seen.iter().any(|s| s == key) {
                seen.push(key.to_string());
            }
        }
        seen
    }

    /// The signer of round 0 (the INTENT declarer), when present.
    pub fn intent_signer(&self) -> Option<&str> {
        self.rounds.first().map(|r| r.signer_key())
    }

    /// Rounds of a given type, in order.
    pub fn rounds_of_type(&self, round_type: RoundType) -> impl Iterator<Item = &Round> {
        self.rounds.iter().filter(move |r| r.round_type == round_type)
    }

    /// Provider-of-record: `ACCEPT.content_summary.to` when present,
    /// otherwise the first signer of an ASK/COUNTER/ACCEPT round.
    pub fn provider_of_record(&self) -> Option<String> {
        for round in self.rounds_of_type(RoundType::Accept) {
            if let Some(to) = round.content_summary.get("to").and_then(Value::as_str) {
                return Some(to.to_string());
            }
        }
        self.rounds
            .iter()
            .find(|r| {
                matches!(
                    r.round_type,
                    RoundType::Ask | RoundType::Counter | RoundType::Accept
                )
            })
            .map(|r| r.signer_key().to_string())
    }
}

/// One message in the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    /// Unique, monotonically increasing, starting at 0.
    pub round_number: u64,

    /// Message kind.
    pub round_type: RoundType,

    /// Display role. Never trusted for identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    /// Legacy signer key path, superseded by `signature.signer_public_key_b58`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_b58: Option<String>,

    /// Detached signature over the canonical round payload.
    pub signature: RoundSignature,

    /// Hash of the previous round's `signed_payload_hash_hex`; all zeros
    /// for round 0.
    pub prev_hash_hex: String,

    /// Round-kind-specific payload. Kept raw so unknown producer fields
    /// participate in hashing.
    pub content_summary: Value,

    /// Monotonically non-decreasing.
    pub timestamp_ms: i64,

    /// The raw parsed JSON of this round as it appeared in the source
    /// document. Payload hashes are recomputed from this, never from the
    /// typed fields, so producer extensions survive.
    #[serde(skip)]
    pub raw: Value,
}

impl Round {
    /// The canonical signer identity for this round.
    pub fn signer_key(&self) -> &str {
        if !self.signature.signer_public_key_b58.is_empty() {
            &self.signature.signer_public_key_b58
        } else {
            self.public_key_b58.as_deref().unwrap_or("")
        }
    }

    /// Decode the round-kind-specific payload into its typed form.
    pub fn content(&self) -> RoundContent {
        RoundContent::from_summary(self.round_type, &self.content_summary)
    }
}

/// Detached signature block carried by every round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSignature {
    /// Signer public key, Base58.
    pub signer_public_key_b58: String,

    /// Ed25519 signature, Base58.
    pub sig_b58: String,

    /// SHA-256 of the canonical round payload (round minus this block),
    /// lowercase hex.
    pub signed_payload_hash_hex: String,
}

/// Terminal failure marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEvent {
    /// Failure code, `PACT-<n>`.
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Round the failure was observed at, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at_round: Option<u64>,
}

impl FailureEvent {
    /// Numeric part of the `PACT-<n>` code, when well-formed.
    pub fn code_number(&self) -> Option<u32> {
        self.code.strip_prefix("PACT-")?.parse().ok()
    }
}

/// Round kinds of the Pact negotiation protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundType {
    Intent,
    Ask,
    Bid,
    Counter,
    Accept,
    Reject,
    Commit,
    Reveal,
    StreamStart,
    StreamChunk,
    StreamStop,
}

impl RoundType {
    /// Whether this round kind belongs to the negotiation phase.
    pub fn is_negotiation(self) -> bool {
        matches!(self, Self::Ask | Self::Bid | Self::Counter)
    }
}

impl std::fmt::Display for RoundType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Intent => "INTENT",
            Self::Ask => "ASK",
            Self::Bid => "BID",
            Self::Counter => "COUNTER",
            Self::Accept => "ACCEPT",
            Self::Reject => "REJECT",
            Self::Commit => "COMMIT",
            Self::Reveal => "REVEAL",
            Self::StreamStart => "STREAM_START",
            Self::StreamChunk => "STREAM_CHUNK",
            Self::StreamStop => "STREAM_STOP",
        };
        f.write_str(s)
    }
}
