//! The blame rule table.
//!
//! Every judgment cites exactly one primary rule from this table. The
//! numbers are bound to constitution v1; a future rulebook revision gets
//! its own table behind the version guard.

use pact_types::{FaultDomain, NextActor};

/// Rulebook version this table is bound to.
pub const RULE_TABLE_VERSION: &str = "v1";

/// One row of the blame table.
#[derive(Debug, Clone, Copy)]
pub struct BlameRule {
    /// Constitution rule id cited in views.
    pub id: &'static str,
    /// `PACT-<n>` failure code, when the trigger is a failure.
    pub failure_code: Option<&'static str>,
    pub determination: FaultDomain,
    pub next_actor: NextActor,
    pub action: &'static str,
    pub terminal: bool,
    pub confidence: f64,
    /// Raw reputation impact on the primarily affected side.
    pub passport_impact: i64,
    pub recommendation: &'static str,
}

/// ACCEPT → COMMIT → hash-matching REVEAL.
pub const COMPLETED: BlameRule = BlameRule {
    id: "R-COMPLETED",
    failure_code: None,
    determination: FaultDomain::NoFault,
    next_actor: NextActor::None,
    action: "none",
    terminal: true,
    confidence: 1.0,
    passport_impact: 5,
    recommendation: "settle per accepted terms",
};

/// Streaming exchange ran to a fulfilled stop.
pub const COMPLETED_STREAMING: BlameRule = BlameRule {
    id: "R-COMPLETED",
    failure_code: None,
    determination: FaultDomain::NoFault,
    next_actor: NextActor::None,
    action: "none",
    terminal: true,
    confidence: 0.95,
    passport_impact: 5,
    recommendation: "settle per delivered stream",
};

/// Buyer stopped the stream before fulfillment.
pub const BUYER_STOP: BlameRule = BlameRule {
    id: "R-BUYER-STOP",
    failure_code: Some("PACT-201"),
    determination: FaultDomain::NoFault,
    next_actor: NextActor::None,
    action: "settle delivered chunks",
    terminal: true,
    confidence: 0.9,
    passport_impact: 0,
    recommendation: "settle delivered chunks, no penalty",
};

/// Policy violation at intent or during negotiation. The at-fault side
/// is the signer of the offending round; the resolver fills it in and
/// raises the impact to −10 when the provider is the offender.
pub const POLICY_VIOLATION: BlameRule = BlameRule {
    id: "R-POLICY",
    failure_code: Some("PACT-101"),
    determination: FaultDomain::Inconclusive,
    next_actor: NextActor::None,
    action: "review policy compliance",
    terminal: true,
    confidence: 0.9,
    passport_impact: -5,
    recommendation: "abort; the offending side reviews its policy gate",
};

/// Know-your-agent admission failure. As with policy violations, the
/// resolver sets the at-fault side and its −5/−10 impact.
pub const KYA_REJECTED: BlameRule = BlameRule {
    id: "R-KYA",
    failure_code: Some("PACT-102"),
    determination: FaultDomain::Inconclusive,
    next_actor: NextActor::None,
    action: "complete identity verification",
    terminal: true,
    confidence: 0.9,
    passport_impact: -5,
    recommendation: "abort; rejected party completes onboarding",
};

/// Provider never acknowledged within the deadline.
pub const PROVIDER_UNREACHABLE: BlameRule = BlameRule {
    id: "R-ACK",
    failure_code: Some("PACT-420"),
    determination: FaultDomain::ProviderAtFault,
    next_actor: NextActor::Provider,
    action: "re-establish reachability",
    terminal: true,
    confidence: 0.9,
    passport_impact: -10,
    recommendation: "provider restores service before re-listing",
};

/// Provider interface contradicted the accepted description.
pub const API_MISMATCH: BlameRule = BlameRule {
    id: "R-API",
    failure_code: Some("PACT-421"),
    determination: FaultDomain::ProviderAtFault,
    next_actor: NextActor::Provider,
    action: "publish a conforming interface",
    terminal: true,
    confidence: 0.85,
    passport_impact: -10,
    recommendation: "provider corrects the interface contract",
};

/// COMMIT missing by the recorded deadline.
pub const COMMIT_MISSING: BlameRule = BlameRule {
    id: "R-COMMIT-DEADLINE",
    failure_code: Some("PACT-430"),
    determination: FaultDomain::ProviderAtFault,
    next_actor: NextActor::Provider,
    action: "commit or refund",
    terminal: true,
    confidence: 0.9,
    passport_impact: -10,
    recommendation: "provider commits or releases the lock",
};

/// REVEAL payload did not hash to the commitment.
pub const REVEAL_MISMATCH: BlameRule = BlameRule {
    id: "R-REVEAL",
    failure_code: Some("PACT-431"),
    determination: FaultDomain::ProviderAtFault,
    next_actor: NextActor::Auditor,
    action: "escalate fraudulent reveal",
    terminal: true,
    confidence: 1.0,
    passport_impact: -20,
    recommendation: "auditor reviews the commitment evidence",
};

/// A signature failed strict verification.
pub const SIGNATURE_INVALID: BlameRule = BlameRule {
    id: "R-SIG",
    failure_code: Some("PACT-500"),
    determination: FaultDomain::Inconclusive,
    next_actor: NextActor::Auditor,
    action: "audit signature evidence",
    terminal: true,
    confidence: 1.0,
    passport_impact: 0,
    recommendation: "auditor establishes which records are authentic",
};

/// The hash chain is broken.
pub const CHAIN_BROKEN: BlameRule = BlameRule {
    id: "R-CHAIN",
    failure_code: Some("PACT-501"),
    determination: FaultDomain::Inconclusive,
    next_actor: NextActor::Auditor,
    action: "audit chain evidence",
    terminal: true,
    confidence: 1.0,
    passport_impact: 0,
    recommendation: "auditor establishes the last trustworthy round",
};

/// The round sequence violates the protocol state machine.
pub const PROTOCOL_VIOLATION: BlameRule = BlameRule {
    id: "R-PROTOCOL",
    failure_code: Some("PACT-109"),
    determination: FaultDomain::Inconclusive,
    next_actor: NextActor::Auditor,
    action: "audit protocol sequence",
    terminal: true,
    confidence: 1.0,
    passport_impact: 0,
    recommendation: "auditor reviews the out-of-order rounds",
};
