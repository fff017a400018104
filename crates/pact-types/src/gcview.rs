//! General Counsel view: integrity + outcome + responsibility projection.

use serde::{Deserialize, Serialize};

use crate::judgment::{FaultDomain, NextActor};

/// Known outcome status values. The wire field is an open string set, so
/// these are constants rather than an enum.
pub mod status {
    pub const COMPLETED: &str = "COMPLETED";
    pub const ABORTED_POLICY: &str = "ABORTED_POLICY";
    pub const ABORTED_KYA: &str = "ABORTED_KYA";
    pub const FAILED: &str = "FAILED";
    pub const FAILED_PROVIDER_UNREACHABLE: &str = "FAILED_PROVIDER_UNREACHABLE";
    pub const IN_PROGRESS: &str = "IN_PROGRESS";

    /// Sentinel that must never be stored in a status field; tamper state
    /// is surfaced only via the integrity block.
    pub const TAMPERED_STATUS: &str = "TAMPERED_STATUS";
}

/// Hash chain verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HashChainStatus {
    Valid,
    Invalid,
}

/// Final hash comparison against the recorded chain tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalHashValidation {
    Match,
    Mismatch,
    Absent,
}

/// Overall integrity verdict used by display projections and badges.
/// Derived from the integrity block, never stored on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrityVerdict {
    Valid,
    Tampered,
    Invalid,
    Indeterminate,
}

/// Signature verification tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureTally {
    pub verified: usize,
    pub total: usize,
}

/// Integrity block, copied verbatim from the verifier report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integrity {
    pub hash_chain: HashChainStatus,
    pub signatures_verified: SignatureTally,
    pub final_hash_validation: FinalHashValidation,
}

impl Integrity {
    /// Collapse the block into a single verdict: a broken chain is
    /// tampering, signature failures or a final-hash mismatch with an
    /// intact chain are invalidity, an empty tally is indeterminate.
    pub fn verdict(&self) -> IntegrityVerdict {
        if self.signatures_verified.total == 0 {
            return IntegrityVerdict::Indeterminate;
        }
        if self.hash_chain == HashChainStatus::Invalid {
            return IntegrityVerdict::Tampered;
        }
        if self.signatures_verified.verified < self.signatures_verified.total
            || self.final_hash_validation == FinalHashValidation::Mismatch
        {
            return IntegrityVerdict::Invalid;
        }
        IntegrityVerdict::Valid
    }
}

/// Executive summary of what happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub status: String,
    pub what_happened: String,
    pub money_moved: bool,
    pub final_outcome: String,
    pub settlement_attempted: bool,
}

/// Judgment excerpt embedded in the responsibility block (snake_case, in
/// contrast to the standalone judgment document).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsibilityJudgment {
    pub fault_domain: FaultDomain,
    pub required_next_actor: NextActor,
    pub required_action: String,
    pub terminal: bool,
    pub confidence: f64,
}

/// Responsibility block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Responsibility {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_valid_signed_hash: Option<String>,
    pub blame_explanation: String,
    pub judgment: ResponsibilityJudgment,
}

/// Constitution reference committed to by every view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstitutionRef {
    pub version: String,
    pub hash: String,
    pub rules_applied: Vec<String>,
}

/// One party to the transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    pub role: String,
    pub signer_public_key_b58: String,
}

/// Subject block identifying the transcript under review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub transcript_id_or_hash: String,
    pub parties: Vec<Party>,
}

/// The full GC view (`gc_view/1.x`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcView {
    pub version: String,
    pub executive_summary: ExecutiveSummary,
    pub integrity: Integrity,
    pub responsibility: Responsibility,
    pub constitution: ConstitutionRef,
    pub subject: Subject,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integrity(chain: HashChainStatus, verified: usize, total: usize, fh: FinalHashValidation) -> Integrity {
        Integrity {
            hash_chain: chain,
            signatures_verified: SignatureTally { verified, total },
            final_hash_validation: fh,
        }
    }

    #[test]
    fn verdict_valid() {
        let i = integrity(HashChainStatus::Valid, 5, 5, FinalHashValidation::Match);
        assert_eq!(i.verdict(), IntegrityVerdict::Valid);
    }

    #[test]
    fn broken_chain_is_tampered() {
        let i = integrity(HashChainStatus::Invalid, 5, 5, FinalHashValidation::Absent);
        assert_eq!(i.verdict(), IntegrityVerdict::Tampered);
    }

    #[test]
    fn signature_failure_is_invalid() {
        let i = integrity(HashChainStatus::Valid, 4, 5, FinalHashValidation::Absent);
        assert_eq!(i.verdict(), IntegrityVerdict::Invalid);
    }

    #[test]
    fn final_hash_mismatch_is_invalid_with_intact_chain() {
        let i = integrity(HashChainStatus::Valid, 5, 5, FinalHashValidation::Mismatch);
        assert_eq!(i.verdict(), IntegrityVerdict::Invalid);
    }

    #[test]
    fn empty_tally_is_indeterminate() {
        let i = integrity(HashChainStatus::Valid, 0, 0, FinalHashValidation::Absent);
        assert_eq!(i.verdict(), IntegrityVerdict::Indeterminate);
    }
}
