//! Display-only projections.
//!
//! Downstream viewers must agree on how untrusted values render, so the
//! transforms are pure functions here rather than UI conventions. The GC
//! view itself always stores raw values.

use serde::{Deserialize, Serialize};

use pact_types::gcview::status;
use pact_types::IntegrityVerdict;

/// Rendered in place of any value the integrity verdict voids.
pub const CLAIMED_UNTRUSTED: &str = "Claimed (untrusted)";
/// Rendered when a voided field was empty to begin with.
pub const NOT_RECORDED: &str = "Not recorded";

/// Displayed status for a given raw status and integrity verdict.
pub fn get_status_for_display(raw_status: &str, verdict: IntegrityVerdict) -> String {
    match verdict {
        IntegrityVerdict::Tampered | IntegrityVerdict::Invalid => {
            if raw_status.is_empty() {
                NOT_RECORDED.to_string()
            } else {
                CLAIMED_UNTRUSTED.to_string()
            }
        }
        _ => {
            if raw_status.is_empty() {
                NOT_RECORDED.to_string()
            } else {
                raw_status.to_string()
            }
        }
    }
}

/// Displayed form of an economic field (asset, amount, rail, reference).
pub fn get_economic_for_display(raw_value: &str, verdict: IntegrityVerdict) -> String {
    match verdict {
        IntegrityVerdict::Tampered | IntegrityVerdict::Invalid => CLAIMED_UNTRUSTED.to_string(),
        _ => raw_value.to_string(),
    }
}

/// Outcome badge shown in summary rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeBadge {
    Settled,
    Aborted,
    Failed,
    InProgress,
    Claimed,
    Unavailable,
}

/// Badges derived for one transcript row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryBadges {
    pub outcome_badge: OutcomeBadge,
}

/// Outcome gating: tampered or invalid integrity voids the outcome claim
/// entirely; indeterminate integrity makes it unavailable; otherwise the
/// badge follows the status mapping.
pub fn derive_summary_badges(verdict: IntegrityVerdict, raw_status: &str) -> SummaryBadges {
    let outcome_badge = match verdict {
        IntegrityVerdict::Tampered | IntegrityVerdict::Invalid => OutcomeBadge::Claimed,
        IntegrityVerdict::Indeterminate => OutcomeBadge::Unavailable,
        IntegrityVerdict::Valid => derive_outcome_status(raw_status),
    };
    SummaryBadges { outcome_badge }
}

fn derive_outcome_status(raw_status: &str) -> OutcomeBadge {
    match raw_status {
        status::COMPLETED => OutcomeBadge::Settled,
        status::ABORTED_POLICY | status::ABORTED_KYA => OutcomeBadge::Aborted,
        status::IN_PROGRESS => OutcomeBadge::InProgress,
        s if s.starts_with("FAILED") => OutcomeBadge::Failed,
        _ => OutcomeBadge::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tampered_status_displays_as_claimed() {
        assert_eq!(
            get_status_for_display("COMPLETED", IntegrityVerdict::Tampered),
            CLAIMED_UNTRUSTED
        );
        assert_eq!(
            get_status_for_display("COMPLETED", IntegrityVerdict::Invalid),
            CLAIMED_UNTRUSTED
        );
    }

    #[test]
    fn empty_status_displays_as_not_recorded() {
        assert_eq!(
            get_status_for_display("", IntegrityVerdict::Tampered),
            NOT_RECORDED
        );
        assert_eq!(
            get_status_for_display("", IntegrityVerdict::Valid),
            NOT_RECORDED
        );
    }

    #[test]
    fn valid_status_displays_raw() {
        assert_eq!(
            get_status_for_display("COMPLETED", IntegrityVerdict::Valid),
            "COMPLETED"
        );
    }

    #[test]
    fn economic_fields_void_under_bad_verdict() {
        assert_eq!(
            get_economic_for_display("1200 USDC", IntegrityVerdict::Tampered),
            CLAIMED_UNTRUSTED
        );
        assert_eq!(
            get_economic_for_display("1200 USDC", IntegrityVerdict::Valid),
            "1200 USDC"
        );
    }

    #[test]
    fn badges_gate_on_verdict() {
        assert_eq!(
            derive_summary_badges(IntegrityVerdict::Tampered, "COMPLETED").outcome_badge,
            OutcomeBadge::Claimed
        );
        assert_eq!(
            derive_summary_badges(IntegrityVerdict::Invalid, "COMPLETED").outcome_badge,
            OutcomeBadge::Claimed
        );
        assert_eq!(
            derive_summary_badges(IntegrityVerdict::Indeterminate, "COMPLETED").outcome_badge,
            OutcomeBadge::Unavailable
        );
    }

    #[test]
    fn badges_follow_status_when_valid() {
        assert_eq!(
            derive_summary_badges(IntegrityVerdict::Valid, "COMPLETED").outcome_badge,
            OutcomeBadge::Settled
        );
        assert_eq!(
            derive_summary_badges(IntegrityVerdict::Valid, "ABORTED_KYA").outcome_badge,
            OutcomeBadge::Aborted
        );
        assert_eq!(
            derive_summary_badges(IntegrityVerdict::Valid, "FAILED_PROVIDER_UNREACHABLE")
                .outcome_badge,
            OutcomeBadge::Failed
        );
    }
}
