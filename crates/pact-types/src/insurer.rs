//! Insurer summary: coverage, risk factors, surcharges.

use serde::{Deserialize, Serialize};

/// Coverage verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Coverage {
    Covered,
    Excluded,
    Review,
}

/// Insurer-facing summary derived from (transcript, GC view, judgment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsurerSummary {
    pub coverage: Coverage,

    /// Risk factor slugs, e.g. `provider_unreachable`, `extended_negotiation`.
    pub risk_factors: Vec<String>,

    /// Surcharge slugs from policy violations in history.
    pub surcharges: Vec<String>,

    /// Forwarded from transcript metadata when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_tier: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_sla: Option<String>,
}
