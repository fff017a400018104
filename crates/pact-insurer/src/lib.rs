//! # pact-insurer
//!
//! Pure derivation of the insurer summary from (transcript, GC view,
//! judgment): coverage verdict, risk factor slugs and surcharges.

use serde_json::Value;

use pact_types::{
    Coverage, FaultDomain, GcView, InsurerSummary, IntegrityVerdict, Judgment, Transcript,
};

/// Negotiations longer than this many rounds are flagged.
const EXTENDED_NEGOTIATION_ROUNDS: usize = 12;

/// Derive the insurer summary.
pub fn summarize(transcript: &Transcript, gc_view: &GcView, judgment: &Judgment) -> InsurerSummary {
    InsurerSummary {
        coverage: coverage(gc_view, judgment),
        risk_factors: risk_factors(transcript, judgment),
        surcharges: surcharges(judgment),
        audit_tier: metadata_str(transcript, "audit_tier"),
        audit_sla: metadata_str(transcript, "audit_sla"),
    }
}

/// Coverage: EXCLUDED when integrity fails or the buyer lost by an
/// admission failure, REVIEW when blame is inconclusive, else COVERED.
fn coverage(gc_view: &GcView, judgment: &Judgment) -> Coverage {
    if gc_view.integrity.verdict() != IntegrityVerdict::Valid {
        return Coverage::Excluded;
    }
    let admission_failure = matches!(judgment.failure_code.as_deref(), Some("PACT-102"));
    if judgment.dbl_determination == FaultDomain::BuyerAtFault && admission_failure {
        return Coverage::Excluded;
    }
    if judgment.dbl_determination == FaultDomain::Inconclusive {
        return Coverage::Review;
    }
    Coverage::Covered
}

fn risk_factors(transcript: &Transcript, judgment: &Judgment) -> Vec<String> {
    let mut factors = Vec::new();

    match judgment.failure_code.as_deref() {
        Some("PACT-420") => factors.push("provider_unreachable".to_string()),
        Some("PACT-421") => factors.push("api_contract_mismatch".to_string()),
        Some("PACT-430") => factors.push("commit_deadline_missed".to_string()),
        Some("PACT-431") => factors.push("fraudulent_reveal".to_string()),
        Some("PACT-500") | Some("PACT-501") => factors.push("integrity_failure".to_string()),
        Some("PACT-109") => factors.push("protocol_violation".to_string()),
        Some(code) if code.starts_with("PACT-1") => {
            factors.push("policy_gate_triggered".to_string())
        }
        _ => {}
    }

    if transcript.rounds.len() > EXTENDED_NEGOTIATION_ROUNDS {
        factors.push("extended_negotiation".to_string());
    }
    if metadata_flag(transcript, "urgent") {
        factors.push("urgency_declared".to_string());
    }
    if metadata_flag(transcript, "missing_credentials") {
        factors.push("missing_credentials".to_string());
    }

    factors
}

/// Policy violations in history surcharge the premium.
fn surcharges(judgment: &Judgment) -> Vec<String> {
    let mut surcharges = Vec::new();
    if matches!(
        judgment.failure_code.as_deref(),
        Some(code) if code.starts_with("PACT-1") && code != "PACT-109"
    ) {
        surcharges.push("policy_violation".to_string());
    }
    if judgment.failure_code.as_deref() == Some("PACT-431") {
        surcharges.push("fraud_escalation".to_string());
    }
    surcharges
}

fn metadata_str(transcript: &Transcript, key: &str) -> Option<String> {
    transcript
        .metadata
        .as_ref()?
        .get(key)?
        .as_str()
        .map(str::to_string)
}

fn metadata_flag(transcript: &Transcript, key: &str) -> bool {
    transcript
        .metadata
        .as_ref()
        .and_then(|m| m.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
