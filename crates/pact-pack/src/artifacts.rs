//! Derivations embedded in a pack.

use serde_json::{json, Value};

use pact_types::{GcView, InsurerSummary, Judgment, RoundContent, RoundType, Transcript};
use pact_verifier::VerifyReport;

/// Everything derived from one transcript under one constitution.
#[derive(Debug, Clone)]
pub struct Derived {
    pub report: VerifyReport,
    pub judgment: Judgment,
    pub gc_view: GcView,
    pub insurer_summary: InsurerSummary,
}

impl Derived {
    /// Run the full derivation pipeline. Sealing and re-verification
    /// share this path so a recompute is byte-comparable.
    pub fn compute(
        transcript: &Transcript,
        constitution_version: &str,
        constitution_hash: &str,
    ) -> Self {
        let report = pact_verifier::verify(transcript);
        let judgment = pact_dbl::resolve_blame(transcript, &report, constitution_hash);
        let gc_view = pact_gcview::render_gc_view(
            transcript,
            &report,
            &judgment,
            constitution_version,
            constitution_hash,
        );
        let insurer_summary = pact_insurer::summarize(transcript, &gc_view, &judgment);
        Self {
            report,
            judgment,
            gc_view,
            insurer_summary,
        }
    }
}

/// Disputed rounds: signature or link failures, with the judged next
/// actor. Evidence viewers use this to focus review.
pub fn build_contention_report(
    transcript: &Transcript,
    derived: &Derived,
) -> Value {
    let disputed: Vec<Value> = derived
        .report
        .round_checks
        .iter()
        .filter(|check| !check.fully_valid())
        .map(|check| {
            let round = transcript
                .rounds
                .iter()
                .find(|r| r.round_number == check.round_number);
            json!({
                "round_number": check.round_number,
                "round_type": round.map(|r| r.round_type.to_string()),
                "signer_public_key_b58": round.map(|r| r.signer_key().to_string()),
                "payload_hash_ok": check.payload_hash_ok,
                "signature_ok": check.signature_ok,
                "link_ok": check.link_ok,
            })
        })
        .collect();

    json!({
        "transcript_id": transcript.transcript_id,
        "disputed_rounds": disputed,
        "parties": derived.gc_view.subject.parties,
        "required_next_actor": derived.judgment.required_next_actor,
    })
}

/// Ordered lifecycle events derived from the round walk.
pub fn build_outcome_events(transcript: &Transcript) -> Value {
    let mut events = Vec::new();
    for round in &transcript.rounds {
        let kind = match round.round_type {
            RoundType::Intent => Some("intent_declared"),
            RoundType::Accept => Some("price_agreed"),
            RoundType::Commit => Some("funds_locked"),
            RoundType::Reveal => Some("revealed"),
            RoundType::StreamStart => Some("stream_started"),
            RoundType::StreamStop => Some("stream_stopped"),
            RoundType::Reject => Some("rejected"),
            _ => None,
        };
        if let Some(kind) = kind {
            let mut event = json!({
                "event": kind,
                "round_number": round.round_number,
                "timestamp_ms": round.timestamp_ms,
            });
            if let RoundContent::Accept { price: Some(price), .. } = round.content() {
                event["price"] = json!(price);
            }
            events.push(event);
        }
    }
    if let Some(failure) = &transcript.failure_event {
        events.push(json!({
            "event": "failed",
            "code": failure.code,
        }));
    }
    json!({
        "transcript_id": transcript.transcript_id,
        "events": events,
    })
}
