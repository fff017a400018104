//! GC view rendering.

use pact_types::gcview::status;
use pact_types::{
    ConstitutionRef, ExecutiveSummary, GcView, Integrity, Judgment, Party, Responsibility,
    ResponsibilityJudgment, RoundType, SignatureTally, Subject, Transcript, GC_VIEW_VERSION,
};
use pact_verifier::VerifyReport;

/// Render the GC view for a verified transcript.
///
/// The integrity block is copied verbatim from the verifier report; the
/// outcome comes from the judgment. `status` never takes the
/// `TAMPERED_STATUS` sentinel: tamper state lives only in `integrity`.
pub fn render_gc_view(
    transcript: &Transcript,
    report: &VerifyReport,
    judgment: &Judgment,
    constitution_version: &str,
    constitution_hash: &str,
) -> GcView {
    let integrity = Integrity {
        hash_chain: report.hash_chain,
        signatures_verified: SignatureTally {
            verified: report.signatures.verified,
            total: report.signatures.total,
        },
        final_hash_validation: report.final_hash,
    };

    let outcome_status = if judgment.status == status::TAMPERED_STATUS {
        // The sentinel is display-layer only; a judgment carrying it is
        // an implementation fault upstream.
        status::FAILED.to_string()
    } else {
        judgment.status.clone()
    };

    let settlement_attempted = transcript.rounds.iter().any(|r| {
        matches!(r.round_type, RoundType::Commit | RoundType::StreamStart)
    });
    let money_moved = outcome_status == status::COMPLETED && settlement_attempted;

    GcView {
        version: GC_VIEW_VERSION.to_string(),
        executive_summary: ExecutiveSummary {
            status: outcome_status.clone(),
            what_happened: what_happened(transcript, judgment),
            money_moved,
            final_outcome: final_outcome(&outcome_status, judgment),
            settlement_attempted,
        },
        integrity,
        responsibility: Responsibility {
            last_valid_signed_hash: judgment.last_valid_signed_hash.clone(),
            blame_explanation: blame_explanation(judgment),
            judgment: ResponsibilityJudgment {
                fault_domain: judgment.dbl_determination,
                required_next_actor: judgment.required_next_actor,
                required_action: judgment.required_action.clone(),
                terminal: judgment.terminal,
                confidence: judgment.confidence,
            },
        },
        constitution: ConstitutionRef {
            version: constitution_version.to_string(),
            hash: constitution_hash.to_string(),
            rules_applied: judgment.rules_applied.clone(),
        },
        subject: Subject {
            transcript_id_or_hash: transcript.transcript_id.clone(),
            parties: parties(transcript),
        },
    }
}

fn what_happened(transcript: &Transcript, judgment: &Judgment) -> String {
    let rounds = transcript.rounds.len();
    match &judgment.failure_code {
        Some(code) => format!(
            "{} exchange over {} rounds ended with {}",
            transcript.intent_type, rounds, code
        ),
        None if judgment.terminal => format!(
            "{} exchange completed over {} rounds",
            transcript.intent_type, rounds
        ),
        None => format!(
            "{} exchange open after {} rounds",
            transcript.intent_type, rounds
        ),
    }
}

fn final_outcome(outcome_status: &str, judgment: &Judgment) -> String {
    match outcome_status {
        status::COMPLETED => "settled".to_string(),
        status::IN_PROGRESS => "open".to_string(),
        _ => format!("not settled ({})", judgment.required_action),
    }
}

fn blame_explanation(judgment: &Judgment) -> String {
    match &judgment.failure_code {
        Some(code) => format!(
            "{} per {} ({})",
            judgment.dbl_determination, code, judgment.recommendation
        ),
        None => judgment.recommendation.clone(),
    }
}

/// Parties from signer roles: the intent signer is the buyer; signers of
/// ASK/COUNTER/ACCEPT are providers; anyone else signed as a witness.
/// Roles are derived from signatures, never from `agent_id`.
fn parties(transcript: &Transcript) -> Vec<Party> {
    let buyer = transcript.intent_signer().unwrap_or_default().to_string();
    transcript
        .signers()
        .into_iter()
        .map(|signer| {
            let role = if signer == buyer {
                "buyer"
            } else if transcript.rounds.iter().any(|r| {
                r.signer_key() == signer
                    && matches!(
                        r.round_type,
                        RoundType::Ask | RoundType::Counter | RoundType::Accept
                    )
            }) {
                "provider"
            } else {
                "witness"
            };
            let agent_id = transcript
                .rounds
                .iter()
                .find(|r| r.signer_key() == signer)
                .and_then(|r| r.agent_id.clone());
            Party {
                agent_id,
                role: role.to_string(),
                signer_public_key_b58: signer,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pact_types::transcript::GENESIS_PREV_HASH;
    use pact_types::{FaultDomain, HashChainStatus, NextActor, Round, RoundSignature};
    use pact_verifier::verify;
    use serde_json::{json, Value};

    fn round(n: u64, rt: RoundType, signer: &str, agent: &str) -> Round {
        Round {
            round_number: n,
            round_type: rt,
            agent_id: Some(agent.to_string()),
            public_key_b58: None,
            signature: RoundSignature {
                signer_public_key_b58: signer.to_string(),
                sig_b58: String::new(),
                signed_payload_hash_hex: format!("{n:064x}"),
            },
            prev_hash_hex: GENESIS_PREV_HASH.to_string(),
            content_summary: json!({}),
            timestamp_ms: n as i64,
            raw: Value::Null,
        }
    }

    fn transcript() -> Transcript {
        Transcript {
            version: "pact-transcript/4.0".into(),
            transcript_id: "t-view".into(),
            intent_type: "api.procurement".into(),
            created_at_ms: 0,
            policy_hash: "p".into(),
            rounds: vec![
                round(0, RoundType::Intent, "buyer-pk", "acme-buyer"),
                round(1, RoundType::Ask, "provider-pk", "weather-co"),
                round(2, RoundType::Accept, "buyer-pk", "acme-buyer"),
                round(3, RoundType::Commit, "provider-pk", "weather-co"),
                round(4, RoundType::Reveal, "provider-pk", "weather-co"),
            ],
            failure_event: None,
            final_hash: None,
            metadata: None,
        }
    }

    fn judgment() -> Judgment {
        Judgment {
            status: "COMPLETED".into(),
            failure_code: None,
            last_valid_round: Some(4),
            last_valid_summary: Some("REVEAL by weather-co".into()),
            last_valid_signed_hash: Some("aa".repeat(32)),
            dbl_determination: FaultDomain::NoFault,
            required_next_actor: NextActor::None,
            required_action: "none".into(),
            terminal: true,
            confidence: 1.0,
            passport_impact: 5,
            recommendation: "settle per accepted terms".into(),
            rules_applied: vec!["R-SIG".into(), "R-CHAIN".into(), "R-COMPLETED".into()],
        }
    }

    #[test]
    fn copies_integrity_verbatim() {
        let t = transcript();
        let report = verify(&t);
        let view = render_gc_view(&t, &report, &judgment(), "v1", "chash");
        assert_eq!(view.integrity.hash_chain, report.hash_chain);
        assert_eq!(
            view.integrity.signatures_verified.total,
            report.signatures.total
        );
        assert_eq!(view.integrity.final_hash_validation, report.final_hash);
    }

    #[test]
    fn roles_come_from_signatures_not_agent_ids() {
        let t = transcript();
        let report = verify(&t);
        let view = render_gc_view(&t, &report, &judgment(), "v1", "chash");
        let buyer = view
            .subject
            .parties
            .iter()
            .find(|p| p.role == "buyer")
            .unwrap();
        assert_eq!(buyer.signer_public_key_b58, "buyer-pk");
        let provider = view
            .subject
            .parties
            .iter()
            .find(|p| p.role == "provider")
            .unwrap();
        assert_eq!(provider.signer_public_key_b58, "provider-pk");
    }

    #[test]
    fn settlement_and_money_flags() {
        let t = transcript();
        let report = verify(&t);
        let view = render_gc_view(&t, &report, &judgment(), "v1", "chash");
        assert!(view.executive_summary.settlement_attempted);
        assert!(view.executive_summary.money_moved);
    }

    #[test]
    fn tampered_sentinel_is_never_stored() {
        let t = transcript();
        let report = verify(&t);
        let mut j = judgment();
        j.status = status::TAMPERED_STATUS.to_string();
        let view = render_gc_view(&t, &report, &j, "v1", "chash");
        assert_ne!(view.executive_summary.status, status::TAMPERED_STATUS);
    }

    #[test]
    fn render_is_deterministic() {
        let t = transcript();
        let report = verify(&t);
        let j = judgment();
        let a = serde_json::to_value(render_gc_view(&t, &report, &j, "v1", "chash")).unwrap();
        let b = serde_json::to_value(render_gc_view(&t, &report, &j, "v1", "chash")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unverified_transcript_still_renders() {
        // Fixture rounds carry no real signatures, so the report shows
        // failures; rendering must not abort.
        let t = transcript();
        let report = verify(&t);
        assert!(report.signatures.verified < report.signatures.total);
        let mut j = judgment();
        j.status = "FAILED".into();
        let view = render_gc_view(&t, &report, &j, "v1", "chash");
        assert_eq!(view.executive_summary.status, "FAILED");
    }

    #[test]
    fn integrity_verdict_drives_from_report() {
        let t = transcript();
        let mut report = verify(&t);
        report.hash_chain = HashChainStatus::Invalid;
        let view = render_gc_view(&t, &report, &judgment(), "v1", "chash");
        assert_eq!(
            view.integrity.verdict(),
            pact_types::IntegrityVerdict::Tampered
        );
    }
}
