//! The blame state machine.

use tracing::debug;

use pact_types::gcview::status;
use pact_types::{
    FaultDomain, FinalHashValidation, HashChainStatus, Judgment, NextActor, Round, RoundContent,
    RoundType, Transcript,
};
use pact_verifier::VerifyReport;

use crate::rules::{self, BlameRule};

/// Protocol states, in round order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    IntentSeen,
    Negotiating,
    Accepted,
    Locked,
    Exchanging,
    TerminalOk,
    TerminalFail,
}

/// What the round walk concluded.
#[derive(Debug)]
enum WalkOutcome {
    /// A round broke the state machine.
    Violation { round_number: u64 },
    /// ACCEPT → COMMIT → REVEAL, hashes consistent.
    CommitReveal,
    /// ACCEPT → COMMIT → REVEAL with a hash mismatch.
    RevealMismatch { round_number: u64 },
    /// Streaming exchange ran to a fulfilled stop.
    StreamingFulfilled,
    /// Buyer stopped the stream early.
    BuyerStopped,
    /// Negotiation ended in a REJECT.
    Rejected { round_number: u64 },
    /// The transcript is not terminal.
    InProgress { state: State },
}

/// Resolve blame for a verified transcript.
///
/// Pure function of the transcript, its integrity report and the accepted
/// constitution hash (which selects the rule table; v1 is the only
/// rulebook so far). Integrity failures dominate: a broken chain or a
/// failed signature makes every downstream claim untrustworthy, so those
/// judgments are INCONCLUSIVE and escalate to an auditor.
pub fn resolve_blame(
    transcript: &Transcript,
    report: &VerifyReport,
    _constitution_hash: &str,
) -> Judgment {
    let last_valid = report.last_valid();
    let (last_valid_round, last_valid_hash) = match last_valid {
        Some((n, check)) => (Some(n), Some(check.recomputed_payload_hash.clone())),
        None => (None, None),
    };
    let last_valid_summary = last_valid_round
        .and_then(|n| transcript.rounds.iter().find(|r| r.round_number == n))
        .map(round_summary);

    let base = |rule: BlameRule, status: &str| {
        build_judgment(
            rule,
            status,
            last_valid_round,
            last_valid_summary.clone(),
            last_valid_hash.clone(),
        )
    };

    // Integrity overrides come first.
    if report.hash_chain == HashChainStatus::Invalid {
        return base(rules::CHAIN_BROKEN, status::FAILED);
    }
    if report.signatures.verified < report.signatures.total {
        return base(rules::SIGNATURE_INVALID, status::FAILED);
    }
    if report.final_hash == FinalHashValidation::Mismatch {
        return base(rules::CHAIN_BROKEN, status::FAILED);
    }

    let outcome = walk(transcript);
    debug!(transcript_id = %transcript.transcript_id, ?outcome, "round walk complete");

    if let WalkOutcome::Violation { round_number } = outcome {
        let mut judgment = base(rules::PROTOCOL_VIOLATION, status::FAILED);
        judgment.recommendation =
            format!("auditor reviews the out-of-order round {round_number}");
        return judgment;
    }

    // A recorded failure event names the terminal cause.
    if let Some(event) = &transcript.failure_event {
        return judge_failure_event(transcript, event, &base);
    }

    match outcome {
        WalkOutcome::CommitReveal => base(rules::COMPLETED, status::COMPLETED),
        WalkOutcome::StreamingFulfilled => base(rules::COMPLETED_STREAMING, status::COMPLETED),
        WalkOutcome::BuyerStopped => base(rules::BUYER_STOP, status::COMPLETED),
        WalkOutcome::RevealMismatch { round_number } => {
            let mut judgment = base(rules::REVEAL_MISMATCH, status::FAILED);
            judgment.recommendation =
                format!("auditor reviews the reveal at round {round_number}");
            judgment
        }
        WalkOutcome::Rejected { round_number } => {
            // A bare REJECT without a failure event is a declined
            // negotiation, not a fault.
            let mut judgment = base(rules::BUYER_STOP, status::FAILED);
            judgment.failure_code = None;
            judgment.required_action = "none".to_string();
            judgment.recommendation =
                format!("negotiation declined at round {round_number}; no fault");
            judgment
        }
        WalkOutcome::InProgress { state } => in_progress_judgment(
            state,
            last_valid_round,
            last_valid_summary,
            last_valid_hash,
        ),
        WalkOutcome::Violation { .. } => unreachable!("handled above"),
    }
}

fn judge_failure_event(
    transcript: &Transcript,
    event: &pact_types::FailureEvent,
    base: &impl Fn(BlameRule, &str) -> Judgment,
) -> Judgment {
    match event.code_number() {
        Some(101) => attribute_offending_side(
            transcript,
            event,
            base(rules::POLICY_VIOLATION, status::ABORTED_POLICY),
        ),
        Some(102) => attribute_offending_side(
            transcript,
            event,
            base(rules::KYA_REJECTED, status::ABORTED_KYA),
        ),
        Some(code) if (100..200).contains(&code) => attribute_offending_side(
            transcript,
            event,
            base(rules::POLICY_VIOLATION, status::ABORTED_POLICY),
        ),
        Some(201) => base(rules::BUYER_STOP, status::COMPLETED),
        Some(420) => base(
            rules::PROVIDER_UNREACHABLE,
            status::FAILED_PROVIDER_UNREACHABLE,
        ),
        Some(421) => base(rules::API_MISMATCH, status::FAILED),
        Some(430) => base(rules::COMMIT_MISSING, status::FAILED),
        Some(431) => base(rules::REVEAL_MISMATCH, status::FAILED),
        _ => {
            let mut judgment = base(rules::PROTOCOL_VIOLATION, status::FAILED);
            judgment.failure_code = Some(event.code.clone());
            judgment.rules_applied = vec!["R-INCONCLUSIVE".to_string()];
            judgment.recommendation =
                format!("auditor reviews unrecognized failure code {}", event.code);
            judgment
        }
    }
}

/// Fill in the at-fault side for policy/KYA aborts: the signer of the
/// offending round, buyer if that signer declared the intent. The
/// reputation impact follows the resolved side: −5 for a buyer at
/// fault, −10 for a provider at fault.
fn attribute_offending_side(
    transcript: &Transcript,
    event: &pact_types::FailureEvent,
    mut judgment: Judgment,
) -> Judgment {
    let offending = event
        .at_round
        .and_then(|n| transcript.rounds.iter().find(|r| r.round_number == n))
        .or_else(|| transcript.rounds.last());
    let buyer = transcript.intent_signer().unwrap_or_default().to_string();
    let offender_is_buyer = offending
        .map(|r| r.signer_key() == buyer)
        .unwrap_or(true);

    if offender_is_buyer {
        judgment.dbl_determination = FaultDomain::BuyerAtFault;
        judgment.required_next_actor = NextActor::Provider;
        judgment.passport_impact = -5;
    } else {
        judgment.dbl_determination = FaultDomain::ProviderAtFault;
        judgment.required_next_actor = NextActor::Buyer;
        judgment.passport_impact = -10;
    }
    judgment
}

fn in_progress_judgment(
    state: State,
    last_valid_round: Option<u64>,
    last_valid_summary: Option<String>,
    last_valid_hash: Option<String>,
) -> Judgment {
    let next_actor = match state {
        State::Accepted | State::Locked | State::Exchanging => NextActor::Provider,
        _ => NextActor::None,
    };
    Judgment {
        status: status::IN_PROGRESS.to_string(),
        failure_code: None,
        last_valid_round,
        last_valid_summary,
        last_valid_signed_hash: last_valid_hash,
        dbl_determination: FaultDomain::NoFault,
        required_next_actor: next_actor,
        required_action: "await next protocol round".to_string(),
        terminal: false,
        confidence: 0.6,
        passport_impact: 0,
        recommendation: "transcript is not terminal".to_string(),
        rules_applied: consulted_rules(None),
    }
}

fn build_judgment(
    rule: BlameRule,
    outcome_status: &str,
    last_valid_round: Option<u64>,
    last_valid_summary: Option<String>,
    last_valid_hash: Option<String>,
) -> Judgment {
    Judgment {
        status: outcome_status.to_string(),
        failure_code: rule.failure_code.map(str::to_string),
        last_valid_round,
        last_valid_summary,
        last_valid_signed_hash: last_valid_hash,
        dbl_determination: rule.determination,
        required_next_actor: rule.next_actor,
        required_action: rule.action.to_string(),
        terminal: rule.terminal,
        confidence: rule.confidence,
        passport_impact: rule.passport_impact,
        recommendation: rule.recommendation.to_string(),
        rules_applied: consulted_rules(Some(rule.id)),
    }
}

/// R-SIG and R-CHAIN are consulted on every resolution; the primary rule
/// follows.
fn consulted_rules(primary: Option<&str>) -> Vec<String> {
    let mut rules = vec!["R-SIG".to_string(), "R-CHAIN".to_string()];
    if let Some(id) = primary {
        if !rules.iter().any(|r| r == id) {
            rules.push(id.to_string());
        }
    }
    rules
}

fn round_summary(round: &Round) -> String {
    let who = round
        .agent_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let key = round.signer_key();
            key.chars().take(8).collect()
        });
    format!("{} by {}", round.round_type, who)
}

fn walk(transcript: &Transcript) -> WalkOutcome {
    let mut state = State::Init;
    let mut commitment_hash: Option<String> = None;
    let mut buyer_stopped = false;
    let mut reveal_mismatch_at: Option<u64> = None;
    let buyer = transcript.intent_signer().unwrap_or_default().to_string();

    for round in &transcript.rounds {
        let next = step(state, round.round_type);
        let Some(next) = next else {
            return WalkOutcome::Violation {
                round_number: round.round_number,
            };
        };

        match round.content() {
            RoundContent::Commit {
                commitment_hash_hex,
                ..
            } => commitment_hash = commitment_hash_hex,
            RoundContent::Reveal {
                reveal_data,
                reveal_hash_hex,
            } => {
                if let Some(expected) = &commitment_hash {
                    let revealed = reveal_data
                        .map(|data| pact_crypto::sha256_hex(data.as_bytes()))
                        .or(reveal_hash_hex);
                    if let Some(revealed) = revealed {
                        if &revealed != expected {
                            reveal_mismatch_at = Some(round.round_number);
                        }
                    }
                }
            }
            RoundContent::StreamStop { by, fulfilled, .. } => {
                let stopped_by_buyer = by.as_deref() == Some("buyer")
                    || (!buyer.is_empty() && round.signer_key() == buyer);
                if stopped_by_buyer && fulfilled != Some(true) {
                    buyer_stopped = true;
                }
            }
            _ => {}
        }

        if next == State::TerminalFail {
            return match transcript.rounds.last() {
                Some(last) if last.round_number == round.round_number => WalkOutcome::Rejected {
                    round_number: round.round_number,
                },
                // Rounds after a terminal REJECT violate the protocol.
                _ => WalkOutcome::Violation {
                    round_number: round.round_number + 1,
                },
            };
        }
        state = next;
    }

    match state {
        State::TerminalOk => {
            if let Some(round_number) = reveal_mismatch_at {
                WalkOutcome::RevealMismatch { round_number }
            } else if buyer_stopped {
                WalkOutcome::BuyerStopped
            } else if commitment_hash.is_some() {
                WalkOutcome::CommitReveal
            } else {
                WalkOutcome::StreamingFulfilled
            }
        }
        other => WalkOutcome::InProgress { state: other },
    }
}

/// One legal transition, or `None` for a protocol violation.
fn step(state: State, round_type: RoundType) -> Option<State> {
    use RoundType::*;
    use State::*;
    let next = match (state, round_type) {
        (Init, Intent) => IntentSeen,
        (IntentSeen | Negotiating, Ask | Bid | Counter) => Negotiating,
        (IntentSeen | Negotiating, Accept) => Accepted,
        (IntentSeen | Negotiating, Reject) => TerminalFail,
        (Accepted, Commit) => Locked,
        (Accepted, StreamStart) => Exchanging,
        (Locked, Reveal) => TerminalOk,
        (Exchanging, StreamChunk) => Exchanging,
        (Exchanging, StreamStop) => TerminalOk,
        _ => return None,
    };
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pact_types::transcript::GENESIS_PREV_HASH;
    use pact_types::RoundSignature;
    use pact_verifier::{RoundCheck, SignatureFailure, SignatureReport, VerifyReport};
    use serde_json::{json, Value};

    fn round(n: u64, rt: RoundType, signer: &str, content: Value) -> Round {
        Round {
            round_number: n,
            round_type: rt,
            agent_id: None,
            public_key_b58: None,
            signature: RoundSignature {
                signer_public_key_b58: signer.to_string(),
                sig_b58: String::new(),
                signed_payload_hash_hex: format!("{n:064x}"),
            },
            prev_hash_hex: GENESIS_PREV_HASH.to_string(),
            content_summary: content,
            timestamp_ms: n as i64 * 1000,
            raw: Value::Null,
        }
    }

    fn transcript(rounds: Vec<Round>, failure_code: Option<&str>) -> Transcript {
        Transcript {
            version: "pact-transcript/4.0".into(),
            transcript_id: "t-dbl".into(),
            intent_type: "api.procurement".into(),
            created_at_ms: 0,
            policy_hash: "p".into(),
            rounds,
            failure_event: failure_code.map(|code| pact_types::FailureEvent {
                code: code.into(),
                message: None,
                at_round: None,
            }),
            final_hash: None,
            metadata: None,
        }
    }

    fn clean_report(t: &Transcript) -> VerifyReport {
        let round_checks: Vec<RoundCheck> = t
            .rounds
            .iter()
            .map(|r| RoundCheck {
                round_number: r.round_number,
                payload_hash_ok: true,
                signature_ok: true,
                link_ok: true,
                recomputed_payload_hash: r.signature.signed_payload_hash_hex.clone(),
            })
            .collect();
        VerifyReport {
            rounds_verified: round_checks.len(),
            hash_chain: HashChainStatus::Valid,
            signatures: SignatureReport {
                verified: round_checks.len(),
                total: round_checks.len(),
                failures: vec![],
            },
            final_hash: FinalHashValidation::Absent,
            warnings: vec![],
            round_checks,
        }
    }

    fn commit_reveal_rounds() -> Vec<Round> {
        let payload = "the goods";
        let commitment = pact_crypto::sha256_hex(payload.as_bytes());
        vec![
            round(0, RoundType::Intent, "buyer-pk", json!({})),
            round(1, RoundType::Ask, "provider-pk", json!({"price": "10"})),
            round(2, RoundType::Accept, "buyer-pk", json!({"price": "10"})),
            round(
                3,
                RoundType::Commit,
                "provider-pk",
                json!({"commitment_hash_hex": commitment}),
            ),
            round(
                4,
                RoundType::Reveal,
                "provider-pk",
                json!({"reveal_data": payload}),
            ),
        ]
    }

    #[test]
    fn completed_commit_reveal_is_no_fault() {
        let t = transcript(commit_reveal_rounds(), None);
        let judgment = resolve_blame(&t, &clean_report(&t), "chash");
        assert_eq!(judgment.status, "COMPLETED");
        assert_eq!(judgment.dbl_determination, FaultDomain::NoFault);
        assert_eq!(judgment.required_next_actor, NextActor::None);
        assert_eq!(judgment.confidence, 1.0);
        assert!(judgment.terminal);
        assert_eq!(judgment.last_valid_round, Some(4));
    }

    #[test]
    fn reveal_hash_mismatch_is_fraud() {
        let mut rounds = commit_reveal_rounds();
        rounds[4] = round(
            4,
            RoundType::Reveal,
            "provider-pk",
            json!({"reveal_data": "swapped goods"}),
        );
        let t = transcript(rounds, None);
        let judgment = resolve_blame(&t, &clean_report(&t), "chash");
        assert_eq!(judgment.failure_code.as_deref(), Some("PACT-431"));
        assert_eq!(judgment.dbl_determination, FaultDomain::ProviderAtFault);
        assert_eq!(judgment.required_next_actor, NextActor::Auditor);
        assert_eq!(judgment.confidence, 1.0);
        assert_eq!(judgment.passport_impact, -20);
    }

    #[test]
    fn streaming_fulfilled_completes_at_lower_confidence() {
        let t = transcript(
            vec![
                round(0, RoundType::Intent, "buyer-pk", json!({})),
                round(1, RoundType::Ask, "provider-pk", json!({})),
                round(2, RoundType::Accept, "buyer-pk", json!({})),
                round(3, RoundType::StreamStart, "provider-pk", json!({})),
                round(4, RoundType::StreamChunk, "provider-pk", json!({"seq": 0})),
                round(
                    5,
                    RoundType::StreamStop,
                    "provider-pk",
                    json!({"by": "provider", "fulfilled": true}),
                ),
            ],
            None,
        );
        let judgment = resolve_blame(&t, &clean_report(&t), "chash");
        assert_eq!(judgment.status, "COMPLETED");
        assert_eq!(judgment.confidence, 0.95);
    }

    #[test]
    fn buyer_stream_stop_is_no_fault() {
        let t = transcript(
            vec![
                round(0, RoundType::Intent, "buyer-pk", json!({})),
                round(1, RoundType::Ask, "provider-pk", json!({})),
                round(2, RoundType::Accept, "buyer-pk", json!({})),
                round(3, RoundType::StreamStart, "provider-pk", json!({})),
                round(
                    4,
                    RoundType::StreamStop,
                    "buyer-pk",
                    json!({"by": "buyer", "fulfilled": false}),
                ),
            ],
            None,
        );
        let judgment = resolve_blame(&t, &clean_report(&t), "chash");
        assert_eq!(judgment.dbl_determination, FaultDomain::NoFault);
        assert_eq!(judgment.confidence, 0.9);
    }

    #[test]
    fn round_zero_must_be_intent() {
        let t = transcript(
            vec![round(0, RoundType::Ask, "provider-pk", json!({}))],
            None,
        );
        let judgment = resolve_blame(&t, &clean_report(&t), "chash");
        assert_eq!(judgment.failure_code.as_deref(), Some("PACT-109"));
        assert_eq!(judgment.dbl_determination, FaultDomain::Inconclusive);
        assert!(judgment.terminal);
    }

    #[test]
    fn policy_violation_blames_offending_signer() {
        let mut t = transcript(
            vec![
                round(0, RoundType::Intent, "buyer-pk", json!({})),
                round(1, RoundType::Ask, "provider-pk", json!({})),
                round(2, RoundType::Reject, "buyer-pk", json!({})),
            ],
            Some("PACT-101"),
        );
        t.failure_event.as_mut().unwrap().at_round = Some(1);
        let judgment = resolve_blame(&t, &clean_report(&t), "chash");
        assert_eq!(judgment.status, "ABORTED_POLICY");
        assert_eq!(judgment.dbl_determination, FaultDomain::ProviderAtFault);
        assert_eq!(judgment.required_next_actor, NextActor::Buyer);
        assert_eq!(judgment.passport_impact, -10);
    }

    #[test]
    fn policy_violation_by_buyer_keeps_the_lighter_penalty() {
        let mut t = transcript(
            vec![
                round(0, RoundType::Intent, "buyer-pk", json!({})),
                round(1, RoundType::Ask, "provider-pk", json!({})),
                round(2, RoundType::Reject, "provider-pk", json!({})),
            ],
            Some("PACT-101"),
        );
        t.failure_event.as_mut().unwrap().at_round = Some(0);
        let judgment = resolve_blame(&t, &clean_report(&t), "chash");
        assert_eq!(judgment.dbl_determination, FaultDomain::BuyerAtFault);
        assert_eq!(judgment.required_next_actor, NextActor::Provider);
        assert_eq!(judgment.passport_impact, -5);
    }

    #[test]
    fn provider_unreachable_blames_provider() {
        let t = transcript(
            vec![
                round(0, RoundType::Intent, "buyer-pk", json!({})),
                round(1, RoundType::Ask, "provider-pk", json!({})),
            ],
            Some("PACT-420"),
        );
        let judgment = resolve_blame(&t, &clean_report(&t), "chash");
        assert_eq!(judgment.status, "FAILED_PROVIDER_UNREACHABLE");
        assert_eq!(judgment.dbl_determination, FaultDomain::ProviderAtFault);
        assert_eq!(judgment.required_next_actor, NextActor::Provider);
        assert_eq!(judgment.confidence, 0.9);
    }

    #[test]
    fn broken_chain_dominates_everything() {
        let t = transcript(commit_reveal_rounds(), Some("PACT-420"));
        let mut report = clean_report(&t);
        report.hash_chain = HashChainStatus::Invalid;
        report.round_checks[2].payload_hash_ok = false;
        let judgment = resolve_blame(&t, &report, "chash");
        assert_eq!(judgment.failure_code.as_deref(), Some("PACT-501"));
        assert_eq!(judgment.dbl_determination, FaultDomain::Inconclusive);
        assert_eq!(judgment.required_next_actor, NextActor::Auditor);
    }

    #[test]
    fn signature_failure_is_inconclusive() {
        let t = transcript(commit_reveal_rounds(), None);
        let mut report = clean_report(&t);
        report.signatures.verified = 4;
        report.signatures.failures.push(SignatureFailure {
            round_number: 1,
            reason: "bad signature".into(),
        });
        report.round_checks[1].signature_ok = false;
        let judgment = resolve_blame(&t, &report, "chash");
        assert_eq!(judgment.failure_code.as_deref(), Some("PACT-500"));
        assert_eq!(judgment.confidence, 1.0);
        assert_eq!(judgment.last_valid_round, Some(0));
    }

    #[test]
    fn status_never_takes_the_tampered_sentinel() {
        let t = transcript(commit_reveal_rounds(), None);
        let mut report = clean_report(&t);
        report.hash_chain = HashChainStatus::Invalid;
        let judgment = resolve_blame(&t, &report, "chash");
        assert_ne!(judgment.status, status::TAMPERED_STATUS);
    }

    #[test]
    fn in_progress_after_accept_waits_on_provider() {
        let t = transcript(
            vec![
                round(0, RoundType::Intent, "buyer-pk", json!({})),
                round(1, RoundType::Ask, "provider-pk", json!({})),
                round(2, RoundType::Accept, "buyer-pk", json!({})),
            ],
            None,
        );
        let judgment = resolve_blame(&t, &clean_report(&t), "chash");
        assert!(!judgment.terminal);
        assert_eq!(judgment.status, "IN_PROGRESS");
        assert_eq!(judgment.required_next_actor, NextActor::Provider);
    }

    #[test]
    fn rounds_after_reject_violate_protocol() {
        let t = transcript(
            vec![
                round(0, RoundType::Intent, "buyer-pk", json!({})),
                round(1, RoundType::Reject, "provider-pk", json!({})),
                round(2, RoundType::Ask, "provider-pk", json!({})),
            ],
            None,
        );
        let judgment = resolve_blame(&t, &clean_report(&t), "chash");
        assert_eq!(judgment.failure_code.as_deref(), Some("PACT-109"));
    }
}
