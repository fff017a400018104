//! # pact-passport
//!
//! Folds an ordered set of transcripts into per-signer reputation state.
//!
//! Transcripts are deduplicated by a stable id (a canonical projection
//! hash), sorted, and folded per signer. Folding the same transcript
//! twice contributes once; permuting the inputs changes nothing. Scores
//! are kept in integer basis points internally so the fold is exact.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::json;
use tracing::debug;

use pact_types::gcview::status;
use pact_types::{
    FaultDomain, HistoryEntry, Judgment, PassportCounters, PassportRecord, PassportRegistry,
    PassportState, RoundType, Tier, Transcript, PASSPORT_VERSION,
};

/// Stable transcript id: SHA-256 over the canonical projection
/// `{intent_type, policy_hash, rounds: [signed payload hashes]}`.
/// Producers re-serializing a transcript (whitespace, field order) do not
/// change it; any signed content change does.
pub fn stable_transcript_id(transcript: &Transcript) -> String {
    let hashes: Vec<&str> = transcript
        .rounds
        .iter()
        .map(|r| r.signature.signed_payload_hash_hex.as_str())
        .collect();
    let projection = json!({
        "intent_type": transcript.intent_type,
        "policy_hash": transcript.policy_hash,
        "rounds": hashes,
    });
    pact_canonical::canonical_sha256_hex(&projection)
        .expect("projection has no non-finite numbers")
}

/// Role of a signer within one transcript.
fn role_of(transcript: &Transcript, signer: &str) -> &'static str {
    let signed = |kinds: &[RoundType]| {
        transcript
            .rounds
            .iter()
            .any(|r| r.signer_key() == signer && kinds.contains(&r.round_type))
    };
    if signed(&[RoundType::Intent]) {
        "BUYER"
    } else if signed(&[RoundType::Ask, RoundType::Counter, RoundType::Accept]) {
        "PROVIDER"
    } else {
        "UNKNOWN"
    }
}

/// Recompute passport state over a set of transcripts.
///
/// Inputs may contain duplicates (the same transcript read from two
/// directories); each duplicate produces a warning and contributes once.
/// Output is independent of input order.
pub fn recompute(
    transcripts: &[Transcript],
    constitution_hash: &str,
    now_ms: i64,
) -> PassportRegistry {
    // Dedupe by stable id, first occurrence wins (input order).
    let mut seen: BTreeMap<String, &Transcript> = BTreeMap::new();
    let mut warnings = Vec::new();
    for transcript in transcripts {
        let stable_id = stable_transcript_id(transcript);
        if seen.contains_key(&stable_id) {
            warnings.push(format!(
                "duplicate transcript {} ({}) ignored",
                &stable_id[..16],
                transcript.transcript_id
            ));
        } else {
            seen.insert(stable_id, transcript);
        }
    }
    debug!(
        unique = seen.len(),
        duplicates = warnings.len(),
        "passport recompute"
    );

    // Judge each unique transcript once; the map is already sorted by
    // stable id, which fixes the fold order.
    let judged: BTreeMap<&String, (&Transcript, Judgment)> = seen
        .iter()
        .map(|(stable_id, transcript)| {
            let report = pact_verifier::verify(transcript);
            let judgment = pact_dbl::resolve_blame(transcript, &report, constitution_hash);
            (stable_id, (*transcript, judgment))
        })
        .collect();

    let mut signers: Vec<String> = Vec::new();
    for (transcript, _) in judged.values() {
        for signer in transcript.signers() {
            if !signers.contains(&signer) {
                signers.push(signer);
            }
        }
    }

    let mut states = BTreeMap::new();
    let mut records = BTreeMap::new();
    let mut folded: BTreeSet<(String, String)> = BTreeSet::new();

    for signer in signers {
        let mut score_bp: i64 = 0;
        let mut counters = PassportCounters::default();
        let mut history = Vec::new();

        for (stable_id, (transcript, judgment)) in &judged {
            if !transcript.signers().iter().any(|s| s == &signer) {
                continue;
            }
            // (stable_id, signer) pairs fold at most once.
            if !folded.insert(((*stable_id).clone(), signer.clone())) {
                continue;
            }
            let entry = apply_delta(
                &mut score_bp,
                &mut counters,
                transcript,
                judgment,
                &signer,
                stable_id,
            );
            history.push(entry);
        }

        let score = score_bp as f64 / 100.0;
        let state = PassportState {
            agent_id: signer.clone(),
            score,
            tier: Tier::from_score(score),
            counters,
            last_updated: now_ms,
            constitution_hash: constitution_hash.to_string(),
            state_hash: state_hash(&signer, score, &counters),
        };
        states.insert(signer.clone(), state.clone());
        records.insert(signer, PassportRecord { state, history });
    }

    PassportRegistry {
        version: PASSPORT_VERSION.to_string(),
        generated_at_ms: now_ms,
        states,
        records,
        warnings,
    }
}

/// `state_hash = SHA-256(canonical({agent_id, score, counters}))`.
pub fn state_hash(agent_id: &str, score: f64, counters: &PassportCounters) -> String {
    let value = json!({
        "agent_id": agent_id,
        "score": score,
        "counters": serde_json::to_value(counters).expect("counters serialize"),
    });
    pact_canonical::canonical_sha256_hex(&value).expect("state projection canonicalizes")
}

/// Fold one transcript's contribution into a signer's state.
///
/// The judgment's raw impact is clamped by confidence
/// (`round(impact × confidence)`, in hundredths of a score point) and
/// lands on the side the determination names. A clean completion credits
/// the provider +5 and the buyer +3 before the same clamp.
fn apply_delta(
    score_bp: &mut i64,
    counters: &mut PassportCounters,
    transcript: &Transcript,
    judgment: &Judgment,
    signer: &str,
    stable_id: &str,
) -> HistoryEntry {
    let role = role_of(transcript, signer);
    counters.total_settlements += 1;

    let completed = judgment.status == status::COMPLETED;
    if completed {
        counters.successful_settlements += 1;
    }

    let failure_code = judgment.failure_code.as_deref();
    let code_number = failure_code
        .and_then(|c| c.strip_prefix("PACT-"))
        .and_then(|n| n.parse::<u32>().ok());

    let at_fault = match judgment.dbl_determination {
        FaultDomain::ProviderAtFault => role == "PROVIDER",
        FaultDomain::BuyerAtFault => role == "BUYER",
        _ => false,
    };
    let opposing_fault = match judgment.dbl_determination {
        FaultDomain::ProviderAtFault => role == "BUYER",
        FaultDomain::BuyerAtFault => role == "PROVIDER",
        _ => false,
    };

    if at_fault {
        counters.disputes_lost += 1;
        if matches!(code_number, Some(100..=199)) {
            counters.policy_aborts += 1;
        }
    }
    if opposing_fault {
        counters.disputes_won += 1;
    }
    if role == "PROVIDER" && matches!(code_number, Some(420) | Some(421) | Some(430)) {
        counters.sla_violations += 1;
    }

    let impact: i64 = if completed && judgment.dbl_determination == FaultDomain::NoFault {
        match role {
            "PROVIDER" => 5,
            "BUYER" => 3,
            _ => 0,
        }
    } else if at_fault {
        judgment.passport_impact
    } else {
        0
    };

    let delta_bp = (impact as f64 * judgment.confidence).round() as i64;
    *score_bp += delta_bp;

    HistoryEntry {
        stable_id: stable_id.to_string(),
        role: role.to_string(),
        status: judgment.status.clone(),
        failure_code: failure_code.map(str::to_string),
        impact,
        confidence: judgment.confidence,
        delta: delta_bp as f64 / 100.0,
    }
}
