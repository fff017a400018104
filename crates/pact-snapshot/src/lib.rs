//! # pact-snapshot
//!
//! Fuses transcripts and anchor attestations into a reproducible entity
//! graph (`pact-passport-snapshot/0.0`): per-signer domain reliability
//! from claims, anchor badges, and recommendations for downstream
//! trust decisions.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::debug;

use pact_types::{
    AnchorAttestation, AnchorBadge, Claim, DomainEntry, DomainMetrics, Recommendation,
    RoundContent, RoundType, Snapshot, SnapshotEntity, SnapshotMode, Transcript, SNAPSHOT_VERSION,
};

/// Baseline identity reliability before anchors weigh in.
const BASE_RELIABILITY: i64 = 50;
/// Bonus for a live trust anchor (kyb / platform / service_account / oidc).
const TRUST_ANCHOR_BONUS: i64 = 5;
/// Penalty per revoked anchor.
const REVOKED_PENALTY: i64 = 10;
/// Cap on the total revocation penalty.
const REVOKED_PENALTY_CAP: i64 = 20;

/// Map a claim confidence in [0, 1] to reliability in [0, 100].
pub fn confidence_to_reliability(confidence: f64) -> i64 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() as i64
}

/// Reliability penalty for `k` revoked anchors: `min(20, 10·k)`.
pub fn reliability_penalty(revoked_count: usize) -> i64 {
    (REVOKED_PENALTY * revoked_count as i64).min(REVOKED_PENALTY_CAP)
}

/// Domain id of a claim subject: the first two colon segments
/// (`art:authenticity:lot-17` → `art:authenticity`).
fn domain_of(subject: &str) -> String {
    let mut segments = subject.splitn(3, ':');
    match (segments.next(), segments.next()) {
        (Some(a), Some(b)) => format!("{a}:{b}"),
        (Some(a), None) => a.to_string(),
        _ => String::new(),
    }
}

/// Build a snapshot from transcripts and an anchor set.
pub fn build_snapshot(
    transcripts: &[Transcript],
    anchors: &[AnchorAttestation],
    mode: SnapshotMode,
) -> Snapshot {
    // Signers from transcripts, then anchor-only subjects.
    let mut signers: Vec<String> = Vec::new();
    for transcript in transcripts {
        for signer in transcript.signers() {
            if !signers.contains(&signer) {
                signers.push(signer);
            }
        }
    }
    for anchor in anchors {
        let subject = &anchor.subject_signer_public_key_b58;
        if !signers.contains(subject) {
            signers.push(subject.clone());
        }
    }

    // (signer, domain) -> max claim confidence.
    let mut domain_conf: BTreeMap<(String, String), f64> = BTreeMap::new();
    for transcript in transcripts {
        for round in &transcript.rounds {
            for claim in round.content().claims() {
                let domain = domain_of(&claim.subject);
                if domain.is_empty() {
                    continue;
                }
                let key = (round.signer_key().to_string(), domain);
                let entry = domain_conf.entry(key).or_insert(claim.conf);
                if claim.conf > *entry {
                    *entry = claim.conf;
                }
            }
        }
    }

    let mut entities: Vec<SnapshotEntity> = signers
        .iter()
        .map(|signer| build_entity(signer, &domain_conf, anchors))
        .collect();
    entities.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));

    let recommendations = build_recommendations(transcripts, anchors);

    let projection = json!({
        "version": SNAPSHOT_VERSION,
        "entities": serde_json::to_value(&entities).expect("entities serialize"),
        "recommendations": serde_json::to_value(&recommendations).expect("recommendations serialize"),
    });
    let hashed = match mode {
        SnapshotMode::Standard => projection,
        SnapshotMode::Deterministic => pact_canonical::sort_keys_deep(&projection),
    };
    let snapshot_id = format!(
        "snapshot-{}",
        pact_canonical::canonical_sha256_hex(&hashed).expect("projection canonicalizes")
    );
    debug!(entities = entities.len(), %snapshot_id, "built snapshot");

    Snapshot {
        version: SNAPSHOT_VERSION.to_string(),
        snapshot_id,
        mode,
        entities,
        recommendations,
    }
}

/// `entity-<sha256(canonical({signer_public_key_b58}))>`.
pub fn entity_id_for(signer_public_key_b58: &str) -> String {
    let projection = json!({ "signer_public_key_b58": signer_public_key_b58 });
    format!(
        "entity-{}",
        pact_canonical::canonical_sha256_hex(&projection).expect("projection canonicalizes")
    )
}

fn build_entity(
    signer: &str,
    domain_conf: &BTreeMap<(String, String), f64>,
    anchors: &[AnchorAttestation],
) -> SnapshotEntity {
    let domains: Vec<DomainEntry> = domain_conf
        .iter()
        .filter(|((s, _), _)| s == signer)
        .map(|((_, domain), conf)| DomainEntry {
            domain_id: domain.clone(),
            metrics: DomainMetrics {
                reliability_score: confidence_to_reliability(*conf),
            },
        })
        .collect();

    let own_anchors: Vec<&AnchorAttestation> = anchors
        .iter()
        .filter(|a| a.subject_signer_public_key_b58 == signer)
        .collect();
    let badges: Vec<AnchorBadge> = own_anchors
        .iter()
        .map(|a| AnchorBadge {
            anchor_id: a.anchor_id.clone(),
            anchor_type: a.anchor_type,
            revoked: a.revoked,
            display_name: a.display_name.clone(),
        })
        .collect();

    let has_trust_anchor = own_anchors
        .iter()
        .any(|a| !a.revoked && a.anchor_type.is_trust_anchor());
    let revoked_count = own_anchors.iter().filter(|a| a.revoked).count();
    let base_reliability = BASE_RELIABILITY
        + if has_trust_anchor { TRUST_ANCHOR_BONUS } else { 0 }
        - reliability_penalty(revoked_count);

    SnapshotEntity {
        entity_id: entity_id_for(signer),
        signer_public_key_b58: signer.to_string(),
        base_reliability,
        domains,
        anchors: badges,
    }
}

fn build_recommendations(
    transcripts: &[Transcript],
    anchors: &[AnchorAttestation],
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for transcript in transcripts {
        // Trust gates declared on the intent.
        if let Some(intent) = transcript.rounds.first() {
            if let RoundContent::Intent {
                min_reliability_gate,
                min_calibration_gate,
                ..
            } = intent.content()
            {
                if min_reliability_gate.is_some() || min_calibration_gate.is_some() {
                    recommendations.push(Recommendation {
                        kind: "trust_gate".to_string(),
                        entity_id: Some(entity_id_for(intent.signer_key())),
                        domain_id: None,
                        detail: format!(
                            "intent {} gates counterparties at reliability {:?} calibration {:?}",
                            transcript.transcript_id, min_reliability_gate, min_calibration_gate
                        ),
                    });
                }
            }
        }

        authenticity_recommendation(transcript, &mut recommendations);

        // A concluded ACCEPT on a procurement intent is a provider pick.
        if transcript.intent_type == "api.procurement"
            && transcript
                .rounds_of_type(RoundType::Accept)
                .next()
                .is_some()
        {
            if let Some(provider) = transcript.provider_of_record() {
                recommendations.push(Recommendation {
                    kind: "provider_selection".to_string(),
                    entity_id: Some(entity_id_for(&provider)),
                    domain_id: None,
                    detail: format!(
                        "accepted provider for {}",
                        transcript.transcript_id
                    ),
                });
            }
        }
    }

    for anchor in anchors.iter().filter(|a| a.revoked) {
        let entity = entity_id_for(&anchor.subject_signer_public_key_b58);
        recommendations.push(Recommendation {
            kind: "avoid_revoked_identity".to_string(),
            entity_id: Some(entity.clone()),
            domain_id: None,
            detail: format!("anchor {} is revoked", anchor.anchor_id),
        });
        recommendations.push(Recommendation {
            kind: "revocation_warning".to_string(),
            entity_id: Some(entity),
            domain_id: None,
            detail: format!(
                "anchor {} revoked{}",
                anchor.anchor_id,
                anchor
                    .reason
                    .as_deref()
                    .map(|r| format!(": {r}"))
                    .unwrap_or_default()
            ),
        });
    }

    recommendations
}

/// Authenticity rerun logic: conflicting confidence (a reading below
/// 0.80 alongside one at or above 0.90) escalates unless a later
/// high-confidence rerun already cleared it.
fn authenticity_recommendation(transcript: &Transcript, out: &mut Vec<Recommendation>) {
    let claims: Vec<Claim> = transcript
        .rounds
        .iter()
        .flat_map(|r| r.content().claims().to_vec())
        .filter(|c| domain_of(&c.subject) == "art:authenticity")
        .collect();
    if claims.is_empty() {
        return;
    }

    let min = claims.iter().map(|c| c.conf).fold(f64::INFINITY, f64::min);
    let max = claims.iter().map(|c| c.conf).fold(f64::NEG_INFINITY, f64::max);
    if !(min < 0.80 && max >= 0.90) {
        return;
    }

    let first_low = claims.iter().position(|c| c.conf < 0.80).unwrap_or(0);
    let rerun_after_low = claims[first_low..].iter().any(|c| c.conf >= 0.90);

    let kind = if rerun_after_low { "cleared" } else { "rerun_escalate" };
    out.push(Recommendation {
        kind: kind.to_string(),
        entity_id: None,
        domain_id: Some("art:authenticity".to_string()),
        detail: format!(
            "{}: authenticity confidence spans {:.2}..{:.2}",
            transcript.transcript_id, min, max
        ),
    });
}
