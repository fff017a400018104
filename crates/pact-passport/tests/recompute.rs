//! Recompute behavior over signed fixtures: deltas, ordering, idempotency.

use ed25519_dalek::{Signer, SigningKey};
use proptest::prelude::*;
use rand::rngs::OsRng;
use serde_json::{json, Value};

use pact_passport::{recompute, stable_transcript_id};
use pact_types::Tier;

const GENESIS: &str = "0000000000000000000000000000000000000000000000000000000000000000";

fn signed_round(key: &SigningKey, n: u64, round_type: &str, content: Value, prev: &str) -> Value {
    let mut round = json!({
        "round_number": n,
        "round_type": round_type,
        "prev_hash_hex": prev,
        "content_summary": content,
        "timestamp_ms": 1_700_000_000_000i64 + n as i64
    });
    let payload_hash = pact_canonical::canonical_sha256_hex(&round).unwrap();
    let sig = key.sign(&hex::decode(&payload_hash).unwrap());
    round["signature"] = json!({
        "signer_public_key_b58": bs58::encode(key.verifying_key().as_bytes()).into_string(),
        "sig_b58": bs58::encode(sig.to_bytes()).into_string(),
        "signed_payload_hash_hex": payload_hash
    });
    round
}

fn hash_of(round: &Value) -> String {
    round["signature"]["signed_payload_hash_hex"]
        .as_str()
        .unwrap()
        .to_string()
}

struct Pair {
    buyer: SigningKey,
    provider: SigningKey,
}

impl Pair {
    fn new() -> Self {
        Self {
            buyer: SigningKey::generate(&mut OsRng),
            provider: SigningKey::generate(&mut OsRng),
        }
    }

    fn buyer_pk(&self) -> String {
        bs58::encode(self.buyer.verifying_key().as_bytes()).into_string()
    }

    fn provider_pk(&self) -> String {
        bs58::encode(self.provider.verifying_key().as_bytes()).into_string()
    }

    /// Clean INTENT → ASK → ACCEPT → COMMIT → REVEAL settlement.
    fn completed(&self, id: &str, seq: i64) -> pact_types::Transcript {
        let goods = format!("deliverable-{seq}");
        let commitment = pact_crypto::sha256_hex(goods.as_bytes());
        let r0 = signed_round(&self.buyer, 0, "INTENT", json!({"seq": seq}), GENESIS);
        let r1 = signed_round(&self.provider, 1, "ASK", json!({"price": "10"}), &hash_of(&r0));
        let r2 = signed_round(&self.buyer, 2, "ACCEPT", json!({"price": "10"}), &hash_of(&r1));
        let r3 = signed_round(
            &self.provider,
            3,
            "COMMIT",
            json!({"commitment_hash_hex": commitment}),
            &hash_of(&r2),
        );
        let r4 = signed_round(
            &self.provider,
            4,
            "REVEAL",
            json!({"reveal_data": goods}),
            &hash_of(&r3),
        );
        self.parse(id, vec![r0, r1, r2, r3, r4], None)
    }

    /// Provider never acknowledged; ends with PACT-420.
    fn unreachable(&self, id: &str, seq: i64) -> pact_types::Transcript {
        let r0 = signed_round(&self.buyer, 0, "INTENT", json!({"seq": seq}), GENESIS);
        let r1 = signed_round(&self.provider, 1, "ASK", json!({"price": "10"}), &hash_of(&r0));
        self.parse(id, vec![r0, r1], Some("PACT-420"))
    }

    fn parse(
        &self,
        id: &str,
        rounds: Vec<Value>,
        failure: Option<&str>,
    ) -> pact_types::Transcript {
        let mut doc = json!({
            "version": "pact-transcript/4.0",
            "transcript_id": id,
            "intent_type": "api.procurement",
            "created_at_ms": 1_700_000_000_000i64,
            "policy_hash": "policy-v1",
            "rounds": rounds
        });
        if let Some(code) = failure {
            doc["failure_event"] = json!({"code": code});
        }
        pact_verifier::parse_transcript(doc.to_string().as_bytes()).unwrap()
    }
}

#[test]
fn completed_settlement_credits_both_sides() {
    let pair = Pair::new();
    let registry = recompute(&[pair.completed("t-1", 1)], "chash", 1000);

    let provider = &registry.states[&pair.provider_pk()];
    assert_eq!(provider.score, 0.05);
    assert_eq!(provider.tier, Tier::B);
    assert_eq!(provider.counters.successful_settlements, 1);

    let buyer = &registry.states[&pair.buyer_pk()];
    assert_eq!(buyer.score, 0.03);
    assert_eq!(buyer.counters.total_settlements, 1);
}

#[test]
fn provider_fault_penalizes_provider_only() {
    let pair = Pair::new();
    let registry = recompute(&[pair.unreachable("t-420", 1)], "chash", 1000);

    let provider = &registry.states[&pair.provider_pk()];
    // -10 clamped by confidence 0.9.
    assert_eq!(provider.score, -0.09);
    assert_eq!(provider.counters.disputes_lost, 1);
    assert_eq!(provider.counters.sla_violations, 1);

    let buyer = &registry.states[&pair.buyer_pk()];
    assert_eq!(buyer.score, 0.0);
    assert_eq!(buyer.counters.disputes_won, 1);
}

#[test]
fn folding_the_same_pack_twice_contributes_once() {
    let pair = Pair::new();
    let t = pair.completed("t-dup", 1);
    let once = recompute(&[t.clone()], "chash", 1000);
    let twice = recompute(&[t.clone(), t], "chash", 1000);

    assert_eq!(twice.warnings.len(), 1);
    assert_eq!(
        once.states[&pair.provider_pk()].state_hash,
        twice.states[&pair.provider_pk()].state_hash
    );
    assert_eq!(
        twice.records[&pair.provider_pk()].history.len(),
        1
    );
}

#[test]
fn history_is_ordered_by_stable_id() {
    let pair = Pair::new();
    let a = pair.completed("t-a", 1);
    let b = pair.completed("t-b", 2);
    let c = pair.unreachable("t-c", 3);
    let mut ids = vec![
        stable_transcript_id(&a),
        stable_transcript_id(&b),
        stable_transcript_id(&c),
    ];
    ids.sort();

    let registry = recompute(&[c, a, b], "chash", 1000);
    let history: Vec<String> = registry.records[&pair.provider_pk()]
        .history
        .iter()
        .map(|h| h.stable_id.clone())
        .collect();
    assert_eq!(history, ids);
}

#[test]
fn scores_accumulate_across_transcripts() {
    let pair = Pair::new();
    let registry = recompute(
        &[
            pair.completed("t-1", 1),
            pair.completed("t-2", 2),
            pair.unreachable("t-3", 3),
        ],
        "chash",
        1000,
    );
    let provider = &registry.states[&pair.provider_pk()];
    // +5 +5 -9 hundredths.
    assert_eq!(provider.score, 0.01);
    assert_eq!(provider.counters.total_settlements, 3);
    assert_eq!(provider.counters.successful_settlements, 2);
    assert_eq!(provider.counters.disputes_lost, 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    /// Permuting the inputs never changes the output registry.
    #[test]
    fn order_independence(seed in 0u64..1000) {
        let pair = Pair::new();
        let mut transcripts = vec![
            pair.completed("t-1", 1),
            pair.completed("t-2", 2),
            pair.unreachable("t-3", 3),
            pair.completed("t-4", 4),
        ];
        let baseline = recompute(&transcripts, "chash", 42);

        // Deterministic shuffle from the seed.
        let len = transcripts.len();
        for i in 0..len {
            let j = (seed as usize + i * 7) % len;
            transcripts.swap(i, j);
        }
        let shuffled = recompute(&transcripts, "chash", 42);

        let a = serde_json::to_value(&baseline).unwrap();
        let b = serde_json::to_value(&shuffled).unwrap();
        prop_assert_eq!(a, b);
    }
}
