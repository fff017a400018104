//! Signed fixture builders for conformance scenarios.
//!
//! Key generation lives here, in test support, and nowhere else: the
//! verifier core only ever consumes keys.

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use serde_json::{json, Value};

use pact_types::Transcript;

/// All-zero genesis hash for round 0.
pub const GENESIS: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// A buyer/provider key pair with fixture helpers.
pub struct Counterparties {
    pub buyer: SigningKey,
    pub provider: SigningKey,
}

impl Default for Counterparties {
    fn default() -> Self {
        Self::new()
    }
}

impl Counterparties {
    pub fn new() -> Self {
        Self {
            buyer: SigningKey::generate(&mut OsRng),
            provider: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn buyer_pk(&self) -> String {
        encode_pk(&self.buyer)
    }

    pub fn provider_pk(&self) -> String {
        encode_pk(&self.provider)
    }
}

pub fn encode_pk(key: &SigningKey) -> String {
    bs58::encode(key.verifying_key().as_bytes()).into_string()
}

/// Build and sign one round. The signature covers the SHA-256 of the
/// canonical round payload, exactly as the verifier recomputes it.
pub fn signed_round(
    key: &SigningKey,
    n: u64,
    round_type: &str,
    agent_id: &str,
    content: Value,
    prev_hash: &str,
) -> Value {
    let mut round = json!({
        "round_number": n,
        "round_type": round_type,
        "agent_id": agent_id,
        "prev_hash_hex": prev_hash,
        "content_summary": content,
        "timestamp_ms": 1_714_000_000_000i64 + n as i64 * 1000
    });
    let payload_hash = pact_canonical::canonical_sha256_hex(&round)
        .expect("fixture rounds canonicalize");
    let digest = hex::decode(&payload_hash).expect("sha256 hex decodes");
    let sig = key.sign(&digest);
    round["signature"] = json!({
        "signer_public_key_b58": encode_pk(key),
        "sig_b58": bs58::encode(sig.to_bytes()).into_string(),
        "signed_payload_hash_hex": payload_hash
    });
    round
}

/// Signed payload hash of a built round.
pub fn hash_of(round: &Value) -> String {
    round["signature"]["signed_payload_hash_hex"]
        .as_str()
        .expect("built rounds carry a hash")
        .to_string()
}

/// Assemble a transcript document from built rounds.
pub fn transcript_doc(
    id: &str,
    intent_type: &str,
    rounds: Vec<Value>,
    failure_code: Option<&str>,
    with_final_hash: bool,
) -> Value {
    let final_hash = rounds.last().map(hash_of);
    let mut doc = json!({
        "version": "pact-transcript/4.0",
        "transcript_id": id,
        "intent_type": intent_type,
        "created_at_ms": 1_714_000_000_000i64,
        "policy_hash": "policy-v1",
        "rounds": rounds
    });
    if let Some(code) = failure_code {
        doc["failure_event"] = json!({ "code": code });
    }
    if with_final_hash {
        if let Some(hash) = final_hash {
            doc["final_hash"] = json!(hash);
        }
    }
    doc
}

/// SUCCESS-001-simple: INTENT → ASK → ACCEPT → COMMIT → REVEAL with a
/// hash-matching reveal and a recorded final hash.
pub fn success_doc(pair: &Counterparties, id: &str) -> Value {
    let goods = "api credential bundle";
    let commitment = pact_crypto::sha256_hex(goods.as_bytes());
    // The reference ties the signed content to the fixture id, so two
    // fixtures never collide on stable transcript id by accident.
    let r0 = signed_round(
        &pair.buyer,
        0,
        "INTENT",
        "acme-buyer",
        json!({"description": "weather feed", "reference": id}),
        GENESIS,
    );
    let r1 = signed_round(
        &pair.provider,
        1,
        "ASK",
        "weather-co",
        json!({"price": "10.00"}),
        &hash_of(&r0),
    );
    let r2 = signed_round(
        &pair.buyer,
        2,
        "ACCEPT",
        "acme-buyer",
        json!({"price": "10.00", "to": pair.provider_pk()}),
        &hash_of(&r1),
    );
    let r3 = signed_round(
        &pair.provider,
        3,
        "COMMIT",
        "weather-co",
        json!({"commitment_hash_hex": commitment}),
        &hash_of(&r2),
    );
    let r4 = signed_round(
        &pair.provider,
        4,
        "REVEAL",
        "weather-co",
        json!({"reveal_data": goods}),
        &hash_of(&r3),
    );
    transcript_doc(id, "api.procurement", vec![r0, r1, r2, r3, r4], None, true)
}

/// Parse a document the way the verifier does.
pub fn parse(doc: &Value) -> Transcript {
    pact_verifier::parse_transcript(doc.to_string().as_bytes())
        .expect("fixture documents parse")
}
