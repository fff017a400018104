//! Hash-chain and signature verification.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use pact_types::transcript::GENESIS_PREV_HASH;
use pact_types::{FinalHashValidation, HashChainStatus, Round, RoundType, Transcript};

/// Per-round verification outcome.
#[derive(Debug, Clone, Serialize)]
pub struct RoundCheck {
    pub round_number: u64,
    /// Recomputed payload hash equals the stored one.
    pub payload_hash_ok: bool,
    /// Ed25519 signature verifies over the stored payload hash bytes.
    pub signature_ok: bool,
    /// `prev_hash_hex` links to the previous round (zero hash for round 0).
    pub link_ok: bool,
    pub recomputed_payload_hash: String,
}

impl RoundCheck {
    pub fn fully_valid(&self) -> bool {
        self.payload_hash_ok && self.signature_ok && self.link_ok
    }
}

/// One signature verification failure.
#[derive(Debug, Clone, Serialize)]
pub struct SignatureFailure {
    pub round_number: u64,
    pub reason: String,
}

/// Aggregated signature tally.
#[derive(Debug, Clone, Serialize)]
pub struct SignatureReport {
    pub verified: usize,
    pub total: usize,
    pub failures: Vec<SignatureFailure>,
}

/// Aggregated verification report. A single chain failure marks
/// `hash_chain` INVALID; signature failures are tallied without aborting.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    /// Rounds whose payload hash, signature and link all verify.
    pub rounds_verified: usize,
    pub hash_chain: HashChainStatus,
    pub signatures: SignatureReport,
    pub final_hash: FinalHashValidation,
    pub warnings: Vec<String>,
    pub round_checks: Vec<RoundCheck>,
}

impl VerifyReport {
    /// The report is clean: intact chain, every signature verified, and
    /// the recorded final hash (if any) matches.
    pub fn ok(&self) -> bool {
        self.hash_chain == HashChainStatus::Valid
            && self.signatures.verified == self.signatures.total
            && self.final_hash != FinalHashValidation::Mismatch
    }

    /// Greatest round index whose full prefix verifies, with its signed
    /// payload hash. The chain is sequential, so validity is prefix-wise.
    pub fn last_valid(&self) -> Option<(u64, &RoundCheck)> {
        let mut last = None;
        for check in &self.round_checks {
            if check.fully_valid() {
                last = Some((check.round_number, check));
            } else {
                break;
            }
        }
        last
    }
}

/// Recompute the signed payload hash for a round: SHA-256 over the
/// canonical form of the round without its `signature` block. Uses the
/// raw parsed JSON so unknown producer fields participate; falls back to
/// the typed fields for programmatically built rounds.
pub fn payload_hash_for_round(round: &Round) -> String {
    let mut value = if round.raw.is_null() {
        serde_json::to_value(round).expect("round serialization is infallible")
    } else {
        round.raw.clone()
    };
    if let Some(obj) = value.as_object_mut() {
        obj.remove("signature");
    }
    pact_canonical::canonical_sha256_hex(&value)
        .expect("parsed JSON has no non-finite numbers")
}

/// Verify a parsed transcript.
pub fn verify(transcript: &Transcript) -> VerifyReport {
    debug!(
        transcript_id = %transcript.transcript_id,
        rounds = transcript.rounds.len(),
        "verifying transcript"
    );

    let total = transcript.rounds.len();
    let mut round_checks = Vec::with_capacity(total);
    let mut failures = Vec::new();
    let mut warnings = Vec::new();
    let mut chain = HashChainStatus::Valid;

    if let Some(first) = transcript.rounds.first() {
        if first.round_type != RoundType::Intent {
            warnings.push(format!(
                "round 0 is {} rather than INTENT",
                first.round_type
            ));
        }
    }

    let mut prev_stored_hash: Option<&str> = None;
    let mut prev_timestamp: Option<i64> = None;

    for round in &transcript.rounds {
        let stored_hash = round.signature.signed_payload_hash_hex.as_str();
        let recomputed = payload_hash_for_round(round);
        let payload_hash_ok = recomputed == stored_hash;

        let signature_ok = match check_signature(round) {
            Ok(()) => true,
            Err(reason) => {
                failures.push(SignatureFailure {
                    round_number: round.round_number,
                    reason,
                });
                false
            }
        };

        let expected_prev = prev_stored_hash.unwrap_or(GENESIS_PREV_HASH);
        let link_ok = round.prev_hash_hex == expected_prev;

        if !payload_hash_ok || !link_ok {
            chain = HashChainStatus::Invalid;
            warn!(
                round = round.round_number,
                payload_hash_ok, link_ok, "hash chain failure"
            );
        }

        if let Some(prev_ts) = prev_timestamp {
            if round.timestamp_ms < prev_ts {
                warnings.push(format!(
                    "timestamp decreases at round {}",
                    round.round_number
                ));
            }
        }

        round_checks.push(RoundCheck {
            round_number: round.round_number,
            payload_hash_ok,
            signature_ok,
            link_ok,
            recomputed_payload_hash: recomputed,
        });
        prev_stored_hash = Some(stored_hash);
        prev_timestamp = Some(round.timestamp_ms);
    }

    let final_hash = match (&transcript.final_hash, prev_stored_hash) {
        (None, _) => FinalHashValidation::Absent,
        (Some(expected), Some(tip)) if expected == tip => FinalHashValidation::Match,
        (Some(_), _) => FinalHashValidation::Mismatch,
    };

    let verified = total - failures.len();
    let rounds_verified = round_checks.iter().filter(|c| c.fully_valid()).count();

    VerifyReport {
        rounds_verified,
        hash_chain: chain,
        signatures: SignatureReport {
            verified,
            total,
            failures,
        },
        final_hash,
        warnings,
        round_checks,
    }
}

/// Verify the round's Ed25519 signature over the stored payload hash
/// bytes. The signature attests the stored hash; content binding is the
/// payload-hash recompute's concern, so the two checks stay independent.
fn check_signature(round: &Round) -> Result<(), String> {
    let signer = round.signer_key();
    if signer.is_empty() {
        return Err("no signer public key".to_string());
    }
    let hash_bytes = hex::decode(&round.signature.signed_payload_hash_hex)
        .map_err(|_| "signed payload hash is not hex".to_string())?;
    pact_crypto::ed25519_verify_b58(signer, &hash_bytes, &round.signature.sig_b58)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_transcript;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::rngs::OsRng;
    use serde_json::json;

    struct Keys {
        buyer: SigningKey,
        provider: SigningKey,
    }

    impl Keys {
        fn new() -> Self {
            Self {
                buyer: SigningKey::generate(&mut OsRng),
                provider: SigningKey::generate(&mut OsRng),
            }
        }
    }

    fn signed_round(
        key: &SigningKey,
        n: u64,
        round_type: &str,
        content: Value,
        prev_hash: &str,
    ) -> Value {
        let mut round = json!({
            "round_number": n,
            "round_type": round_type,
            "agent_id": if n % 2 == 0 { "buyer" } else { "provider" },
            "prev_hash_hex": prev_hash,
            "content_summary": content,
            "timestamp_ms": 1_714_000_000_000i64 + n as i64 * 1000
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

    fn stored_hash(round: &Value) -> String {
        round["signature"]["signed_payload_hash_hex"]
            .as_str()
            .unwrap()
            .to_string()
    }

    fn build_doc(keys: &Keys) -> Value {
        let r0 = signed_round(
            &keys.buyer,
            0,
            "INTENT",
            json!({"description": "weather feed"}),
            GENESIS_PREV_HASH,
        );
        let r1 = signed_round(
            &keys.provider,
            1,
            "ASK",
            json!({"price": "10.00"}),
            &stored_hash(&r0),
        );
        let r2 = signed_round(
            &keys.buyer,
            2,
            "ACCEPT",
            json!({"price": "10.00"}),
            &stored_hash(&r1),
        );
        let final_hash = stored_hash(&r2);
        json!({
            "version": "pact-transcript/4.0",
            "transcript_id": "t-verify",
            "intent_type": "api.procurement",
            "created_at_ms": 1_714_000_000_000i64,
            "policy_hash": "policy-1",
            "rounds": [r0, r1, r2],
            "final_hash": final_hash
        })
    }

    #[test]
    fn clean_transcript_verifies() {
        let doc = build_doc(&Keys::new());
        let transcript = parse_transcript(doc.to_string().as_bytes()).unwrap();
        let report = verify(&transcript);
        assert!(report.ok());
        assert_eq!(report.hash_chain, HashChainStatus::Valid);
        assert_eq!(report.signatures.verified, 3);
        assert_eq!(report.final_hash, FinalHashValidation::Match);
        assert_eq!(report.rounds_verified, 3);
        let (last, check) = report.last_valid().unwrap();
        assert_eq!(last, 2);
        assert!(check.fully_valid());
    }

    #[test]
    fn tampered_content_breaks_chain_but_not_signatures() {
        let mut doc = build_doc(&Keys::new());
        doc["rounds"][1]["content_summary"]["price"] = json!("999.00");
        let transcript = parse_transcript(doc.to_string().as_bytes()).unwrap();
        let report = verify(&transcript);
        assert_eq!(report.hash_chain, HashChainStatus::Invalid);
        // The signature still attests the stored hash.
        assert_eq!(report.signatures.verified, 3);
        assert!(!report.ok());
        assert_eq!(report.last_valid().unwrap().0, 0);
    }

    #[test]
    fn forged_signature_is_tallied_without_breaking_chain() {
        let keys = Keys::new();
        let mut doc = build_doc(&keys);
        let outsider = SigningKey::generate(&mut OsRng);
        let hash = stored_hash(&doc["rounds"][1]);
        let sig = outsider.sign(&hex::decode(&hash).unwrap());
        doc["rounds"][1]["signature"]["sig_b58"] =
            json!(bs58::encode(sig.to_bytes()).into_string());
        let transcript = parse_transcript(doc.to_string().as_bytes()).unwrap();
        let report = verify(&transcript);
        assert_eq!(report.hash_chain, HashChainStatus::Valid);
        assert_eq!(report.signatures.verified, 2);
        assert_eq!(report.signatures.failures.len(), 1);
        assert_eq!(report.signatures.failures[0].round_number, 1);
        assert!(!report.ok());
    }

    #[test]
    fn final_hash_mismatch_keeps_chain_valid() {
        let mut doc = build_doc(&Keys::new());
        doc["final_hash"] = json!("ff".repeat(32));
        let transcript = parse_transcript(doc.to_string().as_bytes()).unwrap();
        let report = verify(&transcript);
        assert_eq!(report.hash_chain, HashChainStatus::Valid);
        assert_eq!(report.final_hash, FinalHashValidation::Mismatch);
        assert!(!report.ok());
    }

    #[test]
    fn broken_link_invalidates_chain() {
        let mut doc = build_doc(&Keys::new());
        doc["rounds"][2]["prev_hash_hex"] = json!("ab".repeat(32));
        let transcript = parse_transcript(doc.to_string().as_bytes()).unwrap();
        let report = verify(&transcript);
        assert_eq!(report.hash_chain, HashChainStatus::Invalid);
        assert_eq!(report.last_valid().unwrap().0, 1);
    }

    #[test]
    fn non_intent_round_zero_warns() {
        let keys = Keys::new();
        let r0 = signed_round(&keys.provider, 0, "ASK", json!({}), GENESIS_PREV_HASH);
        let doc = json!({
            "version": "pact-transcript/4.0",
            "transcript_id": "t-warn",
            "intent_type": "api.procurement",
            "created_at_ms": 0,
            "policy_hash": "p",
            "rounds": [r0]
        });
        let transcript = parse_transcript(doc.to_string().as_bytes()).unwrap();
        let report = verify(&transcript);
        assert!(report.warnings.iter().any(|w| w.contains("INTENT")));
    }

    #[test]
    fn unknown_producer_fields_participate_in_hash() {
        let keys = Keys::new();
        let mut doc = build_doc(&keys);
        // Adding a field after signing must break the payload hash.
        doc["rounds"][0]["vendor_note"] = json!("added later");
        let transcript = parse_transcript(doc.to_string().as_bytes()).unwrap();
        let report = verify(&transcript);
        assert_eq!(report.hash_chain, HashChainStatus::Invalid);
    }
}
