//! The in-memory registry.

use ed25519_dalek::{Signer, SigningKey};
use serde_json::{json, Value};
use tracing::debug;

use pact_types::{AnchorAttestation, AnchorIssueRequest};

use crate::error::RegistryError;
use crate::Result;

/// Payload keys that would carry raw identity material. Producers must
/// fingerprint these before issuance.
const FORBIDDEN_PAYLOAD_KEYS: &[&str] = &["account_id", "email", "phone", "tax_id", "credential"];

/// Insertion-ordered anchor store, indexed by subject public key.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    anchors: Vec<AnchorAttestation>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted attestations.
    pub fn from_anchors(anchors: Vec<AnchorAttestation>) -> Self {
        Self { anchors }
    }

    /// All attestations, issuance order.
    pub fn anchors(&self) -> &[AnchorAttestation] {
        &self.anchors
    }

    /// Issue a new attestation.
    ///
    /// Deduplicates on `(subject, anchor_type, verification_method,
    /// payload.account_id_fingerprint)`; an exact duplicate is refused
    /// with the existing anchor id. The anchor id is derived from the
    /// dedup key, so re-issuing after a wipe reproduces the same id.
    pub fn issue(
        &mut self,
        request: AnchorIssueRequest,
        issuer: &SigningKey,
        issued_at_ms: i64,
    ) -> Result<AnchorAttestation> {
        let fingerprint = validate_payload(&request.payload)?;

        let dedupe_key = json!({
            "subject": request.subject_signer_public_key_b58,
            "anchor_type": request.anchor_type,
            "verification_method": request.verification_method,
            "fingerprint": fingerprint,
        });
        let dedupe_hash = pact_canonical::canonical_sha256_hex(&dedupe_key)
            .expect("dedupe key canonicalizes");
        let anchor_id = format!("anchor-{}", &dedupe_hash[..16]);

        if let Some(existing) = self.anchors.iter().find(|a| a.anchor_id == anchor_id) {
            return Err(RegistryError::DuplicateAnchor {
                existing_anchor_id: existing.anchor_id.clone(),
            });
        }

        let mut anchor = AnchorAttestation {
            anchor_id: anchor_id.clone(),
            subject_signer_public_key_b58: request.subject_signer_public_key_b58,
            anchor_type: request.anchor_type,
            verification_method: request.verification_method,
            display_name: request.display_name,
            payload: request.payload,
            issued_at_ms,
            expires_at_ms: request.expires_at_ms,
            revoked: false,
            revoked_at_ms: None,
            reason: None,
            issuer_public_key_b58: bs58::encode(issuer.verifying_key().as_bytes()).into_string(),
            issuer_sig_b58: String::new(),
        };
        anchor.issuer_sig_b58 = sign_anchor(&anchor, issuer);

        debug!(anchor_id = %anchor_id, subject = %anchor.subject_signer_public_key_b58, "issued anchor");
        self.anchors.push(anchor.clone());
        Ok(anchor)
    }

    /// Attestations for a subject, issuance order, revoked included.
    pub fn by_subject(&self, subject_pubkey_b58: &str) -> Vec<&AnchorAttestation> {
        self.anchors
            .iter()
            .filter(|a| a.subject_signer_public_key_b58 == subject_pubkey_b58)
            .collect()
    }

    /// Revoke an anchor. Idempotent: revoking twice keeps the first
    /// revocation's timestamp and reason.
    pub fn revoke(
        &mut self,
        anchor_id: &str,
        reason: Option<String>,
        revoked_at_ms: i64,
    ) -> Result<()> {
        let anchor = self
            .anchors
            .iter_mut()
            .find(|a| a.anchor_id == anchor_id)
            .ok_or_else(|| RegistryError::AnchorNotFound {
                anchor_id: anchor_id.to_string(),
            })?;
        if anchor.revoked {
            return Ok(());
        }
        anchor.revoked = true;
        anchor.revoked_at_ms = Some(revoked_at_ms);
        anchor.reason = reason;
        debug!(anchor_id, "revoked anchor");
        Ok(())
    }
}

/// Canonical signing payload: the attestation without its signature.
/// Revocation fields are excluded so a later revoke does not invalidate
/// the issuance signature.
fn signing_payload(anchor: &AnchorAttestation) -> Value {
    let mut value = serde_json::to_value(anchor).expect("anchors serialize");
    let obj = value.as_object_mut().expect("anchor is an object");
    obj.remove("issuer_sig_b58");
    obj.remove("revoked");
    obj.remove("revoked_at_ms");
    obj.remove("reason");
    value
}

fn sign_anchor(anchor: &AnchorAttestation, issuer: &SigningKey) -> String {
    let digest = pact_canonical::canonical_sha256_hex(&signing_payload(anchor))
        .expect("anchor canonicalizes");
    let digest_bytes = hex::decode(digest).expect("sha256 hex decodes");
    let sig = issuer.sign(&digest_bytes);
    bs58::encode(sig.to_bytes()).into_string()
}

/// Verify the issuer signature on an attestation.
pub fn verify_attestation(anchor: &AnchorAttestation) -> bool {
    let digest = match pact_canonical::canonical_sha256_hex(&signing_payload(anchor)) {
        Ok(d) => d,
        Err(_) => return false,
    };
    let Ok(digest_bytes) = hex::decode(digest) else {
        return false;
    };
    pact_crypto::ed25519_verify_b58(
        &anchor.issuer_public_key_b58,
        &digest_bytes,
        &anchor.issuer_sig_b58,
    )
    .is_ok()
}

/// Enforce the fingerprint-only contract and return the fingerprint.
fn validate_payload(payload: &Value) -> Result<String> {
    let Some(obj) = payload.as_object() else {
        return Err(RegistryError::MissingFingerprint);
    };
    for key in FORBIDDEN_PAYLOAD_KEYS {
        if obj.contains_key(*key) {
            return Err(RegistryError::RawIdentityMaterial {
                field: key.to_string(),
            });
        }
    }
    let fingerprint = obj
        .get("account_id_fingerprint")
        .and_then(Value::as_str)
        .ok_or(RegistryError::MissingFingerprint)?;
    let hex_part = fingerprint
        .strip_prefix("sha256:")
        .ok_or_else(|| RegistryError::BadFingerprint {
            value: fingerprint.to_string(),
        })?;
    if hex_part.len() != 64 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RegistryError::BadFingerprint {
            value: fingerprint.to_string(),
        });
    }
    Ok(fingerprint.to_string())
}
