//! Identity anchors: signed attestations about a signer public key.
//!
//! The registry never stores raw identity material; payloads carry only
//! `sha256:<hex>` fingerprints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kinds of identity anchors the registry issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorType {
    KybVerified,
    CredentialVerified,
    PlatformVerified,
    ServiceAccountVerified,
    OidcVerified,
    DomainVerified,
}

impl AnchorType {
    /// Whether this anchor kind counts as a trust anchor for reliability
    /// scoring (kyb / platform / service_account / oidc).
    pub fn is_trust_anchor(self) -> bool {
        matches!(
            self,
            Self::KybVerified
                | Self::PlatformVerified
                | Self::ServiceAccountVerified
                | Self::OidcVerified
        )
    }
}

impl std::fmt::Display for AnchorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::KybVerified => "kyb_verified",
            Self::CredentialVerified => "credential_verified",
            Self::PlatformVerified => "platform_verified",
            Self::ServiceAccountVerified => "service_account_verified",
            Self::OidcVerified => "oidc_verified",
            Self::DomainVerified => "domain_verified",
        };
        f.write_str(s)
    }
}

/// Issuance request, as posted to the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorIssueRequest {
    pub subject_signer_public_key_b58: String,
    pub anchor_type: AnchorType,

    /// How the attested fact was verified, e.g. `registry_lookup`.
    pub verification_method: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Type-specific payload. Must contain `account_id_fingerprint` as a
    /// `sha256:<hex>` value and no raw credentials.
    pub payload: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<i64>,
}

/// A stored, issuer-signed attestation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorAttestation {
    pub anchor_id: String,
    pub subject_signer_public_key_b58: String,
    pub anchor_type: AnchorType,
    pub verification_method: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    pub payload: Value,
    pub issued_at_ms: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<i64>,

    pub revoked: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at_ms: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    pub issuer_public_key_b58: String,
    pub issuer_sig_b58: String,
}

impl AnchorAttestation {
    /// The `account_id_fingerprint` of the payload, when present.
    pub fn fingerprint(&self) -> Option<&str> {
        self.payload
            .get("account_id_fingerprint")
            .and_then(Value::as_str)
    }
}
