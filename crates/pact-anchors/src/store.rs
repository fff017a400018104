//! JSON file persistence for the registry.
//!
//! Append-only in spirit: the store is the full attestation list, written
//! atomically (temp file + rename) so a crashed write never truncates it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use pact_types::AnchorAttestation;

use crate::error::RegistryError;
use crate::registry::AnchorRegistry;
use crate::Result;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: String,
    anchors: Vec<AnchorAttestation>,
}

const STORE_VERSION: &str = "anchor-store/1.0";

/// Load a registry from disk. A missing file is an empty registry.
pub fn load_store(path: &Path) -> Result<AnchorRegistry> {
    if !path.exists() {
        return Ok(AnchorRegistry::new());
    }
    let bytes = std::fs::read(path)?;
    let store: StoreFile = serde_json::from_slice(&bytes)?;
    Ok(AnchorRegistry::from_anchors(store.anchors))
}

/// Persist a registry atomically.
pub fn save_store(path: &Path, registry: &AnchorRegistry) -> Result<()> {
    let store = StoreFile {
        version: STORE_VERSION.to_string(),
        anchors: registry.anchors().to_vec(),
    };
    let bytes = serde_json::to_vec_pretty(&store)?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let temp = match dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new_in(".")?,
    };
    std::fs::write(temp.path(), &bytes)?;
    temp.persist(path)
        .map_err(|e| RegistryError::Persist(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;
    use pact_types::{AnchorIssueRequest, AnchorType};
    use rand::rngs::OsRng;

    #[test]
    fn round_trips_through_disk() {
        let issuer = SigningKey::generate(&mut OsRng);
        let mut registry = AnchorRegistry::new();
        let anchor = registry
            .issue(
                AnchorIssueRequest {
                    subject_signer_public_key_b58: "subject-pk".into(),
                    anchor_type: AnchorType::DomainVerified,
                    verification_method: "dns_txt".into(),
                    display_name: None,
                    payload: serde_json::json!({
                        "account_id_fingerprint":
                            format!("sha256:{}", pact_crypto::sha256_hex(b"example.org")),
                    }),
                    expires_at_ms: None,
                },
                &issuer,
                1000,
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchors.json");
        save_store(&path, &registry).unwrap();

        let reloaded = load_store(&path).unwrap();
        let found = reloaded.by_subject("subject-pk");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].anchor_id, anchor.anchor_id);
        assert!(crate::verify_attestation(found[0]));
    }

    #[test]
    fn missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = load_store(&dir.path().join("absent.json")).unwrap();
        assert!(registry.anchors().is_empty());
    }
}
