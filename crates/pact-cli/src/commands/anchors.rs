//! `anchor issue|revoke|list` against a local JSON store.
//!
//! The HTTP registry is a separate collaborator; these commands operate
//! the same core registry against the persisted layout directly.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use ed25519_dalek::SigningKey;

use pact_anchors::{load_store, save_store};
use pact_types::{AnchorIssueRequest, AnchorType};

use crate::io::now_ms;

#[derive(Subcommand)]
pub enum AnchorCommands {
    /// Issue an attestation for a subject key
    Issue {
        /// Anchor store JSON
        #[arg(long, default_value = "anchors.json")]
        store: PathBuf,

        /// Issuer signing key file (32-byte seed, hex)
        #[arg(long)]
        issuer_key: PathBuf,

        /// Subject signer public key (Base58)
        #[arg(long)]
        subject: String,

        /// kyb_verified, credential_verified, platform_verified,
        /// service_account_verified, oidc_verified or domain_verified
        #[arg(long)]
        anchor_type: String,

        /// How the attested fact was verified
        #[arg(long, default_value = "registry_lookup")]
        verification_method: String,

        /// Display name for viewers
        #[arg(long)]
        display_name: Option<String>,

        /// Raw account id; only its SHA-256 fingerprint is stored
        #[arg(long)]
        account_id: String,
    },

    /// Revoke an anchor by id
    Revoke {
        #[arg(long, default_value = "anchors.json")]
        store: PathBuf,

        #[arg(long)]
        anchor_id: String,

        #[arg(long)]
        reason: Option<String>,
    },

    /// List anchors for a subject key
    List {
        #[arg(long, default_value = "anchors.json")]
        store: PathBuf,

        #[arg(long)]
        subject: String,
    },
}

pub fn run(command: AnchorCommands) -> Result<ExitCode> {
    match command {
        AnchorCommands::Issue {
            store,
            issuer_key,
            subject,
            anchor_type,
            verification_method,
            display_name,
            account_id,
        } => {
            let issuer = read_signing_key(&issuer_key)?;
            let anchor_type = parse_anchor_type(&anchor_type)?;
            let fingerprint =
                format!("sha256:{}", pact_crypto::sha256_hex(account_id.as_bytes()));

            let mut registry = load_store(&store)?;
            let anchor = registry.issue(
                AnchorIssueRequest {
                    subject_signer_public_key_b58: subject,
                    anchor_type,
                    verification_method,
                    display_name,
                    payload: serde_json::json!({
                        "account_id_fingerprint": fingerprint,
                    }),
                    expires_at_ms: None,
                },
                &issuer,
                now_ms(),
            )?;
            save_store(&store, &registry)?;

            let value = serde_json::to_value(&anchor)?;
            println!("{}", pact_canonical::canonical_string(&value)?);
            Ok(ExitCode::SUCCESS)
        }

        AnchorCommands::Revoke {
            store,
            anchor_id,
            reason,
        } => {
            let mut registry = load_store(&store)?;
            registry.revoke(&anchor_id, reason, now_ms())?;
            save_store(&store, &registry)?;
            eprintln!("revoked {anchor_id}");
            Ok(ExitCode::SUCCESS)
        }

        AnchorCommands::List { store, subject } => {
            let registry = load_store(&store)?;
            let anchors: Vec<_> = registry.by_subject(&subject).into_iter().collect();
            let value = serde_json::to_value(&anchors)?;
            println!("{}", pact_canonical::canonical_string(&value)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_signing_key(path: &PathBuf) -> Result<SigningKey> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading issuer key {}", path.display()))?;
    let bytes = hex::decode(text.trim()).context("issuer key must be hex")?;
    let seed: [u8; 32] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("issuer key must be a 32-byte seed"))?;
    Ok(SigningKey::from_bytes(&seed))
}

fn parse_anchor_type(s: &str) -> Result<AnchorType> {
    match s {
        "kyb_verified" => Ok(AnchorType::KybVerified),
        "credential_verified" => Ok(AnchorType::CredentialVerified),
        "platform_verified" => Ok(AnchorType::PlatformVerified),
        "service_account_verified" => Ok(AnchorType::ServiceAccountVerified),
        "oidc_verified" => Ok(AnchorType::OidcVerified),
        "domain_verified" => Ok(AnchorType::DomainVerified),
        other => bail!("unknown anchor type: {other}"),
    }
}
