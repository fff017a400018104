//! Pack sealing.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use pact_constitution::{canonicalize_text, constitution_hash};

use crate::artifacts::{build_contention_report, build_outcome_events, Derived};
use crate::error::PackError;
use crate::layout::paths;
use crate::manifest::Manifest;
use crate::{Result, PACKAGE_VERSION};

/// Sealing options.
#[derive(Debug, Clone, Default)]
pub struct SealOptions {
    /// Accept a rulebook outside the compiled-in set. Recorded in the
    /// manifest and echoed by re-verification.
    pub allow_nonstandard: bool,

    /// Pre-built passport snapshot to embed, when requested.
    pub passport_snapshot: Option<Value>,

    /// Embed the contention report.
    pub include_contention: bool,

    /// Embed the outcome event log.
    pub include_outcome_events: bool,
}

/// What a successful seal produced.
#[derive(Debug, Clone)]
pub struct SealOutcome {
    pub transcript_id: String,
    pub transcript_hash: String,
    pub constitution_hash: String,
    pub included_artifacts: Vec<String>,
}

/// Seal an auditor pack.
///
/// The transcript is embedded verbatim (source bytes, whitespace and
/// all); derived artifacts are canonical JSON. The ZIP is written to a
/// temp file in the destination directory and renamed into place, so a
/// cancelled seal leaves no half-pack on disk.
pub fn seal_pack(
    transcript_bytes: &[u8],
    constitution_text: &str,
    out_path: &Path,
    created_at_ms: i64,
    tool_version: &str,
    options: &SealOptions,
) -> Result<SealOutcome> {
    let transcript = pact_verifier::parse_transcript(transcript_bytes)?;
    let transcript_value: Value = serde_json::from_slice(transcript_bytes)
        .expect("bytes parsed as a transcript re-parse as a value");
    let transcript_hash = pact_canonical::canonical_sha256_hex(&transcript_value)?;

    let canonical_constitution = canonicalize_text(constitution_text);
    let chash = constitution_hash(constitution_text);
    let (version, nonstandard) = match pact_constitution::lookup(&chash) {
        Some(accepted) => (accepted.version.to_string(), false),
        None if options.allow_nonstandard => ("nonstandard".to_string(), true),
        None => {
            return Err(pact_constitution::ConstitutionError::UnknownHash { hash: chash }.into())
        }
    };

    let derived = Derived::compute(&transcript, &version, &chash);

    // Entry path -> content bytes; BTreeMap keeps checksum lines sorted.
    let mut entries: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    entries.insert(paths::TRANSCRIPT.into(), transcript_bytes.to_vec());
    entries.insert(
        paths::CONSTITUTION.into(),
        canonical_constitution.into_bytes(),
    );
    entries.insert(
        paths::GC_VIEW.into(),
        canonical_json_bytes(&derived.gc_view)?,
    );
    entries.insert(
        paths::JUDGMENT.into(),
        canonical_json_bytes(&derived.judgment)?,
    );
    entries.insert(
        paths::INSURER_SUMMARY.into(),
        canonical_json_bytes(&derived.insurer_summary)?,
    );
    if let Some(snapshot) = &options.passport_snapshot {
        entries.insert(
            paths::PASSPORT_SNAPSHOT.into(),
            pact_canonical::canonical_bytes(snapshot)?,
        );
    }
    if options.include_contention {
        let report = build_contention_report(&transcript, &derived);
        entries.insert(
            paths::CONTENTION_REPORT.into(),
            pact_canonical::canonical_bytes(&report)?,
        );
    }
    if options.include_outcome_events {
        let events = build_outcome_events(&transcript);
        entries.insert(
            paths::OUTCOME_EVENTS.into(),
            pact_canonical::canonical_bytes(&events)?,
        );
    }

    let included_artifacts: Vec<String> = entries.keys().cloned().collect();

    let manifest = Manifest {
        package_version: PACKAGE_VERSION.to_string(),
        created_at_ms,
        constitution_version: version,
        constitution_hash: chash.clone(),
        nonstandard_constitution: nonstandard,
        transcript_id: transcript.transcript_id.clone(),
        transcript_hash: transcript_hash.clone(),
        tool_version: tool_version.to_string(),
        included_artifacts: included_artifacts.clone(),
        integrity: derived.gc_view.integrity.clone(),
        outcome: derived.gc_view.executive_summary.clone(),
        responsibility: derived.gc_view.responsibility.clone(),
    };
    entries.insert(paths::MANIFEST.into(), canonical_json_bytes(&manifest)?);
    entries.insert(paths::README.into(), readme(&manifest).into_bytes());

    let checksums = checksum_lines(&entries);
    entries.insert(paths::CHECKSUMS.into(), checksums.into_bytes());

    write_zip_atomically(out_path, &entries)?;
    debug!(
        out = %out_path.display(),
        files = entries.len(),
        "sealed auditor pack"
    );

    Ok(SealOutcome {
        transcript_id: transcript.transcript_id,
        transcript_hash,
        constitution_hash: chash,
        included_artifacts,
    })
}

/// Canonical JSON bytes of a serializable artifact.
fn canonical_json_bytes<T: serde::Serialize>(artifact: &T) -> Result<Vec<u8>> {
    let value = serde_json::to_value(artifact).expect("artifacts serialize to JSON");
    Ok(pact_canonical::canonical_bytes(&value)?)
}

/// `<64-hex>␠␠<path>` lines, sorted by path.
fn checksum_lines(entries: &BTreeMap<String, Vec<u8>>) -> String {
    let mut out = String::new();
    for (path, bytes) in entries {
        out.push_str(&pact_crypto::sha256_hex(bytes));
        out.push_str("  ");
        out.push_str(path);
        out.push('\n');
    }
    out
}

fn readme(manifest: &Manifest) -> String {
    format!(
        "Pact auditor pack\n\
         =================\n\
         \n\
         Transcript: {}\n\
         Constitution: {} ({})\n\
         Sealed by: pact-pack {}\n\
         \n\
         Layout:\n\
         - input/transcript.json: the signed transcript, verbatim\n\
         - constitution/CONSTITUTION_v1.md: the rulebook, canonical form\n\
         - derived/: artifacts recomputable from the transcript\n\
         - manifest.json: provenance and echoed headlines\n\
         - checksums.sha256: SHA-256 per file\n\
         \n\
         Re-verify with: pact auditor-pack-verify <this file>\n",
        manifest.transcript_id, manifest.constitution_version, manifest.constitution_hash,
        manifest.tool_version,
    )
}

fn write_zip_atomically(out_path: &Path, entries: &BTreeMap<String, Vec<u8>>) -> Result<()> {
    let dir = out_path.parent().filter(|p| !p.as_os_str().is_empty());
    let temp = match dir {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new_in(".")?,
    };

    let mut zip = ZipWriter::new(temp.reopen()?);
    let zip_options = SimpleFileOptions::default();
    for (path, bytes) in entries {
        zip.start_file(path.as_str(), zip_options)?;
        zip.write_all(bytes)?;
    }
    zip.finish()?;

    temp.persist(out_path)
        .map_err(|e| PackError::Persist(e.to_string()))?;
    Ok(())
}
