//! Pack re-verification: byte-exact recompute of every derivation.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::artifacts::Derived;
use crate::layout::{paths, REQUIRED_FILES};
use crate::manifest::Manifest;
use crate::Result;

/// Additive-only paths per schema, stripped from both sides before
/// comparison. Implementations may extend these without breaking
/// re-verification; every other change is semantic and must mismatch.
/// Keyed by schema version so a future revision carries its own list.
struct AdditivePaths {
    gc_view: &'static [&'static str],
    insurer_summary: &'static [&'static str],
}

fn additive_paths(gc_view_version: &str) -> AdditivePaths {
    // All gc_view/1.x revisions share one list so far.
    let _ = gc_view_version;
    AdditivePaths {
        gc_view: &["audit", "policy.audit"],
        insurer_summary: &["audit_tier", "audit_sla"],
    }
}

/// Re-verification report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackVerifyReport {
    /// Checksums, recompute and constitution acceptance all pass.
    pub ok: bool,
    pub checksums_ok: bool,
    pub recompute_ok: bool,
    pub constitution_accepted: bool,

    /// The sealer declared a non-standard rulebook.
    pub nonstandard_declared: bool,

    pub mismatches: Vec<String>,
    pub tool_version: String,
}

/// Re-verify a sealed pack from disk.
///
/// Findings (missing files, checksum failures, recompute drift) land in
/// `mismatches[]`; an error return means the archive itself could not be
/// read.
pub fn verify_pack(
    pack_path: &Path,
    allow_nonstandard: bool,
    tool_version: &str,
) -> Result<PackVerifyReport> {
    let mut archive = ZipArchive::new(File::open(pack_path)?)?;
    let mut entries: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        entries.insert(entry.name().to_string(), bytes);
    }
    debug!(pack = %pack_path.display(), files = entries.len(), "re-verifying pack");

    let mut mismatches = Vec::new();

    for required in REQUIRED_FILES {
        if !entries.contains_key(*required) {
            mismatches.push(format!("missing required file: {required}"));
        }
    }

    let checksums_ok = check_checksums(&entries, &mut mismatches);
    let (constitution_accepted, nonstandard_declared, manifest) =
        check_constitution(&entries, &mut mismatches);
    let recompute_ok = recompute_and_compare(&entries, manifest.as_ref(), &mut mismatches);

    let files_present = REQUIRED_FILES.iter().all(|f| entries.contains_key(*f));
    let ok = files_present
        && checksums_ok
        && recompute_ok
        && (constitution_accepted || allow_nonstandard);

    if !ok {
        warn!(pack = %pack_path.display(), mismatches = mismatches.len(), "pack failed re-verification");
    }

    Ok(PackVerifyReport {
        ok,
        checksums_ok,
        recompute_ok,
        constitution_accepted,
        nonstandard_declared,
        mismatches,
        tool_version: tool_version.to_string(),
    })
}

/// Verify every checksum line and that every entry is covered.
fn check_checksums(entries: &BTreeMap<String, Vec<u8>>, mismatches: &mut Vec<String>) -> bool {
    let Some(checksum_bytes) = entries.get(paths::CHECKSUMS) else {
        return false;
    };
    let Ok(text) = std::str::from_utf8(checksum_bytes) else {
        mismatches.push(format!("{} is not UTF-8", paths::CHECKSUMS));
        return false;
    };

    let mut listed = BTreeMap::new();
    let mut ok = true;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let Some((hash, path)) = line.split_once("  ") else {
            mismatches.push(format!("malformed checksum line: {line}"));
            ok = false;
            continue;
        };
        listed.insert(path.to_string(), hash.to_string());
    }

    for (path, expected) in &listed {
        match entries.get(path) {
            None => {
                mismatches.push(format!("checksummed file missing from archive: {path}"));
                ok = false;
            }
            Some(bytes) => {
                let actual = pact_crypto::sha256_hex(bytes);
                if &actual != expected {
                    mismatches.push(format!(
                        "checksum mismatch for {path}: recorded {} computed {}",
                        prefix(expected),
                        prefix(&actual)
                    ));
                    ok = false;
                }
            }
        }
    }

    for path in entries.keys() {
        if path != paths::CHECKSUMS && !listed.contains_key(path) {
            mismatches.push(format!("file not covered by checksums: {path}"));
            ok = false;
        }
    }
    ok
}

/// Recompute the constitution hash and compare against the manifest and
/// the accepted set.
fn check_constitution(
    entries: &BTreeMap<String, Vec<u8>>,
    mismatches: &mut Vec<String>,
) -> (bool, bool, Option<Manifest>) {
    let manifest = entries
        .get(paths::MANIFEST)
        .and_then(|bytes| serde_json::from_slice::<Manifest>(bytes).ok());
    if manifest.is_none() {
        mismatches.push(format!("{} missing or malformed", paths::MANIFEST));
    }
    let nonstandard_declared = manifest
        .as_ref()
        .map(|m| m.nonstandard_constitution)
        .unwrap_or(false);

    let Some(text) = entries
        .get(paths::CONSTITUTION)
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
    else {
        return (false, nonstandard_declared, manifest);
    };

    let recomputed = pact_constitution::constitution_hash(text);
    if let Some(manifest) = &manifest {
        if manifest.constitution_hash != recomputed {
            mismatches.push(format!(
                "constitution hash drifted: manifest {} recomputed {}",
                prefix(&manifest.constitution_hash),
                prefix(&recomputed)
            ));
        }
    }

    let accepted = pact_constitution::lookup(&recomputed).is_some();
    (accepted, nonstandard_declared, manifest)
}

/// Recompute each derived artifact from the embedded transcript and
/// compare canonical hashes, additive paths stripped from both sides.
fn recompute_and_compare(
    entries: &BTreeMap<String, Vec<u8>>,
    manifest: Option<&Manifest>,
    mismatches: &mut Vec<String>,
) -> bool {
    let Some(transcript_bytes) = entries.get(paths::TRANSCRIPT) else {
        return false;
    };
    let transcript = match pact_verifier::parse_transcript(transcript_bytes) {
        Ok(t) => t,
        Err(e) => {
            mismatches.push(format!("embedded transcript does not parse: {e}"));
            return false;
        }
    };

    let (version, hash) = match manifest {
        Some(m) => (m.constitution_version.clone(), m.constitution_hash.clone()),
        None => {
            let fallback = pact_constitution::default_constitution();
            (fallback.version.to_string(), fallback.hash.clone())
        }
    };
    let derived = Derived::compute(&transcript, &version, &hash);

    let strip = additive_paths(&derived.gc_view.version);
    let mut ok = true;
    let comparisons: [(&str, Value, &[&str]); 3] = [
        (
            paths::GC_VIEW,
            serde_json::to_value(&derived.gc_view).expect("gc view serializes"),
            strip.gc_view,
        ),
        (
            paths::JUDGMENT,
            serde_json::to_value(&derived.judgment).expect("judgment serializes"),
            &[],
        ),
        (
            paths::INSURER_SUMMARY,
            serde_json::to_value(&derived.insurer_summary).expect("summary serializes"),
            strip.insurer_summary,
        ),
    ];

    for (path, mut recomputed, additive) in comparisons {
        let Some(embedded_bytes) = entries.get(path) else {
            ok = false;
            continue;
        };
        let mut embedded: Value = match serde_json::from_slice(embedded_bytes) {
            Ok(v) => v,
            Err(_) => {
                mismatches.push(format!("{path} is not valid JSON"));
                ok = false;
                continue;
            }
        };
        for dotted in additive {
            strip_path(&mut embedded, dotted);
            strip_path(&mut recomputed, dotted);
        }
        let embedded_hash = pact_canonical::canonical_sha256_hex(&embedded)
            .expect("embedded artifact canonicalizes");
        let recomputed_hash = pact_canonical::canonical_sha256_hex(&recomputed)
            .expect("recomputed artifact canonicalizes");
        if embedded_hash != recomputed_hash {
            mismatches.push(format!(
                "recompute mismatch for {path}: embedded {} recomputed {}",
                prefix(&embedded_hash),
                prefix(&recomputed_hash)
            ));
            ok = false;
        }
    }
    ok
}

/// Remove a dotted path (`policy.audit`) from a JSON object tree.
fn strip_path(value: &mut Value, dotted: &str) {
    let mut segments = dotted.split('.').peekable();
    let mut current = value;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            if let Some(obj) = current.as_object_mut() {
                obj.remove(segment);
            }
            return;
        }
        match current.get_mut(segment) {
            Some(next) => current = next,
            None => return,
        }
    }
}

/// 16-character hash prefix for messages.
fn prefix(hash: &str) -> &str {
    &hash[..hash.len().min(16)]
}
