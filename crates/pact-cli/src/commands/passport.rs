//! `passport:v1:recompute` and `passport:v1:query`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};

use pact_types::PassportRegistry;

use crate::io::{emit, now_ms, read_transcript_dirs};

pub fn recompute(
    dirs: &[PathBuf],
    signer: Option<&str>,
    out: Option<&Path>,
) -> Result<ExitCode> {
    let transcripts = read_transcript_dirs(dirs)?;
    let constitution = pact_constitution::default_constitution();
    let mut registry = pact_passport::recompute(&transcripts, &constitution.hash, now_ms());

    if let Some(signer) = signer {
        registry.states.retain(|key, _| key == signer);
        registry.records.retain(|key, _| key == signer);
    }

    for warning in &registry.warnings {
        eprintln!("warning: {warning}");
    }

    let value = serde_json::to_value(&registry)?;
    emit(out, &pact_canonical::canonical_string(&value)?)?;
    Ok(ExitCode::SUCCESS)
}

pub fn query(signer: &str, registry_path: &Path) -> Result<ExitCode> {
    let bytes = std::fs::read(registry_path)
        .with_context(|| format!("reading registry {}", registry_path.display()))?;
    let registry: PassportRegistry =
        serde_json::from_slice(&bytes).context("registry is not valid JSON")?;

    match registry.records.get(signer) {
        Some(record) => {
            let value = serde_json::to_value(record)?;
            println!("{}", pact_canonical::canonical_string(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("no passport state for {signer}");
            Ok(ExitCode::from(2))
        }
    }
}
