//! `auditor-pack` and `auditor-pack-verify`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};

use pact_pack::{seal_pack, verify_pack, SealOptions};

use crate::io::{now_ms, read_transcript_dirs};
use crate::TOOL_VERSION;

pub struct SealArgs {
    pub transcript: PathBuf,
    pub out: PathBuf,
    pub constitution: Option<PathBuf>,
    pub allow_nonstandard: bool,
    pub include_passport: bool,
    pub transcripts_dir: Vec<PathBuf>,
    pub include_contention: bool,
    pub include_outcome_events: bool,
}

pub fn seal(args: SealArgs) -> Result<ExitCode> {
    let transcript_bytes = std::fs::read(&args.transcript)
        .with_context(|| format!("reading transcript {}", args.transcript.display()))?;
    let constitution_text = match &args.constitution {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading constitution {}", path.display()))?,
        None => pact_constitution::CONSTITUTION_V1_TEXT.to_string(),
    };

    let passport_snapshot = if args.include_passport {
        let transcripts = read_transcript_dirs(&args.transcripts_dir)?;
        let constitution = pact_constitution::default_constitution();
        let registry = pact_passport::recompute(&transcripts, &constitution.hash, now_ms());
        Some(serde_json::to_value(&registry)?)
    } else {
        None
    };

    let options = SealOptions {
        allow_nonstandard: args.allow_nonstandard,
        passport_snapshot,
        include_contention: args.include_contention,
        include_outcome_events: args.include_outcome_events,
    };
    let outcome = seal_pack(
        &transcript_bytes,
        &constitution_text,
        &args.out,
        now_ms(),
        TOOL_VERSION,
        &options,
    )?;

    eprintln!(
        "sealed {} ({} artifacts) -> {}",
        outcome.transcript_id,
        outcome.included_artifacts.len(),
        args.out.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Exit 0 iff the re-verification report says ok.
pub fn verify(path: &Path, allow_nonstandard: bool) -> Result<ExitCode> {
    let report = verify_pack(path, allow_nonstandard, TOOL_VERSION)?;
    let value = serde_json::to_value(&report)?;
    println!("{}", pact_canonical::canonical_string(&value)?);
    for mismatch in &report.mismatches {
        eprintln!("mismatch: {mismatch}");
    }
    Ok(if report.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}
