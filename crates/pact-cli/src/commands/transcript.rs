//! `verify-transcript`, `gc-view` and `judge`.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

use pact_types::HashChainStatus;

use crate::io::read_transcript;

/// Exit 0 when the chain is valid and every signature verifies; 2
/// otherwise.
pub fn verify(path: &Path, json: bool) -> Result<ExitCode> {
    let transcript = read_transcript(path)?;
    let report = pact_verifier::verify(&transcript);

    if json {
        let value = serde_json::to_value(&report)?;
        println!("{}", pact_canonical::canonical_string(&value)?);
    } else {
        println!(
            "hash_chain: {:?}  signatures: {}/{}  final_hash: {:?}  rounds_verified: {}",
            report.hash_chain,
            report.signatures.verified,
            report.signatures.total,
            report.final_hash,
            report.rounds_verified,
        );
        for failure in &report.signatures.failures {
            eprintln!("round {}: {}", failure.round_number, failure.reason);
        }
        for warning in &report.warnings {
            eprintln!("warning: {warning}");
        }
    }

    let clean = report.hash_chain == HashChainStatus::Valid
        && report.signatures.verified == report.signatures.total;
    Ok(if clean { ExitCode::SUCCESS } else { ExitCode::from(2) })
}

/// Print the canonical GC view JSON.
pub fn gc_view(path: &Path) -> Result<ExitCode> {
    let transcript = read_transcript(path)?;
    let (_, _, view) = super::derive(&transcript);
    let value = serde_json::to_value(&view)?;
    println!("{}", pact_canonical::canonical_string(&value)?);
    Ok(ExitCode::SUCCESS)
}

/// Print the judgment JSON, plus a one-line summary on stderr.
pub fn judge(path: &Path) -> Result<ExitCode> {
    let transcript = read_transcript(path)?;
    let (_, judgment, _) = super::derive(&transcript);
    let value = serde_json::to_value(&judgment)?;
    println!("{}", pact_canonical::canonical_string(&value)?);
    eprintln!(
        "{}: {} (confidence {:.2}, next: {:?})",
        transcript.transcript_id,
        judgment.dbl_determination,
        judgment.confidence,
        judgment.required_next_actor,
    );
    Ok(ExitCode::SUCCESS)
}
