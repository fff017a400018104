//! File-reading helpers shared by the subcommands.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use pact_types::Transcript;

/// Current wall-clock milliseconds. Read once per invocation and passed
/// down; core derivations never touch the clock themselves.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Parse one transcript file.
pub fn read_transcript(path: &Path) -> Result<Transcript> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading transcript {}", path.display()))?;
    pact_verifier::parse_transcript(&bytes)
        .with_context(|| format!("parsing transcript {}", path.display()))
}

/// Read every `.json` transcript under the given directories.
///
/// Entries are sorted per directory so the input ordering is stable
/// regardless of filesystem enumeration order.
pub fn read_transcript_dirs(dirs: &[PathBuf]) -> Result<Vec<Transcript>> {
    let mut transcripts = Vec::new();
    for dir in dirs {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("reading directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        for path in paths {
            transcripts.push(read_transcript(&path)?);
        }
    }
    Ok(transcripts)
}

/// Write JSON output to a file or stdout.
pub fn emit(out: Option<&Path>, text: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{text}"),
    }
    Ok(())
}
