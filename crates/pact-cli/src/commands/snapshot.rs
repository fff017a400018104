//! `snapshot`: build the entity graph from transcripts and anchors.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;

use pact_anchors::load_store;
use pact_snapshot::build_snapshot;
use pact_types::SnapshotMode;

use crate::io::{emit, read_transcript_dirs};

pub fn build(
    dirs: &[PathBuf],
    anchors: Option<&Path>,
    deterministic: bool,
    out: Option<&Path>,
) -> Result<ExitCode> {
    let transcripts = read_transcript_dirs(dirs)?;
    let anchor_list = match anchors {
        Some(path) => load_store(path)?.anchors().to_vec(),
        None => Vec::new(),
    };
    let mode = if deterministic {
        SnapshotMode::Deterministic
    } else {
        SnapshotMode::Standard
    };

    let snapshot = build_snapshot(&transcripts, &anchor_list, mode);
    let value = serde_json::to_value(&snapshot)?;
    emit(out, &pact_canonical::canonical_string(&value)?)?;
    Ok(ExitCode::SUCCESS)
}
