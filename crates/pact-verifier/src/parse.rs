//! Structural parsing of transcript documents.

use serde_json::Value;

use pact_types::{Round, RoundType, Transcript};

use crate::error::ParseError;

/// Parse a transcript document.
///
/// Validates structure: required fields, enum membership, unique and
/// strictly increasing round numbers. Semantic checks (round 0 kind,
/// timestamps, hashes, signatures) belong to verification and blame
/// resolution, so a structurally sound but dishonest document parses.
///
/// Each parsed round keeps its raw JSON; payload hashes are recomputed
/// from the raw form so unknown producer fields participate.
pub fn parse_transcript(bytes: &[u8]) -> Result<Transcript, ParseError> {
    let doc: Value = serde_json::from_slice(bytes)?;
    let obj = doc.as_object().ok_or(ParseError::NotAnObject)?;

    for field in [
        "transcript_id",
        "intent_type",
        "created_at_ms",
        "policy_hash",
        "rounds",
    ] {
        if !obj.contains_key(field) {
            return Err(ParseError::MissingField {
                path: field.to_string(),
            });
        }
    }

    let raw_rounds = obj
        .get("rounds")
        .and_then(Value::as_array)
        .ok_or(ParseError::InvalidField {
            path: "rounds".to_string(),
            reason: "expected an array".to_string(),
        })?;
    if raw_rounds.is_empty() {
        return Err(ParseError::EmptyRounds);
    }

    for (index, raw) in raw_rounds.iter().enumerate() {
        validate_round_structure(index, raw)?;
    }

    let mut transcript: Transcript =
        serde_json::from_value(doc.clone()).map_err(|e| ParseError::InvalidField {
            path: "transcript".to_string(),
            reason: e.to_string(),
        })?;

    for (round, raw) in transcript.rounds.iter_mut().zip(raw_rounds) {
        round.raw = raw.clone();
    }

    check_round_numbers(&transcript.rounds)?;
    Ok(transcript)
}

fn validate_round_structure(index: usize, raw: &Value) -> Result<(), ParseError> {
    let path = |field: &str| format!("rounds[{index}].{field}");
    let obj = raw.as_object().ok_or(ParseError::InvalidField {
        path: format!("rounds[{index}]"),
        reason: "expected an object".to_string(),
    })?;

    for field in [
        "round_number",
        "round_type",
        "signature",
        "prev_hash_hex",
        "content_summary",
        "timestamp_ms",
    ] {
        if !obj.contains_key(field) {
            return Err(ParseError::MissingField { path: path(field) });
        }
    }

    let round_type = &obj["round_type"];
    if serde_json::from_value::<RoundType>(round_type.clone()).is_err() {
        return Err(ParseError::InvalidField {
            path: path("round_type"),
            reason: format!("unknown round type {round_type}"),
        });
    }

    let signature = obj["signature"].as_object().ok_or(ParseError::InvalidField {
        path: path("signature"),
        reason: "expected an object".to_string(),
    })?;
    for field in ["signer_public_key_b58", "sig_b58", "signed_payload_hash_hex"] {
        if !signature.get(field).map(Value::is_string).unwrap_or(false) {
            return Err(ParseError::MissingField {
                path: path(&format!("signature.{field}")),
            });
        }
    }

    if !obj["round_number"].is_u64() {
        return Err(ParseError::InvalidField {
            path: path("round_number"),
            reason: "expected a non-negative integer".to_string(),
        });
    }
    if !obj["timestamp_ms"].is_i64() && !obj["timestamp_ms"].is_u64() {
        return Err(ParseError::InvalidField {
            path: path("timestamp_ms"),
            reason: "expected integer milliseconds".to_string(),
        });
    }
    Ok(())
}

fn check_round_numbers(rounds: &[Round]) -> Result<(), ParseError> {
    for (index, pair) in rounds.windows(2).enumerate() {
        if pair[1].round_number == pair[0].round_number {
            return Err(ParseError::DuplicateRoundNumber {
                round_number: pair[1].round_number,
            });
        }
        if pair[1].round_number < pair[0].round_number {
            return Err(ParseError::NonMonotonicRoundNumber { index: index + 1 });
        }
    }
    Ok(())
}
