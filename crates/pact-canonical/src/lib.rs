//! Canonical JSON serialization for Pact.
//!
//! Every hash in the protocol is computed over the canonical form of a
//! JSON value: object keys sorted lexicographically by code point, arrays
//! in element order, compact output, and a stable number rendering. The
//! defining property is
//!
//! ```text
//! canonical(parse(canonical(x))) == canonical(x)
//! ```
//!
//! for any value derived from JSON-compatible inputs.

use serde_json::Value;
use sha2::{Digest, Sha256};

mod error;

pub use error::CanonicalError;

/// Result alias for canonicalization.
pub type Result<T> = std::result::Result<T, CanonicalError>;

/// Serialize a value to its canonical string form.
pub fn canonical_string(value: &Value) -> Result<String> {
    let mut out = String::new();
    write_value(&mut out, value)?;
    Ok(out)
}

/// Serialize a value to its canonical byte form.
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>> {
    canonical_string(value).map(String::into_bytes)
}

/// Lowercase hex SHA-256 of the canonical form.
pub fn canonical_sha256_hex(value: &Value) -> Result<String> {
    let bytes = canonical_bytes(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Recursively sort object keys, returning a value whose in-memory map
/// order matches canonical order. Arrays keep their element order.
///
/// Ordinary canonicalization does not need this (the writer sorts), but
/// deterministic snapshot mode sorts embedded raw values before hashing.
pub fn sort_keys_deep(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = serde_json::Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_keys_deep(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys_deep).collect()),
        other => other.clone(),
    }
}

fn write_value(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(out, n)?,
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, &map[*key])?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_number(out: &mut String, n: &serde_json::Number) -> Result<()> {
    if let Some(i) = n.as_i64() {
        out.push_str(&i.to_string());
        return Ok(());
    }
    if let Some(u) = n.as_u64() {
        out.push_str(&u.to_string());
        return Ok(());
    }
    let f = n.as_f64().ok_or(CanonicalError::NonFiniteNumber)?;
    if !f.is_finite() {
        return Err(CanonicalError::NonFiniteNumber);
    }
    // Negative zero renders as 0 so reparsing is stable.
    if f == 0.0 {
        out.push('0');
        return Ok(());
    }
    // Rust's Display for f64 is the shortest decimal that round-trips
    // to the same IEEE-754 value.
    out.push_str(&f.to_string());
    Ok(())
}

fn write_string(out: &mut String, s: &str) {
    // serde_json applies the JSON string escape rules; strings always
    // serialize without error.
    out.push_str(&serde_json::to_string(s).expect("string serialization is infallible"));
}
