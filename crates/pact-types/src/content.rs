//! Typed round payloads.
//!
//! `content_summary` stays raw JSON on the transcript (producer extensions
//! participate in hashing); this module decodes it into a tagged variant
//! per round kind for the blame resolver and the snapshot builder.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transcript::RoundType;

/// One claim carried by an INTENT or ASK payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Claim subject, domain-prefixed, e.g. `art:authenticity:lot-17`.
    pub subject: String,

    /// Confidence in [0, 1].
    pub conf: f64,
}

/// Tagged view over `content_summary`, one variant per round kind.
#[derive(Debug, Clone)]
pub enum RoundContent {
    Intent {
        description: Option<String>,
        claims: Vec<Claim>,
        min_reliability_gate: Option<f64>,
        min_calibration_gate: Option<f64>,
    },
    Ask {
        price: Option<String>,
        claims: Vec<Claim>,
    },
    Bid {
        price: Option<String>,
    },
    Counter {
        price: Option<String>,
    },
    Accept {
        price: Option<String>,
        to: Option<String>,
        from: Option<String>,
    },
    Reject {
        reason: Option<String>,
    },
    Commit {
        commitment_hash_hex: Option<String>,
        deadline_ms: Option<i64>,
    },
    Reveal {
        reveal_data: Option<String>,
        reveal_hash_hex: Option<String>,
    },
    StreamStart {
        stream_id: Option<String>,
    },
    StreamChunk {
        seq: Option<u64>,
    },
    StreamStop {
        by: Option<String>,
        reason: Option<String>,
        fulfilled: Option<bool>,
    },
}

impl RoundContent {
    /// Decode a raw payload for the given round kind. Missing or
    /// malformed fields decode as `None`/empty; structural validation
    /// happened at parse time.
    pub fn from_summary(round_type: RoundType, summary: &Value) -> Self {
        match round_type {
            RoundType::Intent => Self::Intent {
                description: str_field(summary, "description"),
                claims: claims_field(summary),
                min_reliability_gate: f64_field(summary, "min_reliability_gate"),
                min_calibration_gate: f64_field(summary, "min_calibration_gate"),
            },
            RoundType::Ask => Self::Ask {
                price: price_field(summary),
                claims: claims_field(summary),
            },
            RoundType::Bid => Self::Bid {
                price: price_field(summary),
            },
            RoundType::Counter => Self::Counter {
                price: price_field(summary),
            },
            RoundType::Accept => Self::Accept {
                price: price_field(summary),
                to: str_field(summary, "to"),
                from: str_field(summary, "from"),
            },
            RoundType::Reject => Self::Reject {
                reason: str_field(summary, "reason"),
            },
            RoundType::Commit => Self::Commit {
                commitment_hash_hex: str_field(summary, "commitment_hash_hex"),
                deadline_ms: summary.get("deadline_ms").and_then(Value::as_i64),
            },
            RoundType::Reveal => Self::Reveal {
                reveal_data: str_field(summary, "reveal_data"),
                reveal_hash_hex: str_field(summary, "reveal_hash_hex"),
            },
            RoundType::StreamStart => Self::StreamStart {
                stream_id: str_field(summary, "stream_id"),
            },
            RoundType::StreamChunk => Self::StreamChunk {
                seq: summary.get("seq").and_then(Value::as_u64),
            },
            RoundType::StreamStop => Self::StreamStop {
                by: str_field(summary, "by"),
                reason: str_field(summary, "reason"),
                fulfilled: summary.get("fulfilled").and_then(Value::as_bool),
            },
        }
    }

    /// Claims carried by this payload, if the kind has any.
    pub fn claims(&self) -> &[Claim] {
        match self {
            Self::Intent { claims, .. } | Self::Ask { claims, .. } => claims,
            _ => &[],
        }
    }
}

fn str_field(summary: &Value, key: &str) -> Option<String> {
    summary.get(key).and_then(Value::as_str).map(str::to_string)
}

fn f64_field(summary: &Value, key: &str) -> Option<f64> {
    summary.get(key).and_then(Value::as_f64)
}

/// Monetary values travel as strings when exact precision matters; older
/// producers emit numbers. Both decode to the string form.
fn price_field(summary: &Value) -> Option<String> {
    match summary.get("price") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn claims_field(summary: &Value) -> Vec<Claim> {
    summary
        .get("claims")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let subject = item.get("subject")?.as_str()?.to_string();
                    let conf = item.get("conf")?.as_f64()?;
                    Some(Claim { subject, conf })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_intent_with_gates_and_claims() {
        let summary = json!({
            "description": "weather data feed",
            "claims": [{"subject": "api:weather", "conf": 0.97}],
            "min_reliability_gate": 70.0
        });
        match RoundContent::from_summary(RoundType::Intent, &summary) {
            RoundContent::Intent {
                description,
                claims,
                min_reliability_gate,
                min_calibration_gate,
            } => {
                assert_eq!(description.as_deref(), Some("weather data feed"));
                assert_eq!(claims.len(), 1);
                assert_eq!(claims[0].subject, "api:weather");
                assert_eq!(min_reliability_gate, Some(70.0));
                assert_eq!(min_calibration_gate, None);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn price_accepts_string_and_number() {
        let as_string = RoundContent::from_summary(RoundType::Ask, &json!({"price": "12.50"}));
        let as_number = RoundContent::from_summary(RoundType::Ask, &json!({"price": 12.5}));
        match (as_string, as_number) {
            (RoundContent::Ask { price: a, .. }, RoundContent::Ask { price: b, .. }) => {
                assert_eq!(a.as_deref(), Some("12.50"));
                assert_eq!(b.as_deref(), Some("12.5"));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn malformed_claims_are_skipped() {
        let summary = json!({"claims": [{"subject": "art:provenance", "conf": 0.8}, {"conf": 1.0}, "junk"]});
        let content = RoundContent::from_summary(RoundType::Ask, &summary);
        assert_eq!(content.claims().len(), 1);
    }

    #[test]
    fn stream_stop_fields() {
        let summary = json!({"by": "buyer", "fulfilled": false});
        match RoundContent::from_summary(RoundType::StreamStop, &summary) {
            RoundContent::StreamStop { by, fulfilled, .. } => {
                assert_eq!(by.as_deref(), Some("buyer"));
                assert_eq!(fulfilled, Some(false));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
