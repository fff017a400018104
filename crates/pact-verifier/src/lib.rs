//! # pact-verifier
//!
//! Parses signed transcripts and verifies their hash chain and
//! signatures. Parsing is structural (required fields, enum membership);
//! verification recomputes every payload hash from the raw round JSON,
//! checks each Ed25519 signature, enforces chain links, and aggregates a
//! [`VerifyReport`]. Verification never aborts on a partial failure: a
//! tampered transcript still produces a complete report.

mod error;
mod parse;
mod verify;

pub use error::ParseError;
pub use parse::parse_transcript;
pub use verify::{
    payload_hash_for_round, verify, RoundCheck, SignatureFailure, SignatureReport, VerifyReport,
};
