//! # pact-types
//!
//! Wire models for the Pact protocol. Field names bind the external JSON
//! names used by canonical hashing, so serialization must round-trip
//! byte-faithfully: optional fields are skipped when absent and wire
//! timestamps stay integer milliseconds.
//!
//! Identity is always `signature.signer_public_key_b58` (legacy fallback
//! `public_key_b58`); `agent_id` is a display role and never trusted.

pub mod anchor;
pub mod content;
pub mod gcview;
pub mod insurer;
pub mod judgment;
pub mod passport;
pub mod snapshot;
pub mod transcript;

pub use anchor::{AnchorAttestation, AnchorIssueRequest, AnchorType};
pub use content::{Claim, RoundContent};
pub use gcview::{
    ConstitutionRef, ExecutiveSummary, FinalHashValidation, GcView, HashChainStatus, Integrity,
    IntegrityVerdict, Party, Responsibility, ResponsibilityJudgment, SignatureTally, Subject,
};
pub use insurer::{Coverage, InsurerSummary};
pub use judgment::{FaultDomain, Judgment, NextActor};
pub use passport::{
    HistoryEntry, PassportCounters, PassportRecord, PassportRegistry, PassportState, Tier,
};
pub use snapshot::{
    AnchorBadge, DomainEntry, DomainMetrics, Recommendation, Snapshot, SnapshotEntity,
    SnapshotMode,
};
pub use transcript::{FailureEvent, Round, RoundSignature, RoundType, Transcript};

/// Wire version tag for transcripts accepted by this verifier.
pub const TRANSCRIPT_VERSION: &str = "pact-transcript/4.0";
/// Wire version tag for rendered GC views.
pub const GC_VIEW_VERSION: &str = "gc_view/1.1";
/// Wire version tag for passport registries.
pub const PASSPORT_VERSION: &str = "passport/1.0";
/// Wire version tag for passport snapshots.
pub const SNAPSHOT_VERSION: &str = "pact-passport-snapshot/0.0";
