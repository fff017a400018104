pub mod anchors;
pub mod pack;
pub mod passport;
pub mod snapshot;
pub mod transcript;

use pact_types::{GcView, Judgment, Transcript};
use pact_verifier::VerifyReport;

/// Shared derivation pipeline: verify, judge, render.
pub fn derive(transcript: &Transcript) -> (VerifyReport, Judgment, GcView) {
    let constitution = pact_constitution::default_constitution();
    let report = pact_verifier::verify(transcript);
    let judgment = pact_dbl::resolve_blame(transcript, &report, &constitution.hash);
    let gc_view = pact_gcview::render_gc_view(
        transcript,
        &report,
        &judgment,
        constitution.version,
        &constitution.hash,
    );
    (report, judgment, gc_view)
}
