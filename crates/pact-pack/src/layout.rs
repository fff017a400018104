//! The fixed pack layout. All paths use forward slashes.

/// Entry paths inside the ZIP.
pub mod paths {
    pub const CHECKSUMS: &str = "checksums.sha256";
    pub const MANIFEST: &str = "manifest.json";
    pub const CONSTITUTION: &str = "constitution/CONSTITUTION_v1.md";
    pub const TRANSCRIPT: &str = "input/transcript.json";
    pub const GC_VIEW: &str = "derived/gc_view.json";
    pub const JUDGMENT: &str = "derived/judgment.json";
    pub const INSURER_SUMMARY: &str = "derived/insurer_summary.json";
    pub const PASSPORT_SNAPSHOT: &str = "derived/passport_snapshot.json";
    pub const CONTENTION_REPORT: &str = "derived/contention_report.json";
    pub const OUTCOME_EVENTS: &str = "derived/outcome_events.json";
    pub const README: &str = "README.txt";
}

/// Files every pack must contain. The optional derived artifacts are not
/// listed here.
pub const REQUIRED_FILES: &[&str] = &[
    paths::CHECKSUMS,
    paths::MANIFEST,
    paths::CONSTITUTION,
    paths::TRANSCRIPT,
    paths::GC_VIEW,
    paths::JUDGMENT,
    paths::INSURER_SUMMARY,
    paths::README,
];
