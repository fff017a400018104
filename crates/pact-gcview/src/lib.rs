//! # pact-gcview
//!
//! Renders the General Counsel view: integrity verdict, outcome, blame
//! attribution and constitution reference for one transcript. The render
//! is a pure function; applying it twice to the same inputs yields
//! byte-identical canonical JSON.

mod display;
mod render;

pub use display::{
    derive_summary_badges, get_economic_for_display, get_status_for_display, OutcomeBadge,
    SummaryBadges, CLAIMED_UNTRUSTED, NOT_RECORDED,
};
pub use render::render_gc_view;
