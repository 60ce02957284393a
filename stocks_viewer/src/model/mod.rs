//! Viewer-side shaping of snapshot data for display.
pub mod portfolio;
