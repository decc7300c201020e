#![forbid(unsafe_code)]

//! Segment model, label candidate extraction, and configuration for stacked taxonomic bar
//! diagrams (headless).
//!
//! Design goals:
//! - deterministic, testable outputs for a given segment order and configuration
//! - no rendering or typesetting dependency; label metrics are supplied by `taxbar-layout`

pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod geom;
pub mod model;

pub use config::{ConfigValue, PlacementConfig};
pub use error::{Error, Result};
pub use extract::{ExtractOptions, extract_candidates};
pub use format::{LabelFormatter, TaxonFormatter};
pub use model::{
    BarSegment, LabelBox, LabelCandidate, LabelRow, LabelVariant, PT_TO_CM, SegmentKind, Side,
};
