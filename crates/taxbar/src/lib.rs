#![forbid(unsafe_code)]

//! `taxbar` places the labels of stacked taxonomic bar diagrams without drawing anything.
//!
//! Segments whose label fits are labelled inline; the others get a row above or below their
//! bar and a straight leader back to the segment center.
//!
//! # Features
//!
//! - `layout` (default): enable metrics, row placement, and diagram assembly
//!   (`taxbar::layout`)

pub use taxbar_core::*;

#[cfg(feature = "layout")]
pub mod layout {
    pub use taxbar_layout::cache::{CachedMeasurer, MetricsCache};
    pub use taxbar_layout::metrics::{
        DeterministicLabelMeasurer, LabelMeasurer, MeasureRequest, MeasureResponse, StyleClass,
    };
    pub use taxbar_layout::model::{
        AssembledLevel, Bounds, DiagramLayout, LabelRect, Leader, LayoutPoint, RenderedLabel,
        UnpositionedLabel,
    };
    pub use taxbar_layout::{LayoutOptions, LevelInput, layout_diagram};

    use serde_json::Value;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Config(#[from] taxbar_core::Error),
        #[error(transparent)]
        Layout(#[from] taxbar_layout::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Lays out `levels` with JSON placement overrides (camelCase keys) merged over the
    /// defaults and the backend-free measurer.
    ///
    /// ```
    /// use taxbar::BarSegment;
    /// use taxbar::layout::{LevelInput, layout_with_overrides};
    ///
    /// let levels = [LevelInput {
    ///     level: 0,
    ///     segments: vec![
    ///         BarSegment::new("a", "g__Bacteroides", 0.8),
    ///         BarSegment::new("b", "g__Prevotella", 0.2),
    ///     ],
    /// }];
    /// let out = layout_with_overrides(&levels, &serde_json::json!({ "barLength": 10.0 }))
    ///     .unwrap();
    /// assert_eq!(out.levels[0].bar_length, 10.0);
    /// ```
    pub fn layout_with_overrides(
        levels: &[LevelInput],
        overrides: &Value,
    ) -> Result<DiagramLayout> {
        let options = LayoutOptions {
            placement: crate::PlacementConfig::from_value(overrides)?,
            ..LayoutOptions::default()
        };
        Ok(layout_diagram(levels, &options)?)
    }
}
