#![forbid(unsafe_code)]

//! Headless label placement for stacked taxonomic bar diagrams.
//!
//! For every level of a diagram, segments whose label fits are labelled inline; the rest are
//! assigned to rows above and below the bar and connected to their segment by a straight
//! leader. The row search is a bounded beam over partial arrangements, retried with more rows
//! until every label fits or the retry cap is reached.

pub mod arrangement;
pub mod assemble;
pub mod cache;
pub mod frontier;
pub mod geometry;
pub mod metrics;
pub mod model;
pub mod placement;
pub mod validate;

use crate::assemble::assemble_diagram;
use crate::metrics::{DeterministicLabelMeasurer, LabelMeasurer, measure_levels};
use crate::model::DiagramLayout;
use crate::placement::place_level;
use std::sync::Arc;
use taxbar_core::{
    BarSegment, ExtractOptions, LabelFormatter, PlacementConfig, TaxonFormatter,
    extract_candidates,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] taxbar_core::Error),
    #[error("label metrics backend failed: {message}")]
    MetricsBackend { message: String },
    #[error("label metrics response is missing identifier {id}")]
    MissingMetrics { id: String },
    #[error("label metrics for {id} are invalid (width={width}, height={height}, depth={depth})")]
    InvalidMetrics {
        id: String,
        width: f64,
        height: f64,
        depth: f64,
    },
    #[error("metrics cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("metrics cache JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub label_measurer: Arc<dyn LabelMeasurer + Send + Sync>,
    pub formatter: Arc<dyn LabelFormatter + Send + Sync>,
    pub placement: PlacementConfig,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            label_measurer: Arc::new(DeterministicLabelMeasurer::default()),
            formatter: Arc::new(TaxonFormatter),
            placement: PlacementConfig::default(),
        }
    }
}

/// Segments of one taxonomic level, in bar order.
#[derive(Debug, Clone)]
pub struct LevelInput {
    pub level: usize,
    pub segments: Vec<BarSegment>,
}

/// Lays out every level of one diagram.
///
/// A metrics failure aborts the whole diagram. Levels whose labels cannot all be placed are
/// reported through [`DiagramLayout::unpositioned`] instead.
pub fn layout_diagram(levels: &[LevelInput], options: &LayoutOptions) -> Result<DiagramLayout> {
    let cfg = &options.placement;
    cfg.validate()?;
    let extract = ExtractOptions::from_placement(cfg);

    let mut candidates = Vec::with_capacity(levels.len());
    for input in levels {
        let level = extract_candidates(
            input.level,
            &input.segments,
            &extract,
            options.formatter.as_ref(),
        )?;
        candidates.push((input.level, level));
    }

    let measured = measure_levels(&candidates, options.label_measurer.as_ref())?;
    let placed = measured
        .iter()
        .map(|level| place_level(level, cfg))
        .collect::<Vec<_>>();

    for level in &placed {
        let violations = validate::check_level(level, cfg);
        if !violations.is_empty() {
            tracing::warn!(
                level = level.level,
                count = violations.len(),
                first = %violations[0],
                "placed level violates layout invariants"
            );
        }
    }

    let diagram = assemble_diagram(placed, cfg);
    tracing::info!(
        levels = diagram.levels.len(),
        unpositioned = diagram.unpositioned.len(),
        "diagram layout complete"
    );
    Ok(diagram)
}
