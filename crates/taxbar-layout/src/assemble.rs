//! Stacks placed levels into one diagram.
//!
//! Level 0 is the top bar. Its top extent sits at `y = 0` and each following level hangs
//! `level_gap` below the bottom extent of the one before it, so all bar centers are negative.

use crate::model::{
    AssembledLevel, Bounds, DiagramLayout, LevelLayout, RenderedLabel, UnpositionedLabel,
};
use taxbar_core::{LabelRow, PlacementConfig};

/// Absolute y of each level's bar center.
pub fn bar_centers(levels: &[LevelLayout], level_gap: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(levels.len());
    let mut previous: Option<(f64, &LevelLayout)> = None;
    for level in levels {
        let center = match previous {
            None => -level.above_extent(),
            Some((c, prev)) => c - prev.below_extent() - level_gap - level.above_extent(),
        };
        out.push(center);
        previous = Some((center, level));
    }
    out
}

pub fn assemble_diagram(levels: Vec<LevelLayout>, cfg: &PlacementConfig) -> DiagramLayout {
    let centers = bar_centers(&levels, cfg.level_gap);
    let mut assembled = Vec::with_capacity(levels.len());
    let mut unpositioned = Vec::new();
    let mut corners = Vec::new();

    for (level, center) in levels.into_iter().zip(centers) {
        let half = level.bar_height / 2.0;
        corners.push((0.0, center + half));
        corners.push((level.bar_length, center - half));

        unpositioned.extend(level.unpositioned.iter().map(|id| UnpositionedLabel {
            level: level.level,
            segment_id: id.clone(),
        }));

        let labels = level
            .labels
            .into_iter()
            .map(|l| {
                let mut rect = l.rect;
                rect.baseline_y += center;
                if l.row != LabelRow::Unpositioned {
                    corners.push((rect.left_x, rect.top_y()));
                    corners.push((rect.right_x(), rect.bottom_y()));
                }
                RenderedLabel {
                    segment_id: l.segment_id,
                    text: l.text,
                    variant: l.variant,
                    row: l.row,
                    rect,
                    leader: l.leader.map(|leader| leader.translated(center)),
                }
            })
            .collect();

        assembled.push(AssembledLevel {
            level: level.level,
            bar_center_y: center,
            bar_length: level.bar_length,
            bar_height: level.bar_height,
            rows_above: level.rows_above,
            rows_below: level.rows_below,
            labels,
        });
    }

    DiagramLayout {
        levels: assembled,
        unpositioned,
        bounds: Bounds::from_points(corners),
    }
}
