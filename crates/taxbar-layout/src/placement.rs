//! Row search for one level's labels.
//!
//! Candidates are walked in bar order. A bounded beam of partial arrangements for the active
//! side is extended by every feasible row; when nothing fits, the best arrangement is
//! committed to the side's frontier and the walk continues on the other side. A pass fails
//! when a candidate fits on neither side right after a switch; the level is then retried with
//! one more row per side.

use crate::arrangement::{Arrangement, PlacedLabel, prune};
use crate::frontier::RowFrontier;
use crate::geometry::{self, Obstacle, RowGeometry};
use crate::metrics::{MeasuredCandidate, MeasuredLevel};
use crate::model::{LabelRect, LayoutPoint, Leader, LevelLayout, PositionedLabel};
use std::collections::VecDeque;
use taxbar_core::{LabelBox, LabelRow, LabelVariant, PlacementConfig, Side};

/// How a candidate is drawn before any row search happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelPlan {
    /// The full label fits inside the segment.
    Inline,
    /// The percentage is drawn inside the segment and the name goes to a row.
    PercentInline,
    /// The full label goes to a row.
    Row,
}

impl LabelPlan {
    pub fn for_candidate(c: &MeasuredCandidate) -> Self {
        if c.all_fits_in_bar {
            LabelPlan::Inline
        } else if c.percent_fits_in_bar {
            LabelPlan::PercentInline
        } else {
            LabelPlan::Row
        }
    }

    /// Variant drawn inside the segment, if any.
    pub fn inline_variant(self) -> Option<LabelVariant> {
        match self {
            LabelPlan::Inline => Some(LabelVariant::Full),
            LabelPlan::PercentInline => Some(LabelVariant::Percent),
            LabelPlan::Row => None,
        }
    }

    /// Variant placed in a row, if any.
    pub fn row_variant(self) -> Option<LabelVariant> {
        match self {
            LabelPlan::Inline => None,
            LabelPlan::PercentInline => Some(LabelVariant::Name),
            LabelPlan::Row => Some(LabelVariant::Full),
        }
    }
}

struct LevelContext<'a> {
    level: usize,
    cfg: &'a PlacementConfig,
    candidates: &'a [MeasuredCandidate],
    plans: Vec<LabelPlan>,
    geometry: RowGeometry,
    /// Variant and box each candidate needs placed in a row.
    row_labels: Vec<Option<(LabelVariant, LabelBox)>>,
    /// Inline boxes that stick out past the bar edge, per side.
    inline_obstacles: [Vec<Obstacle>; 2],
}

#[derive(Debug, Clone, Default)]
struct PassOutcome {
    placed: Vec<PlacedLabel>,
    unplaced: Vec<usize>,
    score: f64,
}

impl PassOutcome {
    /// Fewer unplaced labels first, then the lower score.
    fn beats(&self, other: &PassOutcome) -> bool {
        self.unplaced
            .len()
            .cmp(&other.unplaced.len())
            .then(self.score.total_cmp(&other.score))
            .is_lt()
    }
}

/// Best pass over a growing row budget.
///
/// A pass that fits in `k` rows per side is also valid with `k + 1`, so the kept outcome is
/// the best over every budget tried so far and never gets worse as the budget grows.
struct BudgetSearch<'c, 'a> {
    ctx: &'c LevelContext<'a>,
    best: Option<PassOutcome>,
}

impl<'c, 'a> BudgetSearch<'c, 'a> {
    fn new(ctx: &'c LevelContext<'a>) -> Self {
        Self { ctx, best: None }
    }

    /// Runs one pass with `rows` per side; returns whether every label is placed.
    fn try_rows(&mut self, rows: usize) -> bool {
        let outcome = run_pass(self.ctx, rows);
        tracing::debug!(
            level = self.ctx.level,
            rows_per_side = rows,
            placed = outcome.placed.len(),
            unplaced = outcome.unplaced.len(),
            score = outcome.score,
            "label row pass"
        );
        let keep_previous = self
            .best
            .as_ref()
            .is_some_and(|best| !outcome.beats(best));
        if !keep_previous {
            self.best = Some(outcome);
        }
        self.best.as_ref().is_some_and(|b| b.unplaced.is_empty())
    }

    fn finish(self) -> PassOutcome {
        self.best.unwrap_or_default()
    }
}

impl<'a> LevelContext<'a> {
    fn new(level: &'a MeasuredLevel, cfg: &'a PlacementConfig) -> Self {
        let plans = level
            .candidates
            .iter()
            .map(LabelPlan::for_candidate)
            .collect::<Vec<_>>();

        let edge = cfg.bar_height / 2.0;
        let mut inline_obstacles: [Vec<Obstacle>; 2] = [Vec::new(), Vec::new()];
        let mut protrusion: f64 = 0.0;
        for (c, plan) in level.candidates.iter().zip(&plans) {
            let Some(variant) = plan.inline_variant() else {
                continue;
            };
            let rect = inline_rect(
                c.candidate.center_x,
                &c.label_box(variant),
                level.baseline_offset,
            );
            let above = rect.top_y() - edge;
            if above > 0.0 {
                inline_obstacles[Side::Above.index()].push(Obstacle {
                    x0: rect.left_x,
                    x1: rect.right_x(),
                    t0: 0.0,
                    t1: above,
                });
                protrusion = protrusion.max(above);
            }
            let below = -edge - rect.bottom_y();
            if below > 0.0 {
                inline_obstacles[Side::Below.index()].push(Obstacle {
                    x0: rect.left_x,
                    x1: rect.right_x(),
                    t0: 0.0,
                    t1: below,
                });
                protrusion = protrusion.max(below);
            }
        }

        let row_labels = level
            .candidates
            .iter()
            .zip(&plans)
            .map(|(c, plan)| plan.row_variant().map(|v| (v, c.label_box(v))))
            .collect::<Vec<_>>();
        let tallest = row_labels
            .iter()
            .flatten()
            .map(|(_, b)| b.total_height())
            .fold(0.0, f64::max);

        let first_row_gap = if protrusion > 0.0 {
            cfg.first_row_gap.max(protrusion + cfg.label_min_sep)
        } else {
            cfg.first_row_gap
        };
        if first_row_gap > cfg.first_row_gap {
            tracing::debug!(
                level = level.level,
                protrusion,
                first_row_gap,
                "inline labels push the first row out"
            );
        }

        Self {
            level: level.level,
            cfg,
            candidates: &level.candidates,
            plans,
            geometry: RowGeometry {
                bar_height: cfg.bar_height,
                first_row_gap,
                row_pitch: cfg.row_pitch.max(tallest + cfg.label_min_sep),
            },
            row_labels,
            inline_obstacles,
        }
    }

    fn row_widths(&self) -> impl Iterator<Item = f64> + '_ {
        self.row_labels.iter().flatten().map(|(_, b)| b.width)
    }
}

/// Rect of a label drawn centered inside its own segment.
pub fn inline_rect(center_x: f64, b: &LabelBox, baseline_offset: f64) -> LabelRect {
    LabelRect {
        left_x: center_x - b.width / 2.0,
        baseline_y: -baseline_offset,
        width: b.width,
        height: b.height,
        depth: b.depth,
    }
}

/// Initial rows per side: the total row width needed over the drawable span, split across
/// both sides.
pub fn initial_rows_per_side(
    row_widths: impl IntoIterator<Item = f64>,
    cfg: &PlacementConfig,
) -> usize {
    let required: f64 = row_widths.into_iter().map(|w| w + cfg.label_min_sep).sum();
    let span = cfg.max_x() - cfg.min_x();
    let total_rows = (required / span).ceil().max(0.0) as usize;
    total_rows.div_ceil(2).max(1)
}

/// Places one level's labels.
///
/// Never fails: labels that cannot be placed within `max_extra_rows` retries are reported in
/// [`LevelLayout::unpositioned`] with degenerate coordinates.
pub fn place_level(level: &MeasuredLevel, cfg: &PlacementConfig) -> LevelLayout {
    if level.candidates.is_empty() {
        return LevelLayout::empty(level.level, cfg.bar_length, cfg.bar_height);
    }

    let ctx = LevelContext::new(level, cfg);
    let mut search = BudgetSearch::new(&ctx);
    let mut extra_rows = 0;
    if ctx.row_widths().next().is_some() {
        let base_rows = initial_rows_per_side(ctx.row_widths(), cfg);
        for extra in 0..=cfg.max_extra_rows {
            extra_rows = extra;
            if search.try_rows(base_rows + extra) {
                break;
            }
        }
    }

    let outcome = search.finish();
    let layout = build_layout(level, &ctx, outcome, extra_rows);
    if layout.is_partial() {
        tracing::warn!(
            level = level.level,
            unpositioned = ?layout.unpositioned,
            max_extra_rows = cfg.max_extra_rows,
            "some labels could not be placed"
        );
    }
    layout
}

fn run_pass(ctx: &LevelContext<'_>, rows: usize) -> PassOutcome {
    let cfg = ctx.cfg;
    let mut frontiers = [
        RowFrontier::new(rows, cfg.min_x()),
        RowFrontier::new(rows, cfg.min_x()),
    ];
    let mut committed: [Vec<PlacedLabel>; 2] = [Vec::new(), Vec::new()];
    let mut pending: VecDeque<usize> = (0..ctx.candidates.len())
        .filter(|&i| ctx.row_labels[i].is_some())
        .collect();

    let mut side = Side::Above;
    let mut beam = vec![Arrangement::empty(side, frontiers[side.index()].clone())];
    // Set right after switching sides, cleared by the first successful extension.
    let mut fresh_side = false;
    let mut score = 0.0;

    while let Some(idx) = pending.pop_front() {
        let mut extensions = Vec::new();
        for arr in &beam {
            for row in 0..rows {
                if let Some(next) =
                    try_extend(ctx, arr, &committed[side.index()], idx, row, &pending)
                {
                    extensions.push(next);
                }
            }
        }
        if !extensions.is_empty() {
            beam = prune(extensions, cfg.row_penalty, cfg.max_arrangements);
            fresh_side = false;
            continue;
        }

        pending.push_front(idx);
        if fresh_side {
            break;
        }
        if let Some(best) = beam.into_iter().next() {
            score += commit(best, &mut frontiers, &mut committed, cfg);
        }
        side = side.flip();
        beam = vec![Arrangement::empty(side, frontiers[side.index()].clone())];
        fresh_side = true;
    }
    if let Some(best) = beam.into_iter().next() {
        score += commit(best, &mut frontiers, &mut committed, cfg);
    }

    let [above, below] = committed;
    PassOutcome {
        placed: above.into_iter().chain(below).collect(),
        unplaced: pending.into_iter().collect(),
        score,
    }
}

/// Folds `arr` into its side's frontier and label set; returns its score.
fn commit(
    arr: Arrangement,
    frontiers: &mut [RowFrontier; 2],
    committed: &mut [Vec<PlacedLabel>; 2],
    cfg: &PlacementConfig,
) -> f64 {
    if arr.is_empty() {
        return 0.0;
    }
    let s = arr.side.index();
    let score = arr.score(cfg.row_penalty);
    tracing::debug!(
        side = ?arr.side,
        labels = arr.labels.len(),
        rows_used = arr.rows_used(),
        score,
        "commit arrangement"
    );
    frontiers[s] = arr.frontier;
    committed[s].extend(arr.labels);
    score
}

fn try_extend(
    ctx: &LevelContext<'_>,
    arr: &Arrangement,
    committed: &[PlacedLabel],
    idx: usize,
    row: usize,
    pending: &VecDeque<usize>,
) -> Option<Arrangement> {
    let cfg = ctx.cfg;
    let (variant, label_box) = ctx.row_labels[idx]?;
    let center_x = ctx.candidates[idx].candidate.center_x;
    let side = arr.side;
    let rise = ctx.geometry.rise(row);
    let reach = geometry::max_horizontal_reach(rise, cfg.max_leader_length)?;
    let row_min = arr.frontier.extent(row).max(cfg.min_x());

    let obstacles = committed
        .iter()
        .filter(|l| l.row < row)
        .map(PlacedLabel::obstacle)
        .chain(arr.obstacles_below(row))
        .chain(ctx.inline_obstacles[side.index()].iter().copied());
    let window = geometry::leader_window(center_x, rise, obstacles, cfg.leader_buffer)?
        .intersect(row_min, cfg.max_x())?
        .intersect(center_x - reach, center_x + reach)?;
    let leader_x = geometry::choose_leader_x(center_x, window, cfg.min_del_x)?;

    let width = label_box.width;
    let mut left_x = (center_x - width / 2.0).max(row_min);
    if leader_x > left_x + width {
        left_x = leader_x - width;
    }
    if leader_x < left_x {
        left_x = leader_x;
    }
    let right_x = left_x + width;
    if right_x > cfg.max_x() {
        tracing::trace!(idx, row, right_x, "label runs past the right boundary");
        return None;
    }

    let covered = pending
        .iter()
        .filter(|&&j| {
            let x = ctx.candidates[j].candidate.center_x;
            x >= left_x && x <= right_x
        })
        .count();
    if covered > cfg.label_cover_max {
        tracing::trace!(idx, row, covered, "label covers too many pending segments");
        return None;
    }

    let label = PlacedLabel {
        candidate: idx,
        variant,
        side,
        row,
        left_x,
        label_box,
        center_x,
        leader_x,
        rise,
    };
    let mut frontier = arr.frontier.clone();
    frontier.claim(row, right_x + cfg.label_min_sep);
    for q in 0..row {
        let t0 = ctx.geometry.rise(q);
        let band = geometry::leader_reach_in_band(
            center_x,
            leader_x,
            rise,
            t0,
            t0 + ctx.geometry.row_pitch,
        );
        if let Some(x) = band {
            frontier.claim(q, x + cfg.label_min_sep);
        }
    }
    debug_assert!(frontier.dominates(&arr.frontier));
    Some(arr.extended(label, frontier))
}

fn build_layout(
    level: &MeasuredLevel,
    ctx: &LevelContext<'_>,
    outcome: PassOutcome,
    extra_rows: usize,
) -> LevelLayout {
    let cfg = ctx.cfg;
    let g = &ctx.geometry;
    let mut placed: Vec<Option<PlacedLabel>> = vec![None; level.candidates.len()];
    let mut rows = [0usize; 2];
    for p in outcome.placed {
        rows[p.side.index()] = rows[p.side.index()].max(p.row + 1);
        let idx = p.candidate;
        placed[idx] = Some(p);
    }

    let mut labels = Vec::with_capacity(level.candidates.len());
    let mut unpositioned = Vec::new();
    for (idx, (mc, plan)) in level.candidates.iter().zip(&ctx.plans).enumerate() {
        let c = &mc.candidate;
        if let Some(variant) = plan.inline_variant() {
            let b = mc.label_box(variant);
            labels.push(PositionedLabel {
                segment_id: c.segment_id.clone(),
                text: c.variant_text(variant),
                variant,
                sequence: c.sequence,
                row: LabelRow::Inline,
                rect: inline_rect(c.center_x, &b, level.baseline_offset),
                leader_x: c.center_x,
                leader: None,
            });
        }
        let Some((variant, b)) = ctx.row_labels[idx] else {
            continue;
        };
        match placed[idx].take() {
            Some(p) => labels.push(PositionedLabel {
                segment_id: c.segment_id.clone(),
                text: c.variant_text(variant),
                variant,
                sequence: c.sequence,
                row: LabelRow::Row {
                    side: p.side,
                    index: p.row,
                },
                rect: LabelRect {
                    left_x: p.left_x,
                    baseline_y: g.baseline_y(p.side, p.row, &b),
                    width: b.width,
                    height: b.height,
                    depth: b.depth,
                },
                leader_x: p.leader_x,
                leader: Some(Leader {
                    anchor: LayoutPoint::new(c.center_x, g.anchor_y(p.side)),
                    corner: LayoutPoint::new(p.leader_x, g.corner_y(p.side, p.row)),
                }),
            }),
            None => {
                let left_x = cfg.max_x() + cfg.label_min_sep;
                unpositioned.push(c.segment_id.clone());
                labels.push(PositionedLabel {
                    segment_id: c.segment_id.clone(),
                    text: c.variant_text(variant),
                    variant,
                    sequence: c.sequence,
                    row: LabelRow::Unpositioned,
                    rect: LabelRect {
                        left_x,
                        baseline_y: -level.baseline_offset,
                        width: b.width,
                        height: b.height,
                        depth: b.depth,
                    },
                    leader_x: left_x,
                    leader: None,
                });
            }
        }
    }

    LevelLayout {
        level: level.level,
        bar_length: cfg.bar_length,
        bar_height: cfg.bar_height,
        first_row_gap: g.first_row_gap,
        row_pitch: g.row_pitch,
        rows_above: rows[Side::Above.index()],
        rows_below: rows[Side::Below.index()],
        extra_rows,
        score: outcome.score,
        labels,
        unpositioned,
    }
}
