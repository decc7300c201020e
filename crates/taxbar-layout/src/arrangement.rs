//! Partial row assignments for one side of a bar, and how they are ranked.

use crate::frontier::RowFrontier;
use crate::geometry::Obstacle;
use std::cmp::Ordering;
use taxbar_core::{LabelBox, LabelVariant, Side};

/// A label assigned to a row, in side-local terms.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    /// Index into the level's measured candidates.
    pub candidate: usize,
    pub variant: LabelVariant,
    pub side: Side,
    pub row: usize,
    pub left_x: f64,
    pub label_box: LabelBox,
    pub center_x: f64,
    pub leader_x: f64,
    /// Distance from the bar edge to the row's near edge.
    pub rise: f64,
}

impl PlacedLabel {
    pub fn right_x(&self) -> f64 {
        self.left_x + self.label_box.width
    }

    pub fn leader_length(&self) -> f64 {
        (self.leader_x - self.center_x).hypot(self.rise)
    }

    pub fn obstacle(&self) -> Obstacle {
        Obstacle {
            x0: self.left_x,
            x1: self.right_x(),
            t0: self.rise,
            t1: self.rise + self.label_box.total_height(),
        }
    }
}

/// An ordered set of labels for one contiguous batch on one side, with the frontier it leaves
/// behind.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrangement {
    pub side: Side,
    pub labels: Vec<PlacedLabel>,
    pub frontier: RowFrontier,
    leader_total: f64,
    row_sum: usize,
    rows_used: usize,
}

impl Arrangement {
    pub fn empty(side: Side, frontier: RowFrontier) -> Self {
        Self {
            side,
            labels: Vec::new(),
            frontier,
            leader_total: 0.0,
            row_sum: 0,
            rows_used: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// A copy of `self` with `label` appended and `frontier` as the new frontier snapshot.
    pub fn extended(&self, label: PlacedLabel, frontier: RowFrontier) -> Self {
        let mut next = self.clone();
        next.leader_total += label.leader_length();
        next.row_sum += label.row;
        next.rows_used = next.rows_used.max(label.row + 1);
        next.labels.push(label);
        next.frontier = frontier;
        next
    }

    pub fn rows_used(&self) -> usize {
        self.rows_used
    }

    pub fn leader_total(&self) -> f64 {
        self.leader_total
    }

    pub fn row_sum(&self) -> usize {
        self.row_sum
    }

    /// `(rows used - 1) * row_penalty + total leader length`; lower is better.
    pub fn score(&self, row_penalty: f64) -> f64 {
        self.rows_used.saturating_sub(1) as f64 * row_penalty + self.leader_total
    }

    /// Boxes of this arrangement on rows closer to the bar than `row`.
    pub fn obstacles_below(&self, row: usize) -> impl Iterator<Item = Obstacle> + '_ {
        self.labels
            .iter()
            .filter(move |l| l.row < row)
            .map(PlacedLabel::obstacle)
    }
}

/// Ranks by score, then total leader length, then row index sum. Ties keep discovery order
/// when used with a stable sort.
pub fn compare(a: &Arrangement, b: &Arrangement, row_penalty: f64) -> Ordering {
    a.score(row_penalty)
        .total_cmp(&b.score(row_penalty))
        .then_with(|| a.leader_total.total_cmp(&b.leader_total))
        .then_with(|| a.row_sum.cmp(&b.row_sum))
}

/// Sorts `arrangements` best first and keeps at most `limit`.
pub fn prune(
    mut arrangements: Vec<Arrangement>,
    row_penalty: f64,
    limit: usize,
) -> Vec<Arrangement> {
    arrangements.sort_by(|a, b| compare(a, b, row_penalty));
    arrangements.truncate(limit.max(1));
    arrangements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(candidate: usize, row: usize, dx: f64) -> PlacedLabel {
        PlacedLabel {
            candidate,
            variant: LabelVariant::Full,
            side: Side::Above,
            row,
            left_x: 0.0,
            label_box: LabelBox::new(1.0, 0.2, 0.05),
            center_x: 0.0,
            leader_x: dx,
            rise: 0.3 + row as f64 * 0.4,
        }
    }

    fn arrangement(labels: &[PlacedLabel]) -> Arrangement {
        labels.iter().fold(
            Arrangement::empty(Side::Above, RowFrontier::new(2, 0.0)),
            |acc, l| acc.extended(l.clone(), RowFrontier::new(2, 0.0)),
        )
    }

    #[test]
    fn score_charges_extra_rows_and_leader_length() {
        let a = arrangement(&[label(0, 0, 0.4), label(1, 1, 0.0)]);
        assert_eq!(a.rows_used(), 2);
        // 0.5 + 0.7 leader length plus one extra row.
        assert!((a.score(1.0) - 2.2).abs() < 1e-12);
        assert_eq!(Arrangement::empty(Side::Below, RowFrontier::new(1, 0.0)).score(1.0), 0.0);
    }

    #[test]
    fn ties_break_on_leader_length_then_row_sum_then_order() {
        let one_row = arrangement(&[label(0, 0, 0.4), label(1, 0, 0.4)]);
        let two_rows = arrangement(&[label(0, 0, 0.4), label(1, 1, 0.0)]);
        let pruned = prune(vec![two_rows.clone(), one_row.clone()], 1.0, 8);
        assert_eq!(pruned[0], one_row);

        // Without a row penalty the shorter leaders win.
        let pruned = prune(vec![one_row.clone(), two_rows.clone()], 0.0, 1);
        assert_eq!(pruned.len(), 1);
        assert_eq!(pruned[0], one_row);
        assert!(one_row.leader_total() < two_rows.leader_total());

        let first = arrangement(&[label(7, 0, 0.4)]);
        let mut second = arrangement(&[label(8, 0, 0.4)]);
        second.side = Side::Below;
        let pruned = prune(vec![first.clone(), second], 1.0, 8);
        assert_eq!(pruned[0], first);
    }
}
