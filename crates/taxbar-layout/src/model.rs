use serde::{Deserialize, Serialize};
use taxbar_core::{LabelRow, LabelVariant};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

impl LayoutPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }
}

/// Straight leader from the segment center on the bar edge to the label's near edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leader {
    pub anchor: LayoutPoint,
    pub corner: LayoutPoint,
}

impl Leader {
    pub fn length(&self) -> f64 {
        (self.corner.x - self.anchor.x).hypot(self.corner.y - self.anchor.y)
    }

    pub fn horizontal_offset(&self) -> f64 {
        self.corner.x - self.anchor.x
    }

    pub fn translated(&self, dy: f64) -> Leader {
        Leader {
            anchor: LayoutPoint::new(self.anchor.x, self.anchor.y + dy),
            corner: LayoutPoint::new(self.corner.x, self.corner.y + dy),
        }
    }
}

/// A typeset text box anchored at its left baseline point. Lengths in cm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelRect {
    pub left_x: f64,
    pub baseline_y: f64,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl LabelRect {
    pub fn right_x(&self) -> f64 {
        self.left_x + self.width
    }

    pub fn top_y(&self) -> f64 {
        self.baseline_y + self.height
    }

    pub fn bottom_y(&self) -> f64 {
        self.baseline_y - self.depth
    }
}

/// A label placed relative to its own bar (bar center at `y = 0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedLabel {
    pub segment_id: String,
    pub text: String,
    pub variant: LabelVariant,
    pub sequence: usize,
    pub row: LabelRow,
    pub rect: LabelRect,
    /// Where the leader meets the label's near edge; the segment center for inline labels.
    pub leader_x: f64,
    pub leader: Option<Leader>,
}

/// Result of placing one level's labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub level: usize,
    pub bar_length: f64,
    pub bar_height: f64,
    /// Effective distance from the bar edge to row 0.
    pub first_row_gap: f64,
    /// Effective vertical distance between rows.
    pub row_pitch: f64,
    pub rows_above: usize,
    pub rows_below: usize,
    /// Extra rows per side beyond the initial estimate tried before the search stopped.
    pub extra_rows: usize,
    /// Sum of the committed arrangements' scores.
    pub score: f64,
    /// Labels in bar order, including percent-only inline companions of row labels.
    pub labels: Vec<PositionedLabel>,
    /// Segment ids whose labels could not be placed.
    pub unpositioned: Vec<String>,
}

impl LevelLayout {
    pub fn empty(level: usize, bar_length: f64, bar_height: f64) -> Self {
        Self {
            level,
            bar_length,
            bar_height,
            first_row_gap: 0.0,
            row_pitch: 0.0,
            rows_above: 0,
            rows_below: 0,
            extra_rows: 0,
            score: 0.0,
            labels: Vec::new(),
            unpositioned: Vec::new(),
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.unpositioned.is_empty()
    }

    /// Distance from the bar center to the outermost drawn extent above the bar.
    pub fn above_extent(&self) -> f64 {
        self.extent(|r| r.top_y(), self.rows_above)
    }

    /// Distance from the bar center to the outermost drawn extent below the bar.
    pub fn below_extent(&self) -> f64 {
        self.extent(|r| -r.bottom_y(), self.rows_below)
    }

    fn extent(&self, reach: impl Fn(&LabelRect) -> f64, rows: usize) -> f64 {
        let edge = self.bar_height / 2.0;
        let mut out = if rows > 0 {
            edge + self.first_row_gap + rows as f64 * self.row_pitch
        } else {
            edge
        };
        for l in &self.labels {
            if l.row != LabelRow::Unpositioned {
                out = out.max(reach(&l.rect));
            }
        }
        out
    }
}

/// One label of the assembled diagram, in absolute coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedLabel {
    pub segment_id: String,
    pub text: String,
    pub variant: LabelVariant,
    pub row: LabelRow,
    pub rect: LabelRect,
    pub leader: Option<Leader>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledLevel {
    pub level: usize,
    /// Absolute y of the bar's horizontal center line.
    pub bar_center_y: f64,
    pub bar_length: f64,
    pub bar_height: f64,
    pub rows_above: usize,
    pub rows_below: usize,
    pub labels: Vec<RenderedLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpositionedLabel {
    pub level: usize,
    pub segment_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramLayout {
    pub levels: Vec<AssembledLevel>,
    pub unpositioned: Vec<UnpositionedLabel>,
    pub bounds: Option<Bounds>,
}
