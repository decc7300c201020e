use serde::{Deserialize, Serialize};

/// TeX points (72.27 per inch) to centimetres.
pub const PT_TO_CM: f64 = 2.54 / 72.27;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    #[default]
    Normal,
    /// Many small categories merged into one block.
    MinorAggregate,
    /// Reads that could not be classified at this level.
    UnidentifiedAggregate,
}

impl SegmentKind {
    pub fn is_aggregate(self) -> bool {
        !matches!(self, SegmentKind::Normal)
    }
}

/// One proportional piece of a stacked bar, as produced by the taxonomy aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSegment {
    pub id: String,
    pub label: String,
    /// Fraction of the bar length, in `[0, 1]`.
    pub proportion: f64,
    #[serde(default)]
    pub kind: SegmentKind,
}

impl BarSegment {
    pub fn new(id: impl Into<String>, label: impl Into<String>, proportion: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            proportion,
            kind: SegmentKind::Normal,
        }
    }

    pub fn with_kind(mut self, kind: SegmentKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Typographic box metrics of one rendered label variant, in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelBox {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl LabelBox {
    /// Sentinel for a box that has not been measured yet, and the box of empty text.
    pub const EMPTY: LabelBox = LabelBox {
        width: 0.0,
        height: 0.0,
        depth: 0.0,
    };

    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn is_valid(&self) -> bool {
        [self.width, self.height, self.depth]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Same box with every dimension converted from points to centimetres.
    pub fn to_cm(&self) -> LabelBox {
        LabelBox {
            width: self.width * PT_TO_CM,
            height: self.height * PT_TO_CM,
            depth: self.depth * PT_TO_CM,
        }
    }

    /// Height above the baseline plus depth below it.
    pub fn total_height(&self) -> f64 {
        self.height + self.depth
    }
}

/// A segment's pending label, before measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCandidate {
    pub segment_id: String,
    pub text: String,
    pub percent_text: String,
    pub level: usize,
    /// Left-to-right index among the level's candidates.
    pub sequence: usize,
    /// Segment center along the bar, in cm.
    pub center_x: f64,
    /// Segment width along the bar, in cm.
    pub segment_width: f64,
}

impl LabelCandidate {
    /// Text of the full label variant (name followed by the percentage).
    pub fn full_text(&self) -> String {
        format!("{} {}", self.text, self.percent_text)
    }

    pub fn variant_text(&self, variant: LabelVariant) -> String {
        match variant {
            LabelVariant::Full => self.full_text(),
            LabelVariant::Percent => self.percent_text.clone(),
            LabelVariant::Name => self.text.clone(),
        }
    }
}

/// Which text variant of a label is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelVariant {
    /// Name followed by the percentage.
    Full,
    Percent,
    Name,
}

impl LabelVariant {
    pub const ALL: [LabelVariant; 3] = [
        LabelVariant::Full,
        LabelVariant::Percent,
        LabelVariant::Name,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LabelVariant::Full => "full",
            LabelVariant::Percent => "percent",
            LabelVariant::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Above,
    Below,
}

impl Side {
    pub fn flip(self) -> Side {
        match self {
            Side::Above => Side::Below,
            Side::Below => Side::Above,
        }
    }

    /// `+1.0` above the bar, `-1.0` below it.
    pub fn sign(self) -> f64 {
        match self {
            Side::Above => 1.0,
            Side::Below => -1.0,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Above => 0,
            Side::Below => 1,
        }
    }
}

/// Where a label ended up relative to its bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum LabelRow {
    /// Drawn inside its own segment, without a leader.
    Inline,
    /// Drawn in row `index` (0 is nearest the bar) on `side`, connected by a leader.
    Row { side: Side, index: usize },
    /// Could not be placed; coordinates are a degenerate off-diagram position.
    Unpositioned,
}

impl LabelRow {
    pub fn row_index(&self) -> Option<usize> {
        match self {
            LabelRow::Row { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            LabelRow::Row { side, .. } => Some(*side),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_box_converts_points_to_cm() {
        let b = LabelBox::new(72.27, 7.227, 0.0).to_cm();
        assert!((b.width - 2.54).abs() < 1e-12);
        assert!((b.height - 0.254).abs() < 1e-12);
        assert!(LabelBox::EMPTY.is_valid());
        assert!(!LabelBox::new(-1.0, 0.0, 0.0).is_valid());
    }

    #[test]
    fn label_row_serializes_with_kind_tag() {
        let v = serde_json::to_value(LabelRow::Row {
            side: Side::Below,
            index: 2,
        })
        .unwrap();
        assert_eq!(
            v,
            serde_json::json!({ "kind": "row", "side": "below", "index": 2 })
        );
    }
}
