//! Post-placement checks of a level's geometry.
//!
//! The row search is built so these never fire; the checks exist to catch regressions and
//! to verify layouts loaded from elsewhere.

use crate::model::{LevelLayout, PositionedLabel};
use std::fmt;
use taxbar_core::geom::{Box2D, box2d, interiors_intersect, point, segment_crosses_interior};
use taxbar_core::{LabelRow, PlacementConfig};

const TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    Overlap {
        first: String,
        second: String,
    },
    LeaderCrossing {
        leader: String,
        label: String,
    },
    LeaderOffsetTooSmall {
        segment_id: String,
        offset: f64,
    },
    LeaderTooLong {
        segment_id: String,
        length: f64,
    },
    OutOfBounds {
        segment_id: String,
        left_x: f64,
        right_x: f64,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Overlap { first, second } => {
                write!(f, "labels {first} and {second} overlap")
            }
            Violation::LeaderCrossing { leader, label } => {
                write!(f, "leader of {leader} crosses label {label}")
            }
            Violation::LeaderOffsetTooSmall { segment_id, offset } => {
                write!(f, "leader of {segment_id} has horizontal offset {offset:.4}")
            }
            Violation::LeaderTooLong { segment_id, length } => {
                write!(f, "leader of {segment_id} is {length:.4} cm long")
            }
            Violation::OutOfBounds {
                segment_id,
                left_x,
                right_x,
            } => write!(
                f,
                "label {segment_id} spans {left_x:.4}..{right_x:.4} outside the drawable range"
            ),
        }
    }
}

fn rect_box(l: &PositionedLabel) -> Box2D {
    box2d(
        l.rect.left_x + TOLERANCE,
        l.rect.bottom_y() + TOLERANCE,
        l.rect.right_x() - TOLERANCE,
        l.rect.top_y() - TOLERANCE,
    )
}

fn label_name(l: &PositionedLabel) -> String {
    format!("{}/{}", l.segment_id, l.variant.as_str())
}

/// Returns every invariant the placed labels of `level` break. Unpositioned labels are skipped.
pub fn check_level(level: &LevelLayout, cfg: &PlacementConfig) -> Vec<Violation> {
    let placed = level
        .labels
        .iter()
        .filter(|l| l.row != LabelRow::Unpositioned)
        .collect::<Vec<_>>();
    let boxes = placed.iter().map(|l| rect_box(l)).collect::<Vec<_>>();
    let mut out = Vec::new();

    for (i, a) in placed.iter().enumerate() {
        let outside = a.rect.left_x < cfg.min_x() - TOLERANCE
            || a.rect.right_x() > cfg.max_x() + TOLERANCE;
        if outside && matches!(a.row, LabelRow::Row { .. }) {
            out.push(Violation::OutOfBounds {
                segment_id: a.segment_id.clone(),
                left_x: a.rect.left_x,
                right_x: a.rect.right_x(),
            });
        }
        for (j, b) in placed.iter().enumerate().skip(i + 1) {
            if interiors_intersect(&boxes[i], &boxes[j]) {
                out.push(Violation::Overlap {
                    first: label_name(a),
                    second: label_name(b),
                });
            }
        }
    }

    for a in &placed {
        let Some(leader) = a.leader else {
            continue;
        };
        let offset = leader.horizontal_offset().abs();
        if offset < cfg.min_del_x - TOLERANCE {
            out.push(Violation::LeaderOffsetTooSmall {
                segment_id: a.segment_id.clone(),
                offset,
            });
        }
        let length = leader.length();
        if length > cfg.max_leader_length + TOLERANCE {
            out.push(Violation::LeaderTooLong {
                segment_id: a.segment_id.clone(),
                length,
            });
        }
        let p0 = point(leader.anchor.x, leader.anchor.y);
        let p1 = point(leader.corner.x, leader.corner.y);
        for (b, bx) in placed.iter().zip(&boxes) {
            if b.segment_id == a.segment_id {
                continue;
            }
            if segment_crosses_interior(p0, p1, bx, 0.0) {
                out.push(Violation::LeaderCrossing {
                    leader: a.segment_id.clone(),
                    label: label_name(b),
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LabelRect, LayoutPoint, Leader};
    use taxbar_core::{LabelVariant, Side};

    fn row_label(id: &str, left_x: f64, anchor_x: f64, corner_x: f64) -> PositionedLabel {
        PositionedLabel {
            segment_id: id.to_string(),
            text: id.to_string(),
            variant: LabelVariant::Full,
            sequence: 0,
            row: LabelRow::Row {
                side: Side::Above,
                index: 0,
            },
            rect: LabelRect {
                left_x,
                baseline_y: 0.55,
                width: 2.0,
                height: 0.25,
                depth: 0.05,
            },
            leader_x: corner_x,
            leader: Some(Leader {
                anchor: LayoutPoint::new(anchor_x, 0.25),
                corner: LayoutPoint::new(corner_x, 0.5),
            }),
        }
    }

    fn level(labels: Vec<PositionedLabel>) -> LevelLayout {
        LevelLayout {
            labels,
            ..LevelLayout::empty(0, 13.0, 0.5)
        }
    }

    #[test]
    fn clean_level_has_no_violations() {
        let l = level(vec![row_label("a", 0.0, 1.0, 1.2), row_label("b", 3.0, 4.0, 4.2)]);
        assert!(check_level(&l, &PlacementConfig::default()).is_empty());
    }

    #[test]
    fn reports_overlap_and_short_leader() {
        let l = level(vec![row_label("a", 0.0, 1.0, 1.05), row_label("b", 1.5, 4.0, 3.0)]);
        let v = check_level(&l, &PlacementConfig::default());
        assert!(v.contains(&Violation::Overlap {
            first: "a/full".to_string(),
            second: "b/full".to_string()
        }));
        assert!(v.iter().any(|v| matches!(
            v,
            Violation::LeaderOffsetTooSmall { segment_id, .. } if segment_id == "a"
        )));
    }

    #[test]
    fn reports_leader_through_a_lower_label() {
        let mut high = row_label("a", 5.0, 1.0, 5.5);
        high.rect.baseline_y = 1.5;
        if let Some(leader) = high.leader.as_mut() {
            leader.corner = LayoutPoint::new(5.5, 1.45);
        }
        let low = row_label("b", 2.0, 3.0, 3.2);
        let v = check_level(&level(vec![high, low]), &PlacementConfig::default());
        assert!(v.iter().any(|v| matches!(
            v,
            Violation::LeaderCrossing { leader, .. } if leader == "a"
        )));
        assert!(v.iter().any(|v| v.to_string().contains("crosses label b/full")));
    }
}
