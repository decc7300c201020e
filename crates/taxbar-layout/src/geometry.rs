//! Row positions and leader routing.
//!
//! Leader math works in side-local coordinates: `x` along the bar and `t`, the distance
//! outward from the bar edge on the side being filled. A leader is the straight segment from
//! `(center_x, 0)` to `(leader_x, rise)`, where `rise` is the distance from the bar edge to
//! the near edge of the label's row.

use taxbar_core::{LabelBox, Side};

const EPS: f64 = 1e-9;

/// Vertical layout of the rows around one bar, in cm. The bar center is at `y = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowGeometry {
    pub bar_height: f64,
    pub first_row_gap: f64,
    pub row_pitch: f64,
}

impl RowGeometry {
    fn edge(&self) -> f64 {
        self.bar_height / 2.0
    }

    /// Distance from the bar edge to the near edge of `row`.
    pub fn rise(&self, row: usize) -> f64 {
        self.first_row_gap + row as f64 * self.row_pitch
    }

    pub fn near(&self, row: usize) -> f64 {
        self.edge() + self.rise(row)
    }

    /// Baseline of a box whose near edge sits on row `row`'s near edge.
    pub fn baseline_y(&self, side: Side, row: usize, b: &LabelBox) -> f64 {
        match side {
            Side::Above => self.near(row) + b.depth,
            Side::Below => -(self.near(row) + b.height),
        }
    }

    pub fn anchor_y(&self, side: Side) -> f64 {
        side.sign() * self.edge()
    }

    pub fn corner_y(&self, side: Side, row: usize) -> f64 {
        side.sign() * self.near(row)
    }
}

/// A box the leader must not cross, in side-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub x0: f64,
    pub x1: f64,
    pub t0: f64,
    pub t1: f64,
}

/// Feasible range for the leader's corner x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeaderWindow {
    pub min: f64,
    pub max: f64,
}

impl LeaderWindow {
    pub fn unbounded() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    pub fn intersect(self, min: f64, max: f64) -> Option<Self> {
        let out = Self {
            min: self.min.max(min),
            max: self.max.min(max),
        };
        (out.min <= out.max).then_some(out)
    }
}

/// x of the leader at distance `t` from the bar edge.
pub fn x_at(center_x: f64, leader_x: f64, rise: f64, t: f64) -> f64 {
    center_x + (leader_x - center_x) * t / rise
}

/// Traces rays from `center_x` past every obstacle between the bar edge and `rise`.
///
/// Obstacles entirely right of the anchor are passed on their left; all others on their
/// right. Each contributes one bound through the corner that limits the ray. Returns `None`
/// when no straight leader clears them all.
pub fn leader_window(
    center_x: f64,
    rise: f64,
    obstacles: impl IntoIterator<Item = Obstacle>,
    buffer: f64,
) -> Option<LeaderWindow> {
    let mut window = LeaderWindow::unbounded();
    for o in obstacles {
        if o.t0 >= rise - EPS || o.t1 <= EPS {
            continue;
        }
        let t1 = o.t1.min(rise);
        if center_x <= o.x0 - buffer {
            let b = o.x0 - buffer;
            let bound = center_x + (b - center_x) * rise / t1;
            window = window.intersect(f64::NEG_INFINITY, bound)?;
        } else {
            let b = o.x1 + buffer;
            let t = if center_x < b {
                // The anchor is under the obstacle: the near corner limits the ray.
                if o.t0 <= EPS {
                    return None;
                }
                o.t0
            } else {
                t1
            };
            let bound = center_x + (b - center_x) * rise / t;
            window = window.intersect(bound, f64::INFINITY)?;
        }
    }
    Some(window)
}

/// Horizontal reach a leader of at most `max_length` has at vertical distance `rise`.
pub fn max_horizontal_reach(rise: f64, max_length: f64) -> Option<f64> {
    (rise <= max_length).then(|| (max_length * max_length - rise * rise).max(0.0).sqrt())
}

/// Picks the corner x in `window` closest to `center_x` whose offset is at least
/// `min_del_x`, nudging right before left.
pub fn choose_leader_x(center_x: f64, window: LeaderWindow, min_del_x: f64) -> Option<f64> {
    let x = center_x.clamp(window.min, window.max);
    if (x - center_x).abs() >= min_del_x {
        return Some(x);
    }
    let inside = |v: f64| v >= window.min - EPS && v <= window.max + EPS;
    let right = center_x + min_del_x;
    if inside(right) {
        return Some(right);
    }
    let left = center_x - min_del_x;
    if inside(left) {
        return Some(left);
    }
    None
}

/// Rightmost x the leader reaches within the band `[t0, t1]`, or `None` when the leader does
/// not pass through it.
pub fn leader_reach_in_band(
    center_x: f64,
    leader_x: f64,
    rise: f64,
    t0: f64,
    t1: f64,
) -> Option<f64> {
    let t1 = t1.min(rise);
    if t0 >= t1 {
        return None;
    }
    Some(x_at(center_x, leader_x, rise, t0).max(x_at(center_x, leader_x, rise, t1)))
}
