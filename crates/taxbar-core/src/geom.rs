/// Diagram space: centimetres, x to the right along the bar, y up from the first bar center.
pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Box2D = euclid::Box2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

/// Axis-aligned box from its corners; the corners may be given in any order.
pub fn box2d(x0: f64, y0: f64, x1: f64, y1: f64) -> Box2D {
    Box2D::new(point(x0.min(x1), y0.min(y1)), point(x0.max(x1), y0.max(y1)))
}

/// Whether the open interiors of two boxes intersect. Touching edges do not count.
pub fn interiors_intersect(a: &Box2D, b: &Box2D) -> bool {
    a.min.x < b.max.x && b.min.x < a.max.x && a.min.y < b.max.y && b.min.y < a.max.y
}

/// Whether the segment `p0`-`p1` passes through the open interior of `b`.
///
/// Uses Liang-Barsky clipping against the box; a segment that only grazes an edge or a corner
/// is not considered crossing.
pub fn segment_crosses_interior(p0: Point, p1: Point, b: &Box2D, eps: f64) -> bool {
    let inner = Box2D::new(
        point(b.min.x + eps, b.min.y + eps),
        point(b.max.x - eps, b.max.y - eps),
    );
    if inner.is_empty() {
        return false;
    }
    let d = p1 - p0;
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    let checks = [
        (-d.x, p0.x - inner.min.x),
        (d.x, inner.max.x - p0.x),
        (-d.y, p0.y - inner.min.y),
        (d.y, inner.max.y - p0.y),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return false;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return false;
        }
    }
    t1 - t0 > 0.0
}
