use crate::layout::{Point, Rect};

const BAND_TOLERANCE: f32 = 1e-3;

/// Point where the line from `outside` toward `inside` crosses `region`.
///
/// The side facing `outside` on the x axis is tried first; if that hit falls
/// outside the region's band the facing horizontal side is used instead.
pub(super) fn clip_to_boundary(outside: Point, inside: Point, region: &Rect) -> Point {
    let dx = inside.x - outside.x;
    let dy = inside.y - outside.y;
    let center = region.center;

    if dx == 0.0 {
        let sign = if dy > 0.0 { 1.0 } else { -1.0 };
        return Point::new(outside.x, center.y - region.half_height * sign);
    }

    let slope = dy / dx;
    let sign = if dx > 0.0 { 1.0 } else { -1.0 };
    let x = center.x - region.half_width * sign;
    let y = outside.y + (x - outside.x) * slope;
    let hit = Point::new(x, y);
    if region.contains_within(hit, BAND_TOLERANCE) || dy == 0.0 {
        return hit;
    }

    let sign = if dy > 0.0 { 1.0 } else { -1.0 };
    let y = center.y - region.half_height * sign;
    Point::new(outside.x + (y - outside.y) / slope, y)
}

/// Trims the raw polyline to the stretch between leaving `source` and
/// entering `target`. Returns fewer than two points when nothing is left to
/// draw.
pub(super) fn trim_polyline(raw: &[Point], source: &Rect, target: &Rect) -> Vec<Point> {
    let mut points = Vec::with_capacity(raw.len());
    let mut drawing = false;

    for pair in raw.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let leaving = source.contains(p1) && !source.contains(p2);
        let entering = !target.contains(p1) && target.contains(p2);

        if leaving && !drawing {
            drawing = true;
            points.push(clip_to_boundary(p2, p1, source));
        } else if drawing {
            points.push(p1);
        }

        if entering {
            if drawing {
                points.push(clip_to_boundary(p1, p2, target));
            }
            break;
        }
    }

    points.dedup();
    points
}

/// Where the arrow drawn at `end`, the trimmed stroke end of a segment
/// coming from `from`, touches `node`'s own boundary.
///
/// A line that only grazes the node keeps the tip one `size` past `end`.
pub(super) fn arrow_tip(from: Point, end: Point, node: &Rect, size: f32) -> Point {
    let hit = clip_to_boundary(from, end, node);
    if hit.is_finite() && (hit - end).norm() <= size * 4.0 {
        return hit;
    }
    let direction = end - from;
    let length = direction.norm();
    if length == 0.0 {
        return end;
    }
    end + direction * (size / length)
}

/// Vertices of an arrow head running from `base` to `tip`, with a half-base
/// of `size / 4`.
pub(super) fn arrow_head(base: Point, tip: Point, size: f32) -> [Point; 3] {
    let direction = tip - base;
    let length = direction.norm();
    if length == 0.0 {
        return [tip; 3];
    }
    let unit = direction * (1.0 / length);
    let normal = Point::new(-unit.y, unit.x) * (size / 4.0);
    [tip, base + normal, base - normal]
}
