use std::fmt::Write as _;

use crate::config::RenderConfig;
use crate::layout::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveMode {
    Straight,
    /// Corners replaced by circular arcs.
    Rounded { curviness: f32 },
    /// Cubic segments chained through the bend points.
    Bezier { curviness: f32 },
}

impl CurveMode {
    pub fn from_config(config: &RenderConfig) -> Self {
        let curviness = config.curviness;
        if curviness.is_nan() || curviness <= 0.0 {
            Self::Straight
        } else if config.bezier_interpolation {
            Self::Bezier {
                curviness: curviness.min(1.0),
            }
        } else {
            Self::Rounded {
                curviness: curviness.min(1.0),
            }
        }
    }
}

/// SVG path data for `points`, which must hold at least two points.
pub(super) fn path_data(points: &[Point], mode: CurveMode) -> String {
    if points.len() <= 2 {
        return straight_path(points);
    }
    match mode {
        CurveMode::Straight => straight_path(points),
        CurveMode::Rounded { curviness } => rounded_path(points, curviness),
        CurveMode::Bezier { curviness } => bezier_path(points, curviness),
    }
}

fn straight_path(points: &[Point]) -> String {
    let mut d = format!("M {:.2} {:.2}", points[0].x, points[0].y);
    for point in &points[1..] {
        let _ = write!(d, " L {:.2} {:.2}", point.x, point.y);
    }
    d
}

fn rounded_path(points: &[Point], c: f32) -> String {
    let mut d = format!("M {:.2} {:.2}", points[0].x, points[0].y);
    for triple in points.windows(3) {
        let (p1, p2, p3) = (triple[0], triple[1], triple[2]);
        let v1 = p1 - p2;
        let v2 = p3 - p2;
        let radius = v1.norm().min(v2.norm()) * c / 2.0;
        let turn = (p2 - p1).cross(p3 - p1);
        if radius <= 0.0 || turn == 0.0 {
            let _ = write!(d, " L {:.2} {:.2}", p2.x, p2.y);
            continue;
        }
        let a = p2 + v1 * (radius / v1.norm());
        let b = p2 + v2 * (radius / v2.norm());
        let sweep = u8::from(turn > 0.0);
        let _ = write!(
            d,
            " L {:.2} {:.2} A {radius:.2} {radius:.2} 0 0 {sweep} {:.2} {:.2}",
            a.x, a.y, b.x, b.y
        );
    }
    let last = points[points.len() - 1];
    let _ = write!(d, " L {:.2} {:.2}", last.x, last.y);
    d
}

fn bezier_path(points: &[Point], c: f32) -> String {
    let mut d = format!("M {:.2} {:.2}", points[0].x, points[0].y);
    let mut carried = points[0].midpoint(points[1]);
    for triple in points.windows(3) {
        let (p1, p2, p3) = (triple[0], triple[1], triple[2]);
        let bulge = p2 + (p2 - p1.midpoint(p3)) * c;
        let c1 = bulge + (p1 - p2) * (1.0 - c);
        let c2 = bulge + (p3 - p2) * (1.0 - c);
        push_cubic(&mut d, carried, c1, p2);
        carried = c2;
    }
    let n = points.len();
    let closing = points[n - 2].midpoint(points[n - 1]);
    push_cubic(&mut d, carried, closing, points[n - 1]);
    d
}

fn push_cubic(d: &mut String, c1: Point, c2: Point, end: Point) {
    let _ = write!(
        d,
        " C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
        c1.x, c1.y, c2.x, c2.y, end.x, end.y
    );
}
