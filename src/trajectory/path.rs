//! Geometry of a single move
//!
//! A [`MovePath`] is either the straight segment from start to end or a
//! cubic Bezier whose control points sit at one and two thirds of that
//! segment, pushed sideways. Both keep the along-track coordinate linear in
//! the curve parameter, so progress measured by projection onto the
//! start-to-end direction equals the eased time fraction.

use rand::Rng;

use crate::types::{EasingKind, Point};

type Vec2 = (f64, f64);

fn to_vec(p: Point) -> Vec2 {
    (p.x as f64, p.y as f64)
}

pub(crate) fn round_point(v: Vec2) -> Point {
    Point::new(v.0.round() as i32, v.1.round() as i32)
}

#[derive(Debug, Clone)]
pub(crate) struct MovePath {
    start: Vec2,
    end: Vec2,
    /// Unit vector from start to end
    dir: Vec2,
    /// Unit vector perpendicular to `dir`
    normal: Vec2,
    distance: f64,
    /// Bezier control points; `None` for a straight path
    controls: Option<(Vec2, Vec2)>,
}

impl MovePath {
    /// Build the path for a move. Draws two values from `rng` for
    /// [`EasingKind::BezierHuman`] with a non-zero bulge, nothing otherwise.
    pub fn new<R: Rng + ?Sized>(
        start: Point,
        end: Point,
        easing: EasingKind,
        jitter: f64,
        rng: &mut R,
    ) -> Self {
        let start = to_vec(start);
        let end = to_vec(end);
        let delta = (end.0 - start.0, end.1 - start.1);
        let distance = (delta.0 * delta.0 + delta.1 * delta.1).sqrt();
        let dir = if distance > 0.0 {
            (delta.0 / distance, delta.1 / distance)
        } else {
            (1.0, 0.0)
        };
        let normal = (-dir.1, dir.0);

        let bulge = jitter * distance;
        let controls = if easing == EasingKind::BezierHuman && bulge > 0.0 {
            let m1: f64 = rng.gen_range(-bulge..=bulge);
            let m2: f64 = rng.gen_range(-bulge..=bulge);
            let c1 = (
                start.0 + delta.0 / 3.0 + normal.0 * m1,
                start.1 + delta.1 / 3.0 + normal.1 * m1,
            );
            let c2 = (
                start.0 + delta.0 * 2.0 / 3.0 + normal.0 * m2,
                start.1 + delta.1 * 2.0 / 3.0 + normal.1 * m2,
            );
            Some((c1, c2))
        } else {
            None
        };

        Self {
            start,
            end,
            dir,
            normal,
            distance,
            controls,
        }
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Point at progress `u` in `[0, 1]`
    pub fn point_at(&self, u: f64) -> Vec2 {
        match self.controls {
            None => (
                self.start.0 + (self.end.0 - self.start.0) * u,
                self.start.1 + (self.end.1 - self.start.1) * u,
            ),
            Some((c1, c2)) => {
                let v = 1.0 - u;
                let b0 = v * v * v;
                let b1 = 3.0 * v * v * u;
                let b2 = 3.0 * v * u * u;
                let b3 = u * u * u;
                (
                    b0 * self.start.0 + b1 * c1.0 + b2 * c2.0 + b3 * self.end.0,
                    b0 * self.start.1 + b1 * c1.1 + b2 * c2.1 + b3 * self.end.1,
                )
            }
        }
    }

    /// Progress of a point in pixels along the start-to-end direction
    pub fn along(&self, p: Point) -> f64 {
        let v = to_vec(p);
        (v.0 - self.start.0) * self.dir.0 + (v.1 - self.start.1) * self.dir.1
    }

    /// Replace the along-track component of `p`, keeping its sideways offset
    pub fn with_along(&self, p: Point, along: f64) -> Vec2 {
        let v = to_vec(p);
        let side = (v.0 - self.start.0) * self.normal.0 + (v.1 - self.start.1) * self.normal.1;
        (
            self.start.0 + self.dir.0 * along + self.normal.0 * side,
            self.start.1 + self.dir.1 * along + self.normal.1 * side,
        )
    }
}
