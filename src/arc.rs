// Copyright 2020 The Druid Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Arc geometry: mapping ratio-space spans to points on a circle.
//!
//! Ratio-space puts 0 at 12 o'clock and increases clockwise, one full turn
//! per unit. Everything in this module is pure and deterministic, so it is
//! safe (and intended) to be called every frame.

use std::f64::consts::PI;

use crate::kurbo::{Arc, BezPath, Point, Vec2};

/// The indicator radius for a widget of the given width and stroke
/// thickness: `(width − thickness) / 2`, floored at zero.
///
/// A thickness at or above the width collapses the ring to a point at the
/// center rather than producing a negative radius.
pub fn radius_for(width: f64, thickness: f64) -> f64 {
    if width > thickness {
        (width - thickness) * 0.5
    } else {
        0.0
    }
}

/// A circular arc, resolved to the points a renderer consumes.
///
/// The arc is described twice over: as `(start_angle, sweep_angle)` for
/// building a stroked path, and as the ordered point sequence `points` —
/// the shared start point plus one point per sub-arc boundary. The sweep is
/// split into equal sub-arcs of at most a half turn each, because arc
/// primitives generally cannot represent a larger span in one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcFigure {
    pub center: Point,
    pub radius: f64,
    /// Start angle in radians; 0 is 12 o'clock.
    pub start_angle: f64,
    /// Clockwise sweep in radians, always non-negative.
    pub sweep_angle: f64,
    pub points: Vec<Point>,
}

impl ArcFigure {
    /// Compute the arc for a ratio-space span.
    ///
    /// If `start_ratio` exceeds `end_ratio` the two are swapped: the
    /// rendered arc always runs clockwise from the smaller ratio.
    /// `rotation` is an additional offset in degrees.
    pub fn new(
        start_ratio: f64,
        end_ratio: f64,
        radius: f64,
        rotation: f64,
        center: Point,
    ) -> ArcFigure {
        let (lo, hi) = if start_ratio <= end_ratio {
            (start_ratio, end_ratio)
        } else {
            (end_ratio, start_ratio)
        };
        let offset = rotation.to_radians();
        let start_angle = lo * 2.0 * PI + offset;
        let sweep_angle = (hi - lo) * 2.0 * PI;

        let segments = segment_count(sweep_angle);
        let mut points = Vec::with_capacity(segments + 1);
        for i in 0..=segments {
            let angle = start_angle + sweep_angle * (i as f64) / (segments as f64);
            points.push(point_on_circle(center, radius, angle));
        }

        ArcFigure {
            center,
            radius,
            start_angle,
            sweep_angle,
            points,
        }
    }

    /// The number of sub-arc segments (each at most a half turn).
    pub fn segments(&self) -> usize {
        self.points.len() - 1
    }

    /// Flatten the arc to a stroke-ready path of cubic Beziers.
    pub fn to_path(&self, tolerance: f64) -> BezPath {
        let mut path = BezPath::new();
        match self.points.first() {
            Some(first) => path.move_to(*first),
            None => return path,
        }
        if self.radius <= 0.0 || self.sweep_angle <= 0.0 {
            return path;
        }
        // kurbo measures angles from 3 o'clock; ours start at 12
        let arc = Arc {
            center: self.center,
            radii: Vec2::new(self.radius, self.radius),
            start_angle: self.start_angle - PI / 2.0,
            sweep_angle: self.sweep_angle,
            x_rotation: 0.0,
        };
        arc.to_cubic_beziers(tolerance, |p1, p2, p3| path.curve_to(p1, p2, p3));
        path
    }
}

/// Split a sweep into `ceil(sweep / π)` sub-arcs, with a minimum of one.
fn segment_count(sweep_angle: f64) -> usize {
    ((sweep_angle / PI).ceil() as usize).max(1)
}

fn point_on_circle(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(
        radius * angle.sin() + center.x,
        -radius * angle.cos() + center.y,
    )
}
