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

//! Easing functions: pure maps from normalized time to normalized progress.
//!
//! All of these are total on `[0.0, 1.0] -> [0.0, 1.0]`; inputs outside that
//! range are clamped at the boundary.

use crate::kurbo::{CubicBez, ParamCurve, Point};

/// Quadratic ease-in: `t²`.
pub fn ease_in_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Quadratic ease-out: `1 − (1−t)²`.
pub fn ease_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Symmetric quadratic ease-in-out.
///
/// Accelerates through the first half (`2t²`) and decelerates through the
/// second (`1 − 2(1−t)²`), meeting at `(0.5, 0.5)`.
pub fn ease_in_out_quad(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - 2.0 * (1.0 - t) * (1.0 - t)
    }
}

/// A unit cubic Bezier easing curve, in the CSS `cubic-bezier` style.
///
/// The curve runs from `(0, 0)` to `(1, 1)` with the two control points
/// given at construction. Evaluation solves `x(s) = t` for the curve
/// parameter `s` and returns `y(s)`; because the x-polynomial of a unit
/// easing curve is monotonic, a bisection search converges quickly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicEase {
    bez: CubicBez,
}

impl CubicEase {
    /// Create an easing curve with control points `(x1, y1)` and `(x2, y2)`.
    ///
    /// The x coordinates should lie in `[0, 1]` so that the curve stays a
    /// function of time.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> CubicEase {
        CubicEase {
            bez: CubicBez::new(
                Point::ORIGIN,
                Point::new(x1, y1),
                Point::new(x2, y2),
                Point::new(1.0, 1.0),
            ),
        }
    }

    /// Evaluate the easing at time `t` in `[0, 1]`.
    pub fn eval(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        let mut lo = 0.0;
        let mut hi = 1.0;
        for _ in 0..32 {
            let mid = 0.5 * (lo + hi);
            if self.bez.eval(mid).x < t {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        self.bez.eval(0.5 * (lo + hi)).y
    }
}
