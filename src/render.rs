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

//! The render boundary: a declarative scene description and a piet helper
//! for stroking it.
//!
//! The spinner core never constructs visual-tree elements; it only emits a
//! [`SpinnerScene`] describing what to draw. A host embeds that however it
//! likes — the provided [`draw_scene`] covers the common case of painting
//! straight into a piet [`RenderContext`].

use piet::{Color, LineCap, RenderContext, StrokeStyle};

use crate::arc::ArcFigure;
use crate::kurbo::{Circle, Point};
use crate::theme;

/// Path flattening tolerance for the indicator arc.
const ARC_TOLERANCE: f64 = 0.1;

/// Stroke parameters: thickness and color, always with round caps.
#[derive(Debug, Clone)]
pub struct Pen {
    pub thickness: f64,
    pub color: Color,
}

impl Pen {
    pub fn new(thickness: f64, color: Color) -> Pen {
        Pen { thickness, color }
    }

    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle::new().line_cap(LineCap::Round)
    }
}

/// The background ring behind the indicator.
#[derive(Debug, Clone)]
pub struct TrackRing {
    pub center: Point,
    pub radius: f64,
    pub pen: Pen,
}

/// Everything needed to draw one frame of the spinner.
///
/// Pushed to the [`RenderSink`] on every geometry recomputation; a full
/// redraw each time is cheap at this scale, so no diffing is offered.
#[derive(Debug, Clone)]
pub struct SpinnerScene {
    pub track: TrackRing,
    pub indicator: ArcFigure,
    pub indicator_pen: Pen,
}

impl Default for SpinnerScene {
    fn default() -> Self {
        SpinnerScene {
            track: TrackRing {
                center: Point::ORIGIN,
                radius: 0.0,
                pen: Pen::new(theme::DEFAULT_CIRCLE_THICKNESS, theme::DEFAULT_BACKGROUND),
            },
            indicator: ArcFigure::new(0.0, 0.0, 0.0, 0.0, Point::ORIGIN),
            indicator_pen: Pen::new(theme::DEFAULT_CIRCLE_THICKNESS, theme::DEFAULT_FOREGROUND),
        }
    }
}

/// Receives the scene whenever the spinner's geometry changes.
pub trait RenderSink {
    fn update_scene(&mut self, scene: &SpinnerScene);
}

/// Stroke a scene into a piet render context.
pub fn draw_scene(rc: &mut impl RenderContext, scene: &SpinnerScene) {
    if scene.track.radius > 0.0 {
        let ring = Circle::new(scene.track.center, scene.track.radius);
        rc.stroke(ring, &scene.track.pen.color, scene.track.pen.thickness);
    }
    if scene.indicator.radius > 0.0 && scene.indicator.sweep_angle > 0.0 {
        let path = scene.indicator.to_path(ARC_TOLERANCE);
        rc.stroke_styled(
            path,
            &scene.indicator_pen.color,
            scene.indicator_pen.thickness,
            &scene.indicator_pen.stroke_style(),
        );
    }
}
