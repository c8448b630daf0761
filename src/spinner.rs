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

//! The spinner core: a circular progress indicator's animation state
//! machine.
//!
//! [`ProgressSpinner`] owns every continuous parameter of one indicator and
//! reacts to external property changes (value, progress state, visibility,
//! size) by choosing which animation to start or stop. It is driven by the
//! host's frame clock via [`ProgressSpinner::tick`] and emits a
//! [`SpinnerScene`] whenever its geometry changes.

use piet::Color;
use tracing::debug;

use crate::animation::{
    Animation, AnimationCurve, AnimationDriver, EaseTarget, Keyframe, Param, SpanFrame,
};
use crate::arc::{radius_for, ArcFigure};
use crate::easing::CubicEase;
use crate::kurbo::Point;
use crate::render::{Pen, RenderSink, SpinnerScene, TrackRing};
use crate::theme;

/// Base unit for animation durations, in seconds. One spin cycle takes
/// twice this.
const ANIMATION_DURATION_BASIS: f64 = 1.5;

const CYCLE_DURATION: f64 = ANIMATION_DURATION_BASIS * 2.0;

/// Where the entering transition joins the spin cycle: the end ratio of
/// the cycle's midpoint frame, one wrap past the short arc.
const CYCLE_WRAP_RATIO: f64 = 1.1;

/// Seconds per unit of ratio-distance covered by the entering transition.
const ENTER_SECS_PER_TURN: f64 = 0.625;

/// Fixed part of the entering transition's duration, in seconds.
const ENTER_SECS_BASE: f64 = 0.8;

/// Below this indicator position, exiting the cycle plays an extra settle
/// curve instead of snapping through a tiny arc.
const SETTLE_THRESHOLD: f64 = 0.1;

/// Duration of the smooth value tween, independent of distance.
const VALUE_TWEEN_SECS: f64 = 0.5;

/// The externally-set progress state.
///
/// Only `Indeterminate` changes the core's behavior; the remaining states
/// all render as plain determinate progress and are reserved for hosts
/// that want to restyle them (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    None,
    Indeterminate,
    Normal,
    Completed,
    Paused,
    Error,
}

impl ProgressState {
    pub fn is_indeterminate(self) -> bool {
        self == ProgressState::Indeterminate
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        ProgressState::None
    }
}

/// Which animation is currently playing.
///
/// Together with visibility this covers the machine's six states: the four
/// animated phases plus the dormant (hidden) forms of `Determinate` and
/// the indeterminate cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerPhase {
    /// No indicator animation; the arc mirrors the progress ratio.
    Determinate,
    /// Transitioning from a static arc onto the spin cycle.
    Entering,
    /// The perpetual spin-and-stretch cycle.
    Cycling,
    /// The extra wrap played when leaving the cycle near its start point.
    Settling,
    /// Transitioning from the cycle back to a static arc.
    Exiting,
}

/// A self-drawing circular progress indicator.
///
/// All parameters are owned exclusively by one instance; instances are
/// fully independent. The host feeds property changes through the `set_*`
/// methods and frame intervals through [`tick`]; while
/// [`needs_anim_frame`] returns true the host should keep ticking, the
/// same way a druid widget keeps calling `request_anim_frame`.
///
/// [`tick`]: ProgressSpinner::tick
/// [`needs_anim_frame`]: ProgressSpinner::needs_anim_frame
pub struct ProgressSpinner {
    minimum: f64,
    maximum: f64,
    value: f64,
    progress_state: ProgressState,
    phase: SpinnerPhase,
    visible: bool,
    width: f64,
    height: f64,
    circle_thickness: f64,
    circle_scale: f64,
    foreground: Color,
    background: Color,
    driver: AnimationDriver,
    /// A value change deferred until the in-flight enter/exit transition
    /// completes.
    pending_value: Option<f64>,
    scene: SpinnerScene,
    sink: Option<Box<dyn RenderSink>>,
}

impl ProgressSpinner {
    pub fn new() -> ProgressSpinner {
        let mut spinner = ProgressSpinner {
            minimum: 0.0,
            maximum: 100.0,
            value: 0.0,
            progress_state: ProgressState::default(),
            phase: SpinnerPhase::Determinate,
            visible: true,
            width: theme::DEFAULT_SIZE,
            height: theme::DEFAULT_SIZE,
            circle_thickness: theme::DEFAULT_CIRCLE_THICKNESS,
            circle_scale: 1.0,
            foreground: theme::DEFAULT_FOREGROUND,
            background: theme::DEFAULT_BACKGROUND,
            driver: AnimationDriver::new(SpanFrame::new(0.0, 0.0, 0.0), 0.0),
            pending_value: None,
            scene: SpinnerScene::default(),
            sink: None,
        };
        spinner.update_indicator();
        spinner
    }

    /// Builder-style method for setting the initial progress state.
    pub fn with_progress_state(mut self, state: ProgressState) -> Self {
        self.set_progress_state(state);
        self
    }

    /// Builder-style method for setting the range.
    pub fn with_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.set_minimum(minimum);
        self.set_maximum(maximum);
        self
    }

    /// Builder-style method for setting the widget size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.set_size(width, height);
        self
    }

    /// Builder-style method for setting the ring stroke thickness.
    pub fn with_circle_thickness(mut self, thickness: f64) -> Self {
        self.set_circle_thickness(thickness);
        self
    }

    /// Builder-style method for setting the uniform scale factor.
    pub fn with_circle_scale(mut self, scale: f64) -> Self {
        self.set_circle_scale(scale);
        self
    }

    /// Builder-style method for setting the indicator color.
    pub fn with_foreground(mut self, color: Color) -> Self {
        self.set_foreground(color);
        self
    }

    /// Builder-style method for setting the track ring color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.set_background(color);
        self
    }

    /// Attach the render sink that receives every geometry push.
    pub fn set_render_sink(&mut self, mut sink: Box<dyn RenderSink>) {
        sink.update_scene(&self.scene);
        self.sink = Some(sink);
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// The logical (target) value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The displayed value, which trails the logical one while a smooth
    /// value tween is running.
    pub fn displayed_value(&self) -> f64 {
        self.driver.current_value()
    }

    pub fn progress_state(&self) -> ProgressState {
        self.progress_state
    }

    /// Read-only derived flag: whether the progress state is
    /// `Indeterminate`.
    pub fn is_indeterminate(&self) -> bool {
        self.progress_state.is_indeterminate()
    }

    pub fn phase(&self) -> SpinnerPhase {
        self.phase
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn animation_speed_ratio(&self) -> f64 {
        self.driver.speed_ratio()
    }

    pub fn circle_thickness(&self) -> f64 {
        self.circle_thickness
    }

    pub fn circle_scale(&self) -> f64 {
        self.circle_scale
    }

    /// The most recently computed scene.
    pub fn scene(&self) -> &SpinnerScene {
        &self.scene
    }

    /// True while any animation is running; the host should keep feeding
    /// frame ticks.
    pub fn needs_anim_frame(&self) -> bool {
        self.visible && self.driver.is_animating()
    }

    /// The fraction of the range covered by the logical value.
    ///
    /// A degenerate range (`maximum <= minimum`) reads as fully complete
    /// rather than dividing by zero.
    pub fn progress_ratio(&self) -> f64 {
        progress_ratio(self.minimum, self.maximum, self.value)
    }

    /// The ratio actually drawn, following the displayed value.
    pub fn displayed_ratio(&self) -> f64 {
        progress_ratio(self.minimum, self.maximum, self.driver.current_value())
    }

    /// Set the logical value; the displayed value follows with a short
    /// constant-duration tween while determinate.
    pub fn set_value(&mut self, value: f64) {
        let value = value.clamp(self.minimum, self.maximum);
        if value == self.value {
            return;
        }
        self.value = value;
        if value == self.maximum && self.progress_state == ProgressState::Normal {
            self.set_progress_state(ProgressState::Completed);
        }
        self.begin_smooth_value(value);
        self.update_indicator();
    }

    pub fn set_minimum(&mut self, minimum: f64) {
        self.minimum = minimum;
        if self.maximum < minimum {
            self.maximum = minimum;
        }
        self.value = self.value.clamp(self.minimum, self.maximum);
        self.driver.jump_value(self.value);
        self.update_indicator();
    }

    pub fn set_maximum(&mut self, maximum: f64) {
        self.maximum = maximum.max(self.minimum);
        self.value = self.value.clamp(self.minimum, self.maximum);
        self.driver.jump_value(self.value);
        self.update_indicator();
    }

    pub fn set_progress_state(&mut self, state: ProgressState) {
        if state == self.progress_state {
            return;
        }
        debug!("progress state {:?} -> {:?}", self.progress_state, state);
        self.progress_state = state;
        self.update_animation();
        self.update_indicator();
    }

    /// Show or hide the widget. Hiding cancels every running animation
    /// immediately (no completions fire); showing again resumes the
    /// logical state, re-entering the cycle if still indeterminate.
    pub fn set_visible(&mut self, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if visible {
            self.driver.jump_value(self.value);
            self.pending_value = None;
            if self.is_indeterminate() {
                self.enter_indeterminate();
            } else {
                self.driver.jump_rotation(0.0);
                self.phase = SpinnerPhase::Determinate;
            }
            self.update_indicator();
        } else {
            self.driver.stop_all();
            self.phase = SpinnerPhase::Determinate;
            debug!("hidden; animations cancelled");
        }
    }

    /// Set the widget size. The ring is sized to the shorter side and
    /// centered in the box.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.update_indicator();
    }

    /// Set the ring stroke thickness, coerced to at least zero.
    pub fn set_circle_thickness(&mut self, thickness: f64) {
        self.circle_thickness = thickness.max(0.0);
        self.update_indicator();
    }

    /// Set the uniform scale applied to the emitted geometry (center,
    /// radius and stroke thickness alike), coerced to at least zero.
    pub fn set_circle_scale(&mut self, scale: f64) {
        self.circle_scale = scale.max(0.0);
        self.update_indicator();
    }

    /// Set the animation speed ratio, coerced to at least 0.1. Running
    /// animations rescale their remaining time without restarting.
    pub fn set_animation_speed_ratio(&mut self, ratio: f64) {
        self.driver.set_speed_ratio(ratio);
    }

    pub fn set_foreground(&mut self, color: Color) {
        self.foreground = color;
        self.update_indicator();
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
        self.update_indicator();
    }

    /// Advance the animations by one frame interval (nanoseconds, as
    /// delivered by an `AnimFrame` event) and recompute the geometry.
    ///
    /// Natural animation completions are dispatched to the central
    /// transition function before the geometry push, so within one tick
    /// every dependent recomputation settles before the host sees the new
    /// scene.
    pub fn tick(&mut self, interval: u64) {
        if !self.visible {
            return;
        }
        for param in self.driver.tick(interval) {
            self.on_complete(param);
        }
        self.update_indicator();
    }

    /// The one place animation completions are handled; chained phases
    /// start here rather than in per-property callbacks.
    fn on_complete(&mut self, param: Param) {
        match (self.phase, param) {
            (SpinnerPhase::Entering, Param::Span) => {
                // joined the cycle at its midpoint frame
                self.start_back_half_cycle();
                self.apply_pending_value();
            }
            (SpinnerPhase::Cycling, Param::Span) => self.start_full_cycle(),
            (SpinnerPhase::Settling, Param::Span) => self.start_direct_exit(),
            (SpinnerPhase::Exiting, Param::Span) => {
                debug!("exit transition finished");
                self.phase = SpinnerPhase::Determinate;
                self.apply_pending_value();
            }
            _ => {}
        }
    }

    fn update_animation(&mut self) {
        if self.is_indeterminate() && self.visible {
            match self.phase {
                SpinnerPhase::Entering | SpinnerPhase::Cycling => {}
                _ => self.enter_indeterminate(),
            }
        } else {
            match self.phase {
                SpinnerPhase::Entering | SpinnerPhase::Cycling | SpinnerPhase::Settling => {
                    self.exit_indeterminate()
                }
                _ => {}
            }
        }
    }

    /// Transition 1: from the current static arc onto the spin cycle.
    ///
    /// The span stretches from `(0, ratio)` to the cycle's midpoint frame
    /// while the rotation winds up to 180 degrees alongside; the duration
    /// scales with how far the arc's end must travel.
    fn enter_indeterminate(&mut self) {
        let ratio = self.displayed_ratio();
        let duration = enter_duration(ratio);
        self.driver.start_span(
            Animation::line(SpanFrame::new(1.0, CYCLE_WRAP_RATIO, 1.0))
                .with_curve(AnimationCurve::EaseInOut)
                .with_duration(duration),
        );
        self.driver.start_rotation(
            Animation::line(180.0)
                .with_curve(AnimationCurve::EaseIn)
                .with_duration(duration),
        );
        self.phase = SpinnerPhase::Entering;
        debug!("entering indeterminate from ratio {:.3}", ratio);
    }

    /// Transition 2: off the cycle, back to a static arc.
    ///
    /// Whole turns are folded out first (they are visually identity), and
    /// the leftover rotation unwinds to zero alongside the span. Close to
    /// the cycle's start point the span first plays one settle curve so
    /// the indicator wraps gracefully instead of snapping.
    fn exit_indeterminate(&mut self) {
        let plan = ExitPlan::new(self.driver.current_span(), self.driver.current_rotation());
        if plan.settle {
            let ratio = self.progress_ratio();
            let target = SpanFrame::new(1.0, 1.0 + ratio, 1.0);
            let distance = (target.end - plan.frame.end).abs();
            self.driver.start_span(
                Animation::line_from(plan.frame, target)
                    .with_curve(AnimationCurve::Bezier(settle_ease()))
                    .with_duration(ANIMATION_DURATION_BASIS * distance),
            );
            self.phase = SpinnerPhase::Settling;
            debug!("exiting via settle curve");
        } else {
            self.start_exit_from(plan, 0.0);
        }
        self.driver.start_rotation(
            Animation::line_from(plan.rotation, 0.0)
                .with_curve(AnimationCurve::EaseInOut)
                .with_duration(ANIMATION_DURATION_BASIS * plan.rotation.abs() / 360.0),
        );
    }

    /// The tail of transition 2, also chained after a settle curve.
    fn start_direct_exit(&mut self) {
        let plan = ExitPlan::new(self.driver.current_span(), self.driver.current_rotation());
        let carry = self.driver.overshoot(Param::Span);
        self.start_exit_from(plan, carry);
    }

    fn start_exit_from(&mut self, plan: ExitPlan, carry: f64) {
        let target = SpanFrame::new(0.0, self.progress_ratio(), 0.0);
        let distance = plan.frame.start.abs().max(plan.frame.end.abs());
        self.driver.start_span(
            Animation::line_from(plan.frame, target)
                .with_duration(ANIMATION_DURATION_BASIS * distance)
                .advanced_by(carry),
        );
        self.phase = SpinnerPhase::Exiting;
        debug!("exiting indeterminate over {:.3}s", ANIMATION_DURATION_BASIS * distance);
    }

    /// The back half of the spin cycle, picking up from the midpoint frame
    /// the entering transition lands on.
    fn start_back_half_cycle(&mut self) {
        let carry = self.driver.overshoot(Param::Span);
        let frames = vec![
            Keyframe::new(0.0, SpanFrame::new(1.0, 1.1, 1.0), EaseTarget::None),
            Keyframe::new(0.5, SpanFrame::new(1.1, 2.0, 1.0), EaseTarget::End),
            Keyframe::new(1.0, SpanFrame::new(2.0, 2.1, 1.0), EaseTarget::Start),
        ];
        self.driver.start_span(
            Animation::keyframes(frames)
                .with_duration(CYCLE_DURATION / 2.0)
                .advanced_by(carry),
        );
        self.driver.start_rotation(
            Animation::line_from(180.0, 360.0)
                .with_duration(CYCLE_DURATION / 2.0)
                .advanced_by(carry),
        );
        self.phase = SpinnerPhase::Cycling;
    }

    /// The perpetual spin-and-stretch cycle: the arc's end races a wrap
    /// ahead with an eased stretch, then the start catches up, twice per
    /// cycle, while the whole figure rotates one turn. The last frame is a
    /// full turn past the first, so the loop seam is invisible.
    fn start_full_cycle(&mut self) {
        let carry = self.driver.overshoot(Param::Span);
        let frames = vec![
            Keyframe::new(0.0, SpanFrame::new(0.0, 0.1, 1.0), EaseTarget::None),
            Keyframe::new(0.25, SpanFrame::new(0.1, 1.0, 1.0), EaseTarget::End),
            Keyframe::new(0.5, SpanFrame::new(1.0, 1.1, 1.0), EaseTarget::Start),
            Keyframe::new(0.75, SpanFrame::new(1.1, 2.0, 1.0), EaseTarget::End),
            Keyframe::new(1.0, SpanFrame::new(2.0, 2.1, 1.0), EaseTarget::Start),
        ];
        self.driver.start_span(
            Animation::keyframes(frames)
                .with_duration(CYCLE_DURATION)
                .looping(true)
                .advanced_by(carry),
        );
        self.driver.start_rotation(
            Animation::line_from(0.0, 360.0)
                .with_duration(CYCLE_DURATION)
                .looping(true)
                .advanced_by(carry),
        );
        self.phase = SpinnerPhase::Cycling;
    }

    /// Transition 5: smooth the displayed value toward `target`.
    fn begin_smooth_value(&mut self, target: f64) {
        match self.phase {
            // while indeterminate the value is invisible; set it directly
            SpinnerPhase::Cycling => self.driver.jump_value(target),
            SpinnerPhase::Determinate => {
                self.driver.start_value(
                    Animation::line(target)
                        .with_curve(AnimationCurve::EaseOut)
                        .with_duration(VALUE_TWEEN_SECS),
                );
            }
            // tweening would fight an in-flight transition; defer
            SpinnerPhase::Entering | SpinnerPhase::Settling | SpinnerPhase::Exiting => {
                self.pending_value = Some(target);
            }
        }
    }

    fn apply_pending_value(&mut self) {
        if let Some(target) = self.pending_value.take() {
            if target != self.driver.current_value() {
                self.begin_smooth_value(target);
            }
        }
    }

    /// Recompute the arc geometry from the current continuous parameters
    /// and push the scene. Idempotent; no side effects beyond the scene.
    fn update_indicator(&mut self) {
        if self.phase == SpinnerPhase::Determinate && !self.is_indeterminate() {
            // keep the resting frame in sync with the static arc so the
            // next entering transition hands off cleanly
            self.driver
                .jump_span(SpanFrame::new(0.0, self.displayed_ratio(), 0.0));
        }

        let scale = self.circle_scale;
        let side = self.width.min(self.height);
        let radius = radius_for(side, self.circle_thickness) * scale;
        let thickness = self.circle_thickness * scale;
        let center = Point::new(self.width * scale / 2.0, self.height * scale / 2.0);
        let frame = self.driver.current_span();
        let rotation = self.driver.current_rotation();
        let ratio = self.displayed_ratio();

        let blend = frame.blend.clamp(0.0, 1.0);
        let (lo, hi) = if frame.start <= frame.end {
            (frame.start, frame.end)
        } else {
            (frame.end, frame.start)
        };
        let start_ratio = lo * blend;
        let end_ratio = hi * blend + ratio * (1.0 - blend);

        self.scene = SpinnerScene {
            track: TrackRing {
                center,
                radius,
                pen: Pen::new(thickness, self.background.clone()),
            },
            indicator: ArcFigure::new(start_ratio, end_ratio, radius, rotation, center),
            indicator_pen: Pen::new(thickness, self.foreground.clone()),
        };
        if let Some(sink) = &mut self.sink {
            sink.update_scene(&self.scene);
        }
    }
}

impl Default for ProgressSpinner {
    fn default() -> Self {
        ProgressSpinner::new()
    }
}

/// `(value − minimum) / (maximum − minimum)`, with a degenerate range
/// reading as fully complete.
fn progress_ratio(minimum: f64, maximum: f64, value: f64) -> f64 {
    if maximum <= minimum {
        1.0
    } else {
        (value - minimum) / (maximum - minimum)
    }
}

/// Duration of the entering transition in seconds, scaled by how far the
/// arc's end must travel to reach the cycle's wrap point.
fn enter_duration(ratio: f64) -> f64 {
    ENTER_SECS_PER_TURN * (ratio - CYCLE_WRAP_RATIO).abs() + ENTER_SECS_BASE
}

fn settle_ease() -> CubicEase {
    CubicEase::new(0.4, 0.0, 0.2, 1.0)
}

/// The snapshot taken when leaving the cycle: the running span and
/// rotation with their whole turns folded out, plus whether a settle curve
/// is needed.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ExitPlan {
    settle: bool,
    frame: SpanFrame,
    /// Rotation remainder in degrees, reduced to `(-180, 180]`.
    rotation: f64,
}

impl ExitPlan {
    fn new(frame: SpanFrame, rotation: f64) -> ExitPlan {
        let remainder = rotation.rem_euclid(360.0);
        let rotation = if remainder > 180.0 {
            remainder - 360.0
        } else {
            remainder
        };
        // fold the span so its start lands in (-1, 0]; folding shifts the
        // rendered ratios by `turns * blend`, so it is only invisible at
        // full blend
        let turns = if frame.blend < 1.0 {
            0.0
        } else {
            frame.start.ceil()
        };
        let frame = SpanFrame::new(frame.start - turns, frame.end - turns, frame.blend);
        let position = (frame.end + rotation / 360.0).rem_euclid(1.0);
        ExitPlan {
            settle: position < SETTLE_THRESHOLD,
            frame,
            rotation,
        }
    }
}
