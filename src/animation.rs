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

//! The animation driver: time-based interpolations over the spinner's
//! continuous parameters.
//!
//! The driver owns at most one running [`Animation`] per parameter. It is
//! entirely tick-driven: the host feeds it frame intervals (nanoseconds, the
//! same currency as an `AnimFrame` event) and reads back instantaneous
//! values. Nothing here blocks and nothing spawns; all mutation happens on
//! the caller's thread.

use tracing::warn;

use crate::easing::{ease_in_out_quad, ease_in_quad, ease_out_quad, CubicEase};

/// The floor applied to the animation speed ratio.
///
/// A ratio of zero would stall every animation forever, so values at or
/// below this are coerced up to it.
pub const MIN_SPEED_RATIO: f64 = 0.1;

/// A value that can be interpolated by an [`Animation`].
pub trait Interpolate: Copy {
    /// The value a fraction `t` of the way from `self` to `other`.
    fn interpolate(self, other: Self, t: f64) -> Self;

    /// Keyframe interpolation where one component follows an eased clock
    /// and the rest follow the linear one.
    ///
    /// Scalars have a single component, so the default implementation
    /// simply prefers the eased clock unless the target opts out.
    fn interpolate_keyed(self, other: Self, linear: f64, eased: f64, target: EaseTarget) -> Self {
        match target {
            EaseTarget::None => self.interpolate(other, linear),
            _ => self.interpolate(other, eased),
        }
    }
}

impl Interpolate for f64 {
    fn interpolate(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

/// The composited indicator parameters: an arc span in ratio-space plus the
/// blend between the animated span and the static progress ratio.
///
/// With `blend == 1.0` the drawn arc is exactly `(start, end)`; with
/// `blend == 0.0` the span is ignored and the arc is `(0, progress ratio)`.
/// Transitions ramp `blend` to cross-fade between the two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanFrame {
    /// Start of the span, in multiples of a full turn (0 = 12 o'clock).
    pub start: f64,
    /// End of the span. May trail `start` mid-transition; rendering always
    /// treats the smaller of the two as the arc's start.
    pub end: f64,
    /// Mix between the animated span (1.0) and the static ratio (0.0).
    pub blend: f64,
}

impl SpanFrame {
    pub const fn new(start: f64, end: f64, blend: f64) -> SpanFrame {
        SpanFrame { start, end, blend }
    }
}

impl Interpolate for SpanFrame {
    fn interpolate(self, other: Self, t: f64) -> Self {
        SpanFrame {
            start: self.start.interpolate(other.start, t),
            end: self.end.interpolate(other.end, t),
            blend: self.blend.interpolate(other.blend, t),
        }
    }

    fn interpolate_keyed(self, other: Self, linear: f64, eased: f64, target: EaseTarget) -> Self {
        let (t_start, t_end) = match target {
            EaseTarget::Start => (eased, linear),
            EaseTarget::End => (linear, eased),
            EaseTarget::Both => (eased, eased),
            EaseTarget::None => (linear, linear),
        };
        SpanFrame {
            start: self.start.interpolate(other.start, t_start),
            end: self.end.interpolate(other.end, t_end),
            blend: self.blend.interpolate(other.blend, linear),
        }
    }
}

/// Which span component a keyframe eases; the rest interpolate linearly.
///
/// This is what gives the spin cycle its signature look: the arc's end
/// races ahead with an eased stretch while the start advances linearly,
/// then the roles swap and the start catches up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EaseTarget {
    Start,
    End,
    Both,
    None,
}

/// The easing applied along a straight-line interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationCurve {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Bezier(CubicEase),
}

impl AnimationCurve {
    /// Map normalized time to normalized progress.
    pub fn translate(self, t: f64) -> f64 {
        match self {
            AnimationCurve::Linear => t.clamp(0.0, 1.0),
            AnimationCurve::EaseIn => ease_in_quad(t),
            AnimationCurve::EaseOut => ease_out_quad(t),
            AnimationCurve::EaseInOut => ease_in_out_quad(t),
            AnimationCurve::Bezier(ease) => ease.eval(t),
        }
    }
}

impl Default for AnimationCurve {
    fn default() -> Self {
        AnimationCurve::Linear
    }
}

/// One stop on a keyframed route.
#[derive(Debug, Clone, Copy)]
pub struct Keyframe<T> {
    /// Position of this keyframe as a fraction of the animation's duration.
    pub at: f64,
    pub value: T,
    /// Easing applied while interpolating *toward* this keyframe.
    pub ease: EaseTarget,
}

impl<T> Keyframe<T> {
    pub const fn new(at: f64, value: T, ease: EaseTarget) -> Keyframe<T> {
        Keyframe { at, value, ease }
    }
}

#[derive(Debug, Clone)]
enum Route<T> {
    Line {
        /// `None` requests a hand-off: the driver fills this with the
        /// parameter's instantaneous value when the animation starts.
        from: Option<T>,
        to: T,
        curve: AnimationCurve,
    },
    Keyframes(Vec<Keyframe<T>>),
}

/// A single time-based interpolation of one parameter.
#[derive(Debug, Clone)]
pub struct Animation<T> {
    route: Route<T>,
    /// Duration in seconds, before speed-ratio scaling.
    duration: f64,
    /// Accumulated (already speed-scaled) seconds.
    elapsed: f64,
    looping: bool,
}

impl<T: Interpolate> Animation<T> {
    /// A straight line to `to`, starting from the parameter's instantaneous
    /// value at the moment the animation is started (snapshot hand-off).
    pub fn line(to: T) -> Animation<T> {
        Animation {
            route: Route::Line {
                from: None,
                to,
                curve: AnimationCurve::Linear,
            },
            duration: 0.0,
            elapsed: 0.0,
            looping: false,
        }
    }

    /// A straight line with an explicit start value, overriding the
    /// hand-off snapshot.
    pub fn line_from(from: T, to: T) -> Animation<T> {
        let mut anim = Animation::line(to);
        if let Route::Line { from: f, .. } = &mut anim.route {
            *f = Some(from);
        }
        anim
    }

    /// A keyframed route. Frames must be ordered by `at`, with the first
    /// frame at 0.0.
    pub fn keyframes(frames: Vec<Keyframe<T>>) -> Animation<T> {
        debug_assert!(!frames.is_empty());
        debug_assert!(frames.windows(2).all(|w| w[0].at <= w[1].at));
        Animation {
            route: Route::Keyframes(frames),
            duration: 0.0,
            elapsed: 0.0,
            looping: false,
        }
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration = secs.max(0.0);
        self
    }

    pub fn with_curve(mut self, curve: AnimationCurve) -> Self {
        if let Route::Line { curve: c, .. } = &mut self.route {
            *c = curve;
        }
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Start the animation already `secs` seconds in.
    ///
    /// Used when chaining animations across a completion: carrying the
    /// completing tick's overshoot into the next animation keeps the
    /// combined timeline exact at any frame rate. Apply after
    /// `with_duration` and `looping` so a looping route wraps the carried
    /// time.
    pub fn advanced_by(mut self, secs: f64) -> Self {
        self.elapsed = secs.max(0.0);
        if self.looping && self.duration > 0.0 && self.elapsed >= self.duration {
            self.elapsed %= self.duration;
        }
        self
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Fill in a hand-off start value; called by the driver on start.
    fn resolve_from(&mut self, current: T) {
        if let Route::Line { from: from @ None, .. } = &mut self.route {
            *from = Some(current);
        }
    }

    fn fraction(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// The instantaneous value.
    pub fn value(&self) -> T {
        self.sample(self.fraction())
    }

    fn end_value(&self) -> T {
        self.sample(1.0)
    }

    fn sample(&self, t: f64) -> T {
        match &self.route {
            Route::Line { from, to, curve } => {
                // hand-off values are resolved before the animation starts
                let from = from.unwrap_or(*to);
                from.interpolate(*to, curve.translate(t))
            }
            Route::Keyframes(frames) => {
                let first = frames.first().expect("keyframe route is non-empty");
                if t <= first.at {
                    return first.value;
                }
                for pair in frames.windows(2) {
                    let (prev, next) = (&pair[0], &pair[1]);
                    if t <= next.at {
                        let width = next.at - prev.at;
                        if width <= 0.0 {
                            return next.value;
                        }
                        let linear = (t - prev.at) / width;
                        let eased = ease_in_out_quad(linear);
                        return prev
                            .value
                            .interpolate_keyed(next.value, linear, eased, next.ease);
                    }
                }
                frames.last().expect("keyframe route is non-empty").value
            }
        }
    }

    /// Advance by `dt` (speed-scaled seconds). Returns true on the tick
    /// that reaches the natural end of a non-looping animation.
    fn advance(&mut self, dt: f64) -> bool {
        self.elapsed += dt;
        if self.looping {
            if self.duration > 0.0 && self.elapsed >= self.duration {
                self.elapsed %= self.duration;
            }
            false
        } else {
            self.elapsed >= self.duration
        }
    }
}

/// The continuous parameters the driver can animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// The indicator's [`SpanFrame`].
    Span,
    /// The rotation offset, in degrees.
    Rotation,
    /// The displayed (smoothed) value.
    Value,
}

/// One parameter's channel: its resting value plus an optional running
/// animation.
#[derive(Debug, Clone)]
struct Channel<T> {
    animation: Option<Animation<T>>,
    rest: T,
    /// Seconds the most recent tick ran past a completing animation's end;
    /// zero whenever the last tick did not complete one.
    overshoot: f64,
}

impl<T: Interpolate> Channel<T> {
    fn new(rest: T) -> Channel<T> {
        Channel {
            animation: None,
            rest,
            overshoot: 0.0,
        }
    }

    fn current(&self) -> T {
        self.animation.as_ref().map(Animation::value).unwrap_or(self.rest)
    }

    /// Replace any running animation with `anim`, snapshotting the current
    /// value into its hand-off slot. The replaced animation is dropped
    /// without completing.
    fn start(&mut self, mut anim: Animation<T>) {
        anim.resolve_from(self.current());
        self.animation = Some(anim);
    }

    /// Cancel, freezing the parameter at its instantaneous value. Never
    /// reports a completion.
    fn stop(&mut self) {
        self.rest = self.current();
        self.animation = None;
        self.overshoot = 0.0;
    }

    /// Cancel and pin the parameter to `value`.
    fn jump(&mut self, value: T) {
        self.rest = value;
        self.animation = None;
        self.overshoot = 0.0;
    }

    /// Returns true if the animation reached its natural end this tick.
    fn tick(&mut self, dt: f64) -> bool {
        if let Some(anim) = &mut self.animation {
            if anim.advance(dt) {
                self.overshoot = (anim.elapsed - anim.duration).max(0.0);
                self.rest = anim.end_value();
                self.animation = None;
                return true;
            }
        }
        self.overshoot = 0.0;
        false
    }

    fn is_animating(&self) -> bool {
        self.animation.is_some()
    }
}

/// Owns the running interpolations for one spinner instance.
///
/// There is no global timeline: every driver is advanced explicitly by its
/// owner's tick and nothing is shared between instances.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    span: Channel<SpanFrame>,
    rotation: Channel<f64>,
    value: Channel<f64>,
    speed_ratio: f64,
}

impl AnimationDriver {
    pub fn new(frame: SpanFrame, value: f64) -> AnimationDriver {
        AnimationDriver {
            span: Channel::new(frame),
            rotation: Channel::new(0.0),
            value: Channel::new(value),
            speed_ratio: 1.0,
        }
    }

    /// Set the speed ratio, coerced to at least [`MIN_SPEED_RATIO`].
    ///
    /// Elapsed time is accumulated pre-scaled, so a change rescales the
    /// remaining time of every running animation proportionally without
    /// restarting any of them.
    pub fn set_speed_ratio(&mut self, ratio: f64) {
        if !(ratio >= MIN_SPEED_RATIO) {
            warn!(
                "animation speed ratio {} below minimum, coercing to {}",
                ratio, MIN_SPEED_RATIO
            );
        }
        self.speed_ratio = ratio.max(MIN_SPEED_RATIO);
    }

    pub fn speed_ratio(&self) -> f64 {
        self.speed_ratio
    }

    pub fn start_span(&mut self, anim: Animation<SpanFrame>) {
        self.span.start(anim);
    }

    pub fn start_rotation(&mut self, anim: Animation<f64>) {
        self.rotation.start(anim);
    }

    pub fn start_value(&mut self, anim: Animation<f64>) {
        self.value.start(anim);
    }

    pub fn jump_span(&mut self, frame: SpanFrame) {
        self.span.jump(frame);
    }

    pub fn jump_rotation(&mut self, degrees: f64) {
        self.rotation.jump(degrees);
    }

    pub fn jump_value(&mut self, value: f64) {
        self.value.jump(value);
    }

    /// Cancel everything immediately. No completions are reported for
    /// cancelled animations; each parameter freezes at its instantaneous
    /// value.
    pub fn stop_all(&mut self) {
        self.span.stop();
        self.rotation.stop();
        self.value.stop();
    }

    pub fn current_span(&self) -> SpanFrame {
        self.span.current()
    }

    pub fn current_rotation(&self) -> f64 {
        self.rotation.current()
    }

    pub fn current_value(&self) -> f64 {
        self.value.current()
    }

    /// Seconds by which the most recent tick overran the end of the
    /// parameter's completing animation, for carrying into a chained
    /// [`Animation::advanced_by`]. Zero unless that tick completed one.
    pub fn overshoot(&self, param: Param) -> f64 {
        match param {
            Param::Span => self.span.overshoot,
            Param::Rotation => self.rotation.overshoot,
            Param::Value => self.value.overshoot,
        }
    }

    /// Advance all running animations by a frame interval (nanoseconds),
    /// scaled by the speed ratio. Returns the parameters whose animations
    /// reached their natural end during this tick, each reported exactly
    /// once.
    pub fn tick(&mut self, interval: u64) -> Vec<Param> {
        let dt = (interval as f64) * 1e-9 * self.speed_ratio;
        let mut completed = Vec::new();
        if self.span.tick(dt) {
            completed.push(Param::Span);
        }
        if self.rotation.tick(dt) {
            completed.push(Param::Rotation);
        }
        if self.value.tick(dt) {
            completed.push(Param::Value);
        }
        completed
    }

    pub fn is_animating(&self) -> bool {
        self.span.is_animating() || self.rotation.is_animating() || self.value.is_animating()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    const SECOND: u64 = 1_000_000_000;

    fn driver() -> AnimationDriver {
        AnimationDriver::new(SpanFrame::new(0.0, 0.0, 0.0), 0.0)
    }

    #[test]
    fn line_interpolates_and_completes_once() {
        let mut driver = driver();
        driver.start_value(Animation::line_from(0.0, 10.0).with_duration(1.0));

        assert!(driver.tick(SECOND / 2).is_empty());
        assert!(approx_eq!(f64, driver.current_value(), 5.0));

        assert_eq!(driver.tick(SECOND / 2), vec![Param::Value]);
        assert!(approx_eq!(f64, driver.current_value(), 10.0));

        // nothing left to complete: the end value is simply retained
        assert!(driver.tick(SECOND).is_empty());
        assert!(approx_eq!(f64, driver.current_value(), 10.0));
        assert!(!driver.is_animating());
    }

    #[test]
    fn handoff_snapshots_current_value() {
        let mut driver = driver();
        driver.start_value(Animation::line_from(0.0, 1.0).with_duration(1.0));
        driver.tick(SECOND / 2);
        let before = driver.current_value();

        // replace mid-flight; the new animation must pick up exactly where
        // the old one was
        driver.start_value(Animation::line(0.0).with_duration(1.0));
        assert!(approx_eq!(f64, driver.current_value(), before));

        // one frame later the value has only moved by a frame's worth
        driver.tick(SECOND / 60);
        assert!((driver.current_value() - before).abs() < 0.02);
    }

    #[test]
    fn cancelled_animation_never_completes() {
        let mut driver = driver();
        driver.start_value(Animation::line_from(0.0, 1.0).with_duration(1.0));
        driver.tick(SECOND / 2);

        driver.stop_all();
        assert!(!driver.is_animating());
        // even a long tick reports nothing for the cancelled animation
        assert!(driver.tick(10 * SECOND).is_empty());
        // and the value froze where it was cancelled
        assert!(approx_eq!(f64, driver.current_value(), 0.5));
    }

    #[test]
    fn explicit_from_overrides_handoff() {
        let mut driver = driver();
        driver.jump_value(7.0);
        driver.start_value(Animation::line_from(2.0, 4.0).with_duration(1.0));
        // the explicit start wins over the snapshot
        assert!(approx_eq!(f64, driver.current_value(), 2.0));
    }

    #[test]
    fn speed_ratio_rescales_remaining_time() {
        let mut driver = driver();
        driver.start_value(Animation::line_from(0.0, 1.0).with_duration(1.0));
        driver.tick(SECOND / 4);
        assert!(approx_eq!(f64, driver.current_value(), 0.25));

        // doubling the speed halves the remaining time without restarting
        driver.set_speed_ratio(2.0);
        driver.tick(SECOND / 4);
        assert!(approx_eq!(f64, driver.current_value(), 0.75));
        assert_eq!(driver.tick(SECOND / 8), vec![Param::Value]);
    }

    #[test]
    fn speed_ratio_is_floored() {
        let mut driver = driver();
        driver.set_speed_ratio(0.0);
        assert!(approx_eq!(f64, driver.speed_ratio(), MIN_SPEED_RATIO));
        driver.set_speed_ratio(-5.0);
        assert!(approx_eq!(f64, driver.speed_ratio(), MIN_SPEED_RATIO));
        driver.set_speed_ratio(f64::NAN);
        assert!(approx_eq!(f64, driver.speed_ratio(), MIN_SPEED_RATIO));
    }

    #[test]
    fn looping_animation_wraps_and_never_completes() {
        let mut driver = driver();
        driver.start_rotation(
            Animation::line_from(0.0, 360.0)
                .with_duration(3.0)
                .looping(true),
        );

        assert!(driver.tick(SECOND).is_empty());
        assert!(approx_eq!(f64, driver.current_rotation(), 120.0));

        // 3.5s more: wraps past the seam into the next cycle
        assert!(driver.tick(3 * SECOND + SECOND / 2).is_empty());
        assert!(approx_eq!(f64, driver.current_rotation(), 180.0, epsilon = 1e-9));
        assert!(driver.is_animating());
    }

    #[test]
    fn keyframes_ease_only_the_targeted_component() {
        let frames = vec![
            Keyframe::new(0.0, SpanFrame::new(0.0, 0.0, 1.0), EaseTarget::None),
            Keyframe::new(1.0, SpanFrame::new(1.0, 1.0, 1.0), EaseTarget::End),
        ];
        let anim = Animation::keyframes(frames).with_duration(1.0);

        let quarter = anim.sample(0.25);
        // start is linear, end follows the symmetric quadratic ease
        assert!(approx_eq!(f64, quarter.start, 0.25));
        assert!(approx_eq!(f64, quarter.end, ease_in_out_quad(0.25)));
        assert!(approx_eq!(f64, quarter.blend, 1.0));
    }

    #[test]
    fn keyframes_hold_first_and_last_values() {
        let frames = vec![
            Keyframe::new(0.0, SpanFrame::new(0.0, 0.1, 1.0), EaseTarget::None),
            Keyframe::new(0.5, SpanFrame::new(0.1, 1.0, 1.0), EaseTarget::End),
        ];
        let anim = Animation::keyframes(frames).with_duration(1.0);
        assert_eq!(anim.sample(0.0), SpanFrame::new(0.0, 0.1, 1.0));
        // past the last keyframe the value holds
        assert_eq!(anim.sample(0.9), SpanFrame::new(0.1, 1.0, 1.0));
    }

    #[test]
    fn overshoot_carries_into_a_chained_animation() {
        let mut driver = driver();
        driver.start_value(Animation::line_from(0.0, 1.0).with_duration(1.0));

        // 1.25s tick: completes with a quarter second to spare
        assert_eq!(driver.tick(SECOND + SECOND / 4), vec![Param::Value]);
        assert!(approx_eq!(f64, driver.overshoot(Param::Value), 0.25));

        driver.start_value(
            Animation::line_from(0.0, 1.0)
                .with_duration(1.0)
                .advanced_by(driver.overshoot(Param::Value)),
        );
        assert!(approx_eq!(f64, driver.current_value(), 0.25));

        // a tick without a completion clears the overshoot
        driver.tick(SECOND / 4);
        assert!(approx_eq!(f64, driver.overshoot(Param::Value), 0.0));
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut driver = driver();
        driver.start_rotation(Animation::line_from(90.0, 0.0).with_duration(0.0));
        assert!(approx_eq!(f64, driver.current_rotation(), 0.0));
        assert_eq!(driver.tick(1), vec![Param::Rotation]);
    }
}
