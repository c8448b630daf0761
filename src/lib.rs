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

//! A self-contained circular progress indicator.
//!
//! The crate splits into an animation state machine ([`ProgressSpinner`])
//! and an arc-geometry engine ([`ArcFigure`]); both are toolkit-agnostic.
//! The spinner renders determinate progress as a static arc on a ring and,
//! when its state is [`ProgressState::Indeterminate`], plays a perpetual
//! spin-and-stretch cycle with fluent transitions on and off it.
//!
//! The host is expected to own the clock: feed frame intervals (in
//! nanoseconds, as an `AnimFrame`-style event delivers them) to
//! [`ProgressSpinner::tick`] while [`ProgressSpinner::needs_anim_frame`]
//! is true, and draw the resulting [`SpinnerScene`] with [`draw_scene`] or
//! a custom [`RenderSink`].

pub use piet;
pub use piet::kurbo;

mod animation;
mod arc;
mod easing;
mod render;
mod spinner;

pub mod theme;

pub use animation::{
    Animation, AnimationCurve, AnimationDriver, EaseTarget, Interpolate, Keyframe, Param,
    SpanFrame, MIN_SPEED_RATIO,
};
pub use arc::{radius_for, ArcFigure};
pub use easing::{ease_in_out_quad, ease_in_quad, ease_out_quad, CubicEase};
pub use render::{draw_scene, Pen, RenderSink, SpinnerScene, TrackRing};
pub use spinner::{ProgressSpinner, ProgressState, SpinnerPhase};
