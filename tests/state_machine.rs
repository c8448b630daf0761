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

//! End-to-end tests of the spinner through its public surface: property
//! changes in, frame ticks in, scenes out.

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use float_cmp::approx_eq;
use progress_spinner::{
    ProgressSpinner, ProgressState, RenderSink, SpinnerPhase, SpinnerScene,
};

const SECOND: u64 = 1_000_000_000;
const FRAME: u64 = SECOND / 60;

/// A sink that records every geometry push.
#[derive(Clone, Default)]
struct SceneRecorder {
    pushes: Rc<RefCell<usize>>,
    last_sweep: Rc<RefCell<f64>>,
}

impl RenderSink for SceneRecorder {
    fn update_scene(&mut self, scene: &SpinnerScene) {
        *self.pushes.borrow_mut() += 1;
        *self.last_sweep.borrow_mut() = scene.indicator.sweep_angle;
    }
}

/// Tick frame-by-frame until the spinner goes quiet, with a generous cap
/// so a runaway animation fails the test instead of hanging it.
fn run_until_idle(spinner: &mut ProgressSpinner) {
    for _ in 0..600 {
        if !spinner.needs_anim_frame() {
            return;
        }
        spinner.tick(FRAME);
    }
    panic!("spinner still animating after 10 simulated seconds");
}

#[test]
fn determinate_lifecycle() {
    let mut spinner = ProgressSpinner::new().with_progress_state(ProgressState::Normal);
    spinner.set_value(50.0);
    assert!(spinner.needs_anim_frame());

    run_until_idle(&mut spinner);
    assert!(approx_eq!(f64, spinner.displayed_value(), 50.0));
    // half the range is half a turn
    assert!(approx_eq!(
        f64,
        spinner.scene().indicator.sweep_angle,
        PI,
        epsilon = 1e-9
    ));
}

#[test]
fn full_indeterminate_round_trip() {
    let mut spinner = ProgressSpinner::new().with_progress_state(ProgressState::Normal);
    spinner.set_value(25.0);
    run_until_idle(&mut spinner);

    spinner.set_progress_state(ProgressState::Indeterminate);
    assert_eq!(spinner.phase(), SpinnerPhase::Entering);

    // through the entering transition and well into the cycle
    spinner.tick(2 * SECOND);
    assert_eq!(spinner.phase(), SpinnerPhase::Cycling);
    spinner.tick(5 * SECOND);
    assert_eq!(spinner.phase(), SpinnerPhase::Cycling);

    spinner.set_progress_state(ProgressState::Normal);
    assert!(matches!(
        spinner.phase(),
        SpinnerPhase::Exiting | SpinnerPhase::Settling
    ));

    run_until_idle(&mut spinner);
    assert_eq!(spinner.phase(), SpinnerPhase::Determinate);
    // back to the static quarter-turn arc, facing straight up
    assert!(approx_eq!(
        f64,
        spinner.scene().indicator.sweep_angle,
        PI / 2.0,
        epsilon = 1e-9
    ));
    assert!(approx_eq!(
        f64,
        spinner.scene().indicator.start_angle,
        0.0,
        epsilon = 1e-9
    ));
}

#[test]
fn entering_starts_from_the_static_arc() {
    let mut spinner = ProgressSpinner::new().with_progress_state(ProgressState::Normal);
    spinner.set_value(40.0);
    run_until_idle(&mut spinner);
    let before = spinner.scene().indicator.sweep_angle;

    // at the first instant of the transition nothing has moved yet
    spinner.set_progress_state(ProgressState::Indeterminate);
    assert!(approx_eq!(
        f64,
        spinner.scene().indicator.sweep_angle,
        before,
        epsilon = 1e-9
    ));
}

#[test]
fn exit_hand_off_mid_enter_is_continuous() {
    let mut spinner = ProgressSpinner::new().with_progress_state(ProgressState::Normal);
    spinner.set_value(40.0);
    run_until_idle(&mut spinner);

    spinner.set_progress_state(ProgressState::Indeterminate);
    // halfway through the 1.2375s enter the blend is mid-ramp
    spinner.tick(62 * SECOND / 100);
    let before = spinner.scene().indicator.clone();

    // flipping back must pick up the arc exactly where it is
    spinner.set_progress_state(ProgressState::Normal);
    let after = spinner.scene().indicator.clone();
    assert!(approx_eq!(
        f64,
        after.start_angle,
        before.start_angle,
        epsilon = 1e-9
    ));
    assert!(approx_eq!(
        f64,
        after.sweep_angle,
        before.sweep_angle,
        epsilon = 1e-9
    ));
}

#[test]
fn chained_phases_keep_the_timeline_exact() {
    let mut spinner = ProgressSpinner::new().with_progress_state(ProgressState::Indeterminate);

    // the enter lasts 1.4875s and the back half of the cycle 1.5s; the
    // overshoot of each completing tick carries into the next phase, so
    // after 3.7375s total the looping cycle sits exactly a quarter in
    spinner.tick(3 * SECOND / 2);
    spinner.tick(3 * SECOND / 2);
    spinner.tick(737_500_000);
    assert_eq!(spinner.phase(), SpinnerPhase::Cycling);

    // quarter-cycle frame: span (0.1, 1.0) at full blend
    assert!(approx_eq!(
        f64,
        spinner.scene().indicator.sweep_angle,
        1.8 * PI,
        epsilon = 1e-9
    ));
}

#[test]
fn interrupted_enter_exits_cleanly() {
    let mut spinner = ProgressSpinner::new();
    spinner.set_progress_state(ProgressState::Indeterminate);
    spinner.tick(SECOND / 2);
    assert_eq!(spinner.phase(), SpinnerPhase::Entering);

    spinner.set_progress_state(ProgressState::None);
    assert_eq!(spinner.phase(), SpinnerPhase::Exiting);

    run_until_idle(&mut spinner);
    assert_eq!(spinner.phase(), SpinnerPhase::Determinate);
    // value 0: the indicator collapses to nothing
    assert!(approx_eq!(
        f64,
        spinner.scene().indicator.sweep_angle,
        0.0,
        epsilon = 1e-9
    ));
}

#[test]
fn speed_ratio_scales_the_whole_machine() {
    let mut spinner = ProgressSpinner::new();
    spinner.set_animation_speed_ratio(2.0);
    spinner.set_progress_state(ProgressState::Indeterminate);

    // one real second is two animation seconds: past the 1.4875s enter
    spinner.tick(SECOND);
    assert_eq!(spinner.phase(), SpinnerPhase::Cycling);
}

#[test]
fn hidden_spinner_goes_quiet_and_resumes() {
    let mut spinner = ProgressSpinner::new();
    let recorder = SceneRecorder::default();
    let pushes = recorder.pushes.clone();
    spinner.set_render_sink(Box::new(recorder));

    spinner.set_progress_state(ProgressState::Indeterminate);
    spinner.tick(SECOND);

    spinner.set_visible(false);
    let frozen = *pushes.borrow();
    spinner.tick(SECOND);
    spinner.tick(SECOND);
    // no pushes while hidden
    assert_eq!(*pushes.borrow(), frozen);
    assert!(!spinner.needs_anim_frame());

    spinner.set_visible(true);
    assert_eq!(spinner.phase(), SpinnerPhase::Entering);
    assert!(*pushes.borrow() > frozen);
}

#[test]
fn every_tick_pushes_one_scene() {
    let mut spinner = ProgressSpinner::new();
    let recorder = SceneRecorder::default();
    let pushes = recorder.pushes.clone();
    spinner.set_render_sink(Box::new(recorder));

    spinner.set_progress_state(ProgressState::Indeterminate);
    let before = *pushes.borrow();
    for _ in 0..60 {
        spinner.tick(FRAME);
    }
    assert_eq!(*pushes.borrow(), before + 60);
}

#[test]
fn completion_interrupts_the_cycle() {
    let mut spinner = ProgressSpinner::new().with_progress_state(ProgressState::Indeterminate);
    spinner.tick(5 * SECOND);
    assert_eq!(spinner.phase(), SpinnerPhase::Cycling);

    // the host reports determinate completion; the cycle winds down to a
    // full static ring
    spinner.set_value(100.0);
    spinner.set_progress_state(ProgressState::Normal);
    run_until_idle(&mut spinner);

    assert_eq!(spinner.phase(), SpinnerPhase::Determinate);
    assert!(approx_eq!(f64, spinner.displayed_value(), 100.0));
    assert!(approx_eq!(
        f64,
        spinner.scene().indicator.sweep_angle,
        2.0 * PI,
        epsilon = 1e-9
    ));
}
