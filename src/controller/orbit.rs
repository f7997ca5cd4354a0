//! Turns continuous pointer input into camera motion around the look-target.

use std::f32::consts::{PI, TAU};

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

use super::{
    component::SplatCam,
    constraints::{ClampReport, ConstraintSet, DistanceClamp, Spherical},
};

/// Radians of orbit per pixel of pointer travel, before sensitivity.
const ORBIT_RADIANS_PER_PIXEL: f32 = 0.005;
/// Zoom factor applied per wheel line.
const ZOOM_SCALE_PER_LINE: f32 = 0.95;
/// Keeps the orbit away from the poles, where azimuth is undefined.
const POLE_EPSILON: f32 = 1e-6;

/// Orbit, pan, and zoom a [`SplatCam`] from pointer input, subject to a [`ConstraintSet`].
///
/// Every user-driven change is run through the clamp chain. When a clamp selected by
/// [`OrbitInput::return_trigger`] fires, the adapter also asks the controller for an auto-return
/// transition to [`ConstraintSet::max_distance`] from [`OrbitInput::focus`], looking at the focus.
/// Auto-return is an ordinary transition, so it obeys the same drop policy as any other.
#[derive(Debug, Clone, Reflect, Component)]
pub struct OrbitInput {
    /// What input motions are currently allowed?
    pub enabled_motion: EnabledMotion,
    /// Limits enforced after every user-driven change.
    pub constraints: ConstraintSet,
    /// The scene's main point of interest. Distance limits are measured from here.
    pub focus: Vec3,
    /// Input sensitivity of the camera.
    pub sensitivity: Sensitivity,
    /// Which clamps trigger an auto-return.
    pub return_trigger: ReturnTrigger,
    /// Duration of the auto-return transition, in seconds.
    pub return_duration: f32,
    /// Idle rotation around the look-target.
    pub auto_rotate: AutoRotate,
}

impl Default for OrbitInput {
    fn default() -> Self {
        Self {
            enabled_motion: Default::default(),
            constraints: Default::default(),
            focus: Vec3::ZERO,
            sensitivity: Default::default(),
            return_trigger: Default::default(),
            return_duration: 1.0,
            auto_rotate: Default::default(),
        }
    }
}

/// The result of feeding one input to [`OrbitInput`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputOutcome {
    /// The input was discarded: the motion is disabled, a transition is live, or the input
    /// moved nothing.
    Ignored,
    /// The camera moved. The report lists any clamps that adjusted the result.
    Applied(ClampReport),
    /// The camera moved, a clamp fired, and an auto-return transition was accepted.
    Returning(ClampReport),
}

impl OrbitInput {
    /// Create an adapter with the given limits and default settings otherwise.
    pub fn new(constraints: ConstraintSet) -> Self {
        Self {
            constraints,
            ..Default::default()
        }
    }

    /// Rotate around the look-target by a screen space pointer delta, in pixels.
    pub fn orbit(&self, cam: &mut SplatCam, screen_delta: Vec2) -> InputOutcome {
        if !self.enabled_motion.orbit || cam.is_animating() || screen_delta == Vec2::ZERO {
            return InputOutcome::Ignored;
        }
        let state = cam.state();
        let Some(mut spherical) = Spherical::around(state.position, state.look_target, state.up)
        else {
            return InputOutcome::Ignored;
        };
        let delta = screen_delta * self.sensitivity.orbit * ORBIT_RADIANS_PER_PIXEL;
        spherical.azimuth -= delta.x;
        spherical.polar = (spherical.polar - delta.y)
            .clamp(
                self.constraints.min_polar_angle(),
                self.constraints.max_polar_angle(),
            )
            .clamp(POLE_EPSILON, PI - POLE_EPSILON);
        self.commit(cam, spherical.position(), state.look_target, true)
    }

    /// Translate the camera and its look-target in the plane orthogonal to the up axis.
    ///
    /// `viewport_height` is in the same pixel units as `screen_delta`.
    pub fn pan(
        &self,
        cam: &mut SplatCam,
        screen_delta: Vec2,
        viewport_height: f32,
    ) -> InputOutcome {
        if !self.enabled_motion.pan || cam.is_animating() || screen_delta == Vec2::ZERO {
            return InputOutcome::Ignored;
        }
        let state = cam.state();
        let Some((right, _, _)) = state.basis() else {
            return InputOutcome::Ignored;
        };
        let ahead = state.up.cross(right).normalize_or_zero();
        // World units covered by one pixel at the target's depth.
        let units_per_pixel = 2.0 * state.distance_to_target() * (state.fov * 0.5).tan()
            / viewport_height.max(1.0);
        let offset = (-right * screen_delta.x + ahead * screen_delta.y)
            * units_per_pixel
            * self.sensitivity.pan;
        self.commit(cam, state.position + offset, state.look_target + offset, true)
    }

    /// Dolly toward (positive `lines`) or away from the look-target.
    pub fn zoom(&self, cam: &mut SplatCam, lines: f32) -> InputOutcome {
        if !self.enabled_motion.zoom || cam.is_animating() || lines == 0.0 {
            return InputOutcome::Ignored;
        }
        let state = cam.state();
        let Some(mut spherical) = Spherical::around(state.position, state.look_target, state.up)
        else {
            return InputOutcome::Ignored;
        };
        let scale = ZOOM_SCALE_PER_LINE.powf(lines * self.sensitivity.zoom);
        spherical.radius = (spherical.radius * scale).clamp(
            self.constraints.min_distance(),
            self.constraints.max_distance(),
        );
        self.commit(cam, spherical.position(), state.look_target, true)
    }

    /// Nudge the azimuth by one auto-rotate step, if enabled and no transition is live.
    pub fn auto_rotate(&self, cam: &mut SplatCam) -> InputOutcome {
        if !self.auto_rotate.enabled || cam.is_animating() {
            return InputOutcome::Ignored;
        }
        let state = cam.state();
        let Some(mut spherical) = Spherical::around(state.position, state.look_target, state.up)
        else {
            return InputOutcome::Ignored;
        };
        spherical.azimuth -= self.auto_rotate.step;
        self.commit(cam, spherical.position(), state.look_target, false)
    }

    /// Clamp the new pose, hand it to the controller, and start an auto-return if needed.
    fn commit(
        &self,
        cam: &mut SplatCam,
        position: Vec3,
        look_target: Vec3,
        allow_return: bool,
    ) -> InputOutcome {
        let up = cam.state().up;
        let clamped = self.constraints.apply(position, look_target, self.focus, up);
        if !cam.apply_user_motion(clamped.position, look_target) {
            return InputOutcome::Ignored;
        }
        let report = clamped.report;
        if !allow_return || !self.return_trigger.fires(&report) {
            return InputOutcome::Applied(report);
        }

        let max_distance = self.constraints.max_distance();
        let return_position = if max_distance.is_finite() {
            let direction = (clamped.position - self.focus)
                .try_normalize()
                .unwrap_or(-cam.state().forward());
            self.focus + direction * max_distance
        } else {
            clamped.position
        };
        debug!("Camera left its limits ({report:?}), returning to {return_position}");
        if cam.request_transition(return_position, self.focus, self.return_duration) {
            InputOutcome::Returning(report)
        } else {
            InputOutcome::Applied(report)
        }
    }
}

/// Which clamps start an auto-return transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum ReturnTrigger {
    /// Any clamp in the chain.
    #[default]
    AnyClamp,
    /// Only the distance clamp, and only when the camera went beyond the maximum distance.
    Overflow,
    /// Never auto-return; clamps still apply.
    Never,
}

impl ReturnTrigger {
    /// Does `report` satisfy this trigger?
    pub fn fires(&self, report: &ClampReport) -> bool {
        match self {
            ReturnTrigger::AnyClamp => report.any(),
            ReturnTrigger::Overflow => report.distance == Some(DistanceClamp::TooFar),
            ReturnTrigger::Never => false,
        }
    }
}

/// Continuous rotation around the look-target while nothing else moves the camera.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct AutoRotate {
    /// Is auto-rotation running?
    pub enabled: bool,
    /// Azimuth change per frame, in radians.
    pub step: f32,
}

impl Default for AutoRotate {
    fn default() -> Self {
        Self {
            enabled: false,
            // One revolution every 3600 frames.
            step: TAU / 3600.0,
        }
    }
}

/// The sensitivity of the camera controller to inputs.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct Sensitivity {
    /// X/Y sensitivity of orbit inputs, multiplied.
    pub orbit: Vec2,
    /// Sensitivity of pan inputs, multiplied.
    pub pan: f32,
    /// Sensitivity of zoom inputs, multiplied.
    pub zoom: f32,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self {
            orbit: Vec2::splat(1.0),
            pan: 1.0,
            zoom: 1.0,
        }
    }
}

/// Controls what kinds of user motions are accepted.
#[derive(Debug, Clone, Reflect)]
pub struct EnabledMotion {
    /// Should pan be enabled?
    pub pan: bool,
    /// Should orbit be enabled?
    pub orbit: bool,
    /// Should zoom be enabled?
    pub zoom: bool,
}

impl Default for EnabledMotion {
    fn default() -> Self {
        Self {
            pan: true,
            orbit: true,
            zoom: true,
        }
    }
}
