//! The primary [`Component`] of the controller, [`SplatCam`].

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_transform::prelude::*;

use super::motion::{CameraMotion, Transition, DEFAULT_FRAME_STEP, DEFAULT_TRANSITION_SECS};

/// A point-in-time snapshot of a camera: its pose and its perspective projection.
///
/// The snapshot returned by [`SplatCam::state`] is valid until the next tick. Field of view is
/// vertical, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct CameraState {
    /// Camera position in world space.
    pub position: Vec3,
    /// The point the camera looks at, and orbits around.
    pub look_target: Vec3,
    /// World up direction. Fixed for the lifetime of a session.
    pub up: Vec3,
    /// Vertical field of view, in radians.
    pub fov: f32,
    /// Width over height of the viewport.
    pub aspect_ratio: f32,
    /// Near clipping plane distance.
    pub near: f32,
    /// Far clipping plane distance.
    pub far: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vec3::new(-1.0, -4.0, 6.0),
            look_target: Vec3::ZERO,
            // Splat captures are usually stored with a downward Y axis.
            up: Vec3::NEG_Y,
            fov: 50f32.to_radians(),
            aspect_ratio: 800.0 / 600.0,
            near: 0.01,
            far: 500.0,
        }
    }
}

impl CameraState {
    /// Unit vector from the camera toward its look-target, or zero if they coincide.
    pub fn forward(&self) -> Vec3 {
        (self.look_target - self.position).normalize_or_zero()
    }

    /// Orthonormal `(right, up, forward)` screen axes in world space, or `None` if the camera
    /// sits on its look-target.
    ///
    /// When looking straight along the up vector, `right` is an arbitrary vector orthogonal to
    /// it, the same choice [`Transform::looking_at`] makes.
    pub fn basis(&self) -> Option<(Vec3, Vec3, Vec3)> {
        let forward = self.forward().try_normalize()?;
        let up = self.up.try_normalize()?;
        let right = forward
            .cross(up)
            .try_normalize()
            .unwrap_or_else(|| up.any_orthonormal_vector());
        Some((right, right.cross(forward), forward))
    }

    /// Distance between the camera and its look-target.
    pub fn distance_to_target(&self) -> f32 {
        self.position.distance(self.look_target)
    }

    /// Right-handed view matrix (world to view).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_target, self.up)
    }

    /// Right-handed perspective projection matrix for the current aspect ratio.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// The camera pose as a [`Transform`], looking at the target with the session's up vector.
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).looking_at(self.look_target, self.up)
    }
}

/// Owns the authoritative camera state of one viewport and animates transitions between poses.
///
/// The controller is a two-state machine. While [`CameraMotion::Idle`], transition requests and
/// user motion are accepted. While [`CameraMotion::Animating`], the live transition is the only
/// writer: new requests are dropped (not queued, not merged), user motion is ignored, and the
/// transition ends only by reaching full progress.
///
/// # Moving the Camera
///
/// 1. Request a move with [`SplatCam::request_transition`] or [`SplatCam::move_to`].
/// 2. Call [`SplatCam::tick`] once per frame. The
///    [`SplatCamPlugin`](crate::controller::SplatCamPlugin) does this in `FixedUpdate`.
/// 3. Read the result with [`SplatCam::state`].
#[derive(Debug, Clone, Reflect, Component)]
pub struct SplatCam {
    state: CameraState,
    motion: CameraMotion,
    /// Progress added per tick for a one second transition. See [`DEFAULT_FRAME_STEP`].
    pub frame_step: f64,
    /// Duration used by [`SplatCam::move_to`].
    pub transition_duration: f32,
}

impl Default for SplatCam {
    fn default() -> Self {
        Self::new(CameraState::default())
    }
}

impl SplatCam {
    /// Create an idle controller starting from `state`.
    pub fn new(state: CameraState) -> Self {
        Self {
            state,
            motion: CameraMotion::Idle,
            frame_step: DEFAULT_FRAME_STEP,
            transition_duration: DEFAULT_TRANSITION_SECS,
        }
    }

    /// Read-only snapshot of the camera. Safe to call in any state.
    pub fn state(&self) -> CameraState {
        self.state
    }

    /// The current look-target. Orbit input reads this value, not a copy of it.
    pub fn look_target(&self) -> Vec3 {
        self.state.look_target
    }

    /// The current motion state.
    pub fn motion(&self) -> &CameraMotion {
        &self.motion
    }

    /// Is a transition in flight?
    pub fn is_animating(&self) -> bool {
        self.motion.is_animating()
    }

    /// The in-flight transition, if any.
    pub fn transition(&self) -> Option<&Transition> {
        self.motion.transition()
    }

    /// Start a transition to the given pose, lasting `duration_secs`.
    ///
    /// Returns `false` without touching the in-flight transition if one is live.
    pub fn request_transition(
        &mut self,
        to_position: Vec3,
        to_target: Vec3,
        duration_secs: f32,
    ) -> bool {
        if self.motion.is_animating() {
            debug!("Dropped camera transition to {to_position}: a transition is in flight");
            return false;
        }
        self.motion = CameraMotion::Animating(Transition::new(
            self.state.position,
            self.state.look_target,
            to_position,
            to_target,
            duration_secs,
        ));
        true
    }

    /// [`SplatCam::request_transition`] using [`SplatCam::transition_duration`].
    pub fn move_to(&mut self, to_position: Vec3, to_target: Vec3) -> bool {
        self.request_transition(to_position, to_target, self.transition_duration)
    }

    /// Advance the live transition by one tick of [`SplatCam::frame_step`].
    ///
    /// Returns `true` if the camera pose changed. Does nothing while idle.
    pub fn tick(&mut self) -> bool {
        self.advance(self.frame_step)
    }

    /// Advance the live transition by an explicit per-tick step.
    pub fn advance(&mut self, frame_step: f64) -> bool {
        let CameraMotion::Animating(ref mut transition) = self.motion else {
            return false;
        };
        let finished = transition.advance(frame_step);
        self.state.position = transition.position();
        self.state.look_target = transition.target();
        if finished {
            self.motion = CameraMotion::Idle;
        }
        true
    }

    /// Apply a user-driven pose change. Rejected while a transition is live.
    pub fn apply_user_motion(&mut self, position: Vec3, look_target: Vec3) -> bool {
        if self.motion.is_animating() {
            return false;
        }
        self.state.position = position;
        self.state.look_target = look_target;
        true
    }

    /// Update the projection's aspect ratio. Non-finite or non-positive ratios are ignored.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.state.aspect_ratio = aspect_ratio;
        } else {
            warn!("Ignoring invalid aspect ratio {aspect_ratio}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cam_at(position: Vec3) -> SplatCam {
        SplatCam::new(CameraState {
            position,
            look_target: Vec3::ZERO,
            ..Default::default()
        })
    }

    #[test]
    fn basis_survives_looking_along_up() {
        // Looking at the target from straight below, with the default downward up axis.
        let state = CameraState {
            position: Vec3::new(0.0, -5.0, 0.0),
            ..Default::default()
        };
        let (right, up, forward) = state.basis().unwrap();
        assert_eq!(forward, Vec3::Y);
        assert!(right.is_normalized() && up.is_normalized());
        assert!(right.dot(forward).abs() < 1e-6 && up.dot(forward).abs() < 1e-6);
        assert!(right.dot(up).abs() < 1e-6);

        let transform = state.transform();
        assert!((*transform.right() - right).length() < 1e-5);
        assert!((*transform.up() - up).length() < 1e-5);
    }

    #[test]
    fn transition_reaches_destination_after_75_ticks() {
        let mut cam = cam_at(Vec3::ZERO);
        assert!(cam.request_transition(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, 1.5));
        for _ in 0..75 {
            cam.tick();
        }
        assert!(!cam.is_animating());
        assert_eq!(cam.state().position, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn transition_is_halfway_after_37_ticks() {
        let mut cam = cam_at(Vec3::ZERO);
        cam.request_transition(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, 1.5);
        for _ in 0..37 {
            cam.tick();
        }
        let progress = cam.transition().map(Transition::progress).unwrap();
        assert!((progress - 0.4933).abs() < 1e-3, "{progress}");
        assert!((cam.state().position.x - 4.933).abs() < 1e-2);
        assert_eq!(cam.state().position.y, 0.0);
    }

    #[test]
    fn requests_while_animating_are_dropped() {
        let mut cam = cam_at(Vec3::ZERO);
        cam.request_transition(Vec3::X, Vec3::Y, 1.0);
        cam.tick();
        let before = *cam.transition().unwrap();

        assert!(!cam.request_transition(Vec3::splat(99.0), Vec3::splat(-99.0), 0.1));
        let after = cam.transition().unwrap();
        assert_eq!(after.to_position, before.to_position);
        assert_eq!(after.to_target, before.to_target);
        assert_eq!(after.progress(), before.progress());
    }

    #[test]
    fn accepts_a_new_request_once_idle_again() {
        let mut cam = cam_at(Vec3::ZERO);
        cam.request_transition(Vec3::X, Vec3::ZERO, 0.0);
        cam.tick();
        assert!(cam.move_to(Vec3::Y, Vec3::ZERO));
        assert_eq!(cam.transition().unwrap().from_position, Vec3::X);
    }

    #[test]
    fn tick_while_idle_is_a_no_op() {
        let mut cam = cam_at(Vec3::ONE);
        assert!(!cam.tick());
        assert_eq!(cam.state().position, Vec3::ONE);
    }

    #[test]
    fn user_motion_is_ignored_while_animating() {
        let mut cam = cam_at(Vec3::ZERO);
        cam.request_transition(Vec3::X, Vec3::ZERO, 1.0);
        assert!(!cam.apply_user_motion(Vec3::splat(3.0), Vec3::ONE));
        assert_eq!(cam.state().position, Vec3::ZERO);
    }

    #[test]
    fn invalid_aspect_ratio_is_ignored() {
        let mut cam = SplatCam::default();
        let before = cam.state().aspect_ratio;
        cam.set_aspect_ratio(f32::NAN);
        cam.set_aspect_ratio(0.0);
        assert_eq!(cam.state().aspect_ratio, before);
        cam.set_aspect_ratio(2.0);
        assert_eq!(cam.state().aspect_ratio, 2.0);
    }
}
