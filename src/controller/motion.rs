//! Interpolated camera transitions, and the two-state machine that owns them.

use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

/// Progress added by one tick of a transition lasting exactly one second. A transition lasting
/// `d` seconds advances by `DEFAULT_FRAME_STEP / d` per tick.
pub const DEFAULT_FRAME_STEP: f64 = 0.02;

/// Duration used for programmatic moves when the caller does not provide one.
pub const DEFAULT_TRANSITION_SECS: f32 = 1.5;

// Accumulated progress this close to the end is treated as the end.
const PROGRESS_SNAP: f64 = 1e-9;

/// Linearly interpolate between `from` and `to`.
///
/// Unlike [`Vec3::lerp`], both endpoints are exact: `t == 0.0` returns `from` and `t == 1.0`
/// returns `to`, with no rounding residue from `from + (to - from) * t`.
pub fn lerp(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from * (1.0 - t) + to * t
}

/// A time-bounded change of camera position and look-target between two fixed poses.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Transition {
    /// Camera position when the transition was accepted.
    pub from_position: Vec3,
    /// Look-target when the transition was accepted.
    pub from_target: Vec3,
    /// Camera position once progress reaches `1.0`.
    pub to_position: Vec3,
    /// Look-target once progress reaches `1.0`.
    pub to_target: Vec3,
    /// Nominal length of the transition in seconds, at the configured tick cadence.
    pub duration_secs: f32,
    progress: f64,
}

impl Transition {
    /// Create a transition with zero progress.
    pub fn new(
        from_position: Vec3,
        from_target: Vec3,
        to_position: Vec3,
        to_target: Vec3,
        duration_secs: f32,
    ) -> Self {
        Self {
            from_position,
            from_target,
            to_position,
            to_target,
            duration_secs,
            progress: 0.0,
        }
    }

    /// Normalized progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress as f32
    }

    /// Has this transition reached its destination?
    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }

    /// Advance by one tick of size `frame_step`, returning `true` once the end is reached.
    ///
    /// Non-positive or non-finite durations complete on the first tick.
    pub fn advance(&mut self, frame_step: f64) -> bool {
        let duration = self.duration_secs as f64;
        let next = if duration.is_finite() && duration > 0.0 {
            self.progress + frame_step / duration
        } else {
            1.0
        };
        self.progress = if next >= 1.0 - PROGRESS_SNAP {
            1.0
        } else {
            next.max(0.0)
        };
        self.is_finished()
    }

    /// Camera position at the current progress.
    pub fn position(&self) -> Vec3 {
        lerp(self.from_position, self.to_position, self.progress())
    }

    /// Look-target at the current progress.
    pub fn target(&self) -> Vec3 {
        lerp(self.from_target, self.to_target, self.progress())
    }
}

/// The motion state of a [`SplatCam`](super::component::SplatCam).
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub enum CameraMotion {
    /// No transition is live. User input and new transition requests are accepted.
    #[default]
    Idle,
    /// A transition is in flight. It can only end by reaching full progress.
    Animating(Transition),
}

impl CameraMotion {
    /// Is a transition currently in flight?
    pub fn is_animating(&self) -> bool {
        matches!(self, Self::Animating(_))
    }

    /// The live transition, if any.
    pub fn transition(&self) -> Option<&Transition> {
        match self {
            Self::Idle => None,
            Self::Animating(transition) => Some(transition),
        }
    }
}
