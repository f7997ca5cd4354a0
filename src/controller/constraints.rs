//! Provides [`ConstraintSet`] settings and the pure clamp functions that enforce them.
//!
//! Clamps are applied in a fixed order: distance from the focus point, then polar angle around
//! the look-target, then the bounding volume. Each works in its own coordinate frame, and every
//! clamp is idempotent, so the chain is safe to reapply every frame.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use thiserror::Error;

// Relative overshoot below which a distance correction is not reported as a clamp.
const DISTANCE_TOLERANCE: f32 = 1e-5;
// Upper bound on ulp nudges when settling a clamped distance.
const MAX_NUDGES: usize = 16;
// Absolute slack, in radians, before a polar limit counts as exceeded.
const ANGLE_TOLERANCE: f32 = 1e-5;

/// Reasons a [`ConstraintSet`] or [`BoundingVolume`] is rejected at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConstraintError {
    /// A distance limit is negative or NaN, or the minimum is infinite.
    #[error("distance limits must be non-negative numbers, got [{min}, {max}]")]
    InvalidDistance {
        /// The rejected minimum distance.
        min: f32,
        /// The rejected maximum distance.
        max: f32,
    },
    /// The minimum distance is larger than the maximum.
    #[error("minimum distance {min} exceeds maximum distance {max}")]
    InvertedDistance {
        /// The rejected minimum distance.
        min: f32,
        /// The rejected maximum distance.
        max: f32,
    },
    /// A polar limit lies outside `[0, π]`.
    #[error("polar angle limits must lie within [0, π], got [{min}, {max}]")]
    PolarOutOfRange {
        /// The rejected minimum polar angle.
        min: f32,
        /// The rejected maximum polar angle.
        max: f32,
    },
    /// The minimum polar angle is larger than the maximum.
    #[error("minimum polar angle {min} exceeds maximum polar angle {max}")]
    InvertedPolar {
        /// The rejected minimum polar angle.
        min: f32,
        /// The rejected maximum polar angle.
        max: f32,
    },
    /// The volume's minimum corner is above its maximum corner on some axis.
    #[error("bounding volume minimum {min} exceeds maximum {max} on at least one axis")]
    InvertedVolume {
        /// The rejected minimum corner.
        min: Vec3,
        /// The rejected maximum corner.
        max: Vec3,
    },
}

/// An axis-aligned box the camera position must stay inside.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct BoundingVolume {
    min: Vec3,
    max: Vec3,
}

impl BoundingVolume {
    /// Create a volume, failing if `min` is above `max` on any axis or either corner is NaN.
    pub fn new(min: Vec3, max: Vec3) -> Result<Self, ConstraintError> {
        if min.is_nan() || max.is_nan() || min.cmpgt(max).any() {
            return Err(ConstraintError::InvertedVolume { min, max });
        }
        Ok(Self { min, max })
    }

    /// A cube centered on the origin with the given half extent.
    pub fn cube(half_extent: f32) -> Result<Self, ConstraintError> {
        Self::new(Vec3::splat(-half_extent), Vec3::splat(half_extent))
    }

    /// The minimum corner.
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// The maximum corner.
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Is `point` inside or on the boundary?
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Navigation limits for one scene. Validated on construction and immutable afterwards.
///
/// Polar angles are measured from the camera's up axis, around the look-target: `0` looks
/// straight down the up axis from above, `π/2` is level with the target.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ConstraintSet {
    min_distance: f32,
    max_distance: f32,
    min_polar_angle: f32,
    max_polar_angle: f32,
    bounding_volume: Option<BoundingVolume>,
}

impl Default for ConstraintSet {
    fn default() -> Self {
        Self {
            min_distance: 1.0,
            max_distance: 5.0,
            min_polar_angle: FRAC_PI_4,
            max_polar_angle: FRAC_PI_2 - 0.1,
            bounding_volume: None,
        }
    }
}

impl ConstraintSet {
    /// Create a constraint set without a bounding volume.
    ///
    /// `max_distance` may be infinite. Fails fast on limits that would make clamps oscillate.
    pub fn new(
        min_distance: f32,
        max_distance: f32,
        min_polar_angle: f32,
        max_polar_angle: f32,
    ) -> Result<Self, ConstraintError> {
        let (min, max) = (min_distance, max_distance);
        if !min.is_finite() || min < 0.0 || max.is_nan() || max < 0.0 {
            return Err(ConstraintError::InvalidDistance { min, max });
        }
        if min > max {
            return Err(ConstraintError::InvertedDistance { min, max });
        }
        let (min, max) = (min_polar_angle, max_polar_angle);
        if !(0.0..=PI).contains(&min) || !(0.0..=PI).contains(&max) {
            return Err(ConstraintError::PolarOutOfRange { min, max });
        }
        if min > max {
            return Err(ConstraintError::InvertedPolar { min, max });
        }
        Ok(Self {
            min_distance,
            max_distance,
            min_polar_angle,
            max_polar_angle,
            bounding_volume: None,
        })
    }

    /// No distance or angle limits at all.
    pub fn unconstrained() -> Self {
        Self {
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            bounding_volume: None,
        }
    }

    /// Also keep the camera inside `volume`.
    pub fn with_bounding_volume(self, volume: BoundingVolume) -> Self {
        Self {
            bounding_volume: Some(volume),
            ..self
        }
    }

    /// Smallest allowed distance from the focus point.
    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    /// Largest allowed distance from the focus point.
    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Smallest allowed polar angle, in radians.
    pub fn min_polar_angle(&self) -> f32 {
        self.min_polar_angle
    }

    /// Largest allowed polar angle, in radians.
    pub fn max_polar_angle(&self) -> f32 {
        self.max_polar_angle
    }

    /// The bounding volume, if one is configured.
    pub fn bounding_volume(&self) -> Option<BoundingVolume> {
        self.bounding_volume
    }

    /// Run the full clamp chain: distance, then polar angle, then bounding volume.
    pub fn apply(&self, position: Vec3, look_target: Vec3, focus: Vec3, up: Vec3) -> Clamped {
        let (position, distance) = distance_clamp(position, focus, self);
        let (position, polar) = polar_clamp(position, look_target, up, self);
        let (position, bounds) = match self.bounding_volume {
            Some(volume) => {
                let clamped = clamp_to_bounding_volume(position, &volume);
                (clamped, clamped != position)
            }
            None => (position, false),
        };
        Clamped {
            position,
            report: ClampReport {
                distance,
                polar,
                bounds,
            },
        }
    }
}

/// Which side of the distance range a position was clamped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum DistanceClamp {
    /// The position was closer than `min_distance`.
    TooClose,
    /// The position was farther than `max_distance`.
    TooFar,
}

/// Which clamps fired during [`ConstraintSet::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct ClampReport {
    /// The distance clamp, if it fired.
    pub distance: Option<DistanceClamp>,
    /// Did the polar angle clamp fire?
    pub polar: bool,
    /// Did the bounding volume clamp fire?
    pub bounds: bool,
}

impl ClampReport {
    /// Did any clamp fire?
    pub fn any(&self) -> bool {
        self.distance.is_some() || self.polar || self.bounds
    }
}

/// The output of the clamp chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped {
    /// The compliant position.
    pub position: Vec3,
    /// Which clamps changed the position. Rounding-level distance corrections are not reported.
    pub report: ClampReport,
}

/// Keep `position` between the minimum and maximum distance from `focus`, along the same ray.
pub fn clamp_distance(position: Vec3, focus: Vec3, set: &ConstraintSet) -> Vec3 {
    distance_clamp(position, focus, set).0
}

fn distance_clamp(
    position: Vec3,
    focus: Vec3,
    set: &ConstraintSet,
) -> (Vec3, Option<DistanceClamp>) {
    let offset = position - focus;
    let distance = offset.length();
    let (limit, side) = if distance > set.max_distance {
        (set.max_distance, DistanceClamp::TooFar)
    } else if distance < set.min_distance {
        (set.min_distance, DistanceClamp::TooClose)
    } else {
        return (position, None);
    };
    // A camera sitting exactly on the focus has no ray; push it out along +Z.
    let direction = offset.try_normalize().unwrap_or(Vec3::Z);
    let clamped = settle_on_ray(focus, direction, limit, set);
    // Rounding-level overshoot, as left by reprojecting a position that sat on a limit, is
    // corrected but not reported.
    let reported = ((distance - limit).abs() > limit * DISTANCE_TOLERANCE).then_some(side);
    (clamped, reported)
}

/// `focus + direction * limit`, nudged one ulp at a time until rounding leaves it inside the
/// distance range, so the result is a fixed point of the clamp.
fn settle_on_ray(focus: Vec3, direction: Vec3, limit: f32, set: &ConstraintSet) -> Vec3 {
    let mut scale = limit;
    for _ in 0..MAX_NUDGES {
        let position = focus + direction * scale;
        let distance = position.distance(focus);
        if distance > set.max_distance && scale > 0.0 {
            scale = f32::from_bits(scale.to_bits() - 1);
        } else if distance < set.min_distance && scale.is_finite() {
            scale = f32::from_bits(scale.to_bits() + 1);
        } else {
            return position;
        }
    }
    focus + direction * scale
}

/// Keep the camera's polar angle around `look_target`, measured from `up`, inside the limits.
///
/// The azimuth and the distance to the target are preserved.
pub fn clamp_polar_angle(position: Vec3, look_target: Vec3, up: Vec3, set: &ConstraintSet) -> Vec3 {
    polar_clamp(position, look_target, up, set).0
}

fn polar_clamp(position: Vec3, look_target: Vec3, up: Vec3, set: &ConstraintSet) -> (Vec3, bool) {
    let Some(mut spherical) = Spherical::around(position, look_target, up) else {
        return (position, false);
    };
    let clamped = spherical.polar.clamp(set.min_polar_angle, set.max_polar_angle);
    if (clamped - spherical.polar).abs() <= ANGLE_TOLERANCE {
        return (position, false);
    }
    spherical.polar = clamped;
    (spherical.position(), true)
}

/// Clamp each axis of `position` to the volume.
pub fn clamp_to_bounding_volume(position: Vec3, volume: &BoundingVolume) -> Vec3 {
    position.clamp(volume.min, volume.max)
}

/// Spherical coordinates of a camera around a center, in a frame where `up` maps to +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Spherical {
    pub radius: f32,
    /// Angle from the up axis.
    pub polar: f32,
    /// Angle around the up axis.
    pub azimuth: f32,
    center: Vec3,
    to_local: Quat,
}

impl Spherical {
    /// `None` if the camera sits on the center or `up` is degenerate.
    pub fn around(position: Vec3, center: Vec3, up: Vec3) -> Option<Self> {
        let up = up.try_normalize()?;
        let offset = position - center;
        let radius = offset.length();
        if !radius.is_finite() || radius <= f32::EPSILON {
            return None;
        }
        let to_local = Quat::from_rotation_arc(up, Vec3::Y);
        let local = to_local * offset;
        Some(Self {
            radius,
            polar: (local.y / radius).clamp(-1.0, 1.0).acos(),
            azimuth: local.x.atan2(local.z),
            center,
            to_local,
        })
    }

    /// Reproject to a world space position.
    pub fn position(&self) -> Vec3 {
        let ring = self.polar.sin() * self.radius;
        let local = Vec3::new(
            ring * self.azimuth.sin(),
            self.radius * self.polar.cos(),
            ring * self.azimuth.cos(),
        );
        self.center + self.to_local.inverse() * local
    }
}
