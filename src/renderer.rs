//! The contract this crate requires of the splat renderer that draws each viewport.
//!
//! The renderer is opaque: it sorts and submits splats however it likes. The controller only
//! tells it when the output surface changes size, drives its per-frame `update` and `render`,
//! and asks it to intersect rays with the visible scene when resolving picks.

use bevy_derive::{Deref, DerefMut};
use bevy_ecs::prelude::*;
use bevy_math::prelude::*;

use crate::controller::{component::CameraState, viewport::ViewportSize};

/// The nearest visible surface hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    /// World space position of the hit.
    pub point: Vec3,
    /// The scene object that was hit.
    pub object: Entity,
}

/// Ray queries against the visible scene.
pub trait SceneRaycast {
    /// Find the nearest surface along `ray`, if any.
    fn intersect(&self, ray: Ray3d) -> Option<SceneHit>;
}

/// A renderer drawing one viewport.
pub trait SplatRenderer: SceneRaycast + Send + Sync + 'static {
    /// Reallocate the output buffer for a new surface size, in device pixels.
    fn resize(&mut self, size: ViewportSize);
    /// Per-frame bookkeeping, such as re-sorting splats for the new camera pose.
    fn update(&mut self, camera: &CameraState);
    /// Draw the frame.
    fn render(&mut self, camera: &CameraState);
}

/// Attaches a [`SplatRenderer`] to a viewport entity.
#[derive(Component, Deref, DerefMut)]
pub struct ViewportRenderer(pub Box<dyn SplatRenderer>);

impl ViewportRenderer {
    /// Box `renderer` for use as a component.
    pub fn new(renderer: impl SplatRenderer) -> Self {
        Self(Box::new(renderer))
    }
}
