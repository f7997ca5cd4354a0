//! Advances every viewport at a fixed cadence: auto-rotate, tick, then update and render.

use bevy_ecs::prelude::*;
use bevy_render::prelude::*;
use bevy_transform::prelude::*;
use bevy_window::RequestRedraw;

use super::{component::SplatCam, orbit::OrbitInput};
use crate::{
    renderer::{SplatRenderer, ViewportRenderer},
    scene::SceneLoad,
};

/// Default cadence of the render loop, in frames per second.
pub const DEFAULT_FRAME_RATE_HZ: f64 = 30.0;

/// Run one frame for a single viewport, in order: auto-rotate, controller tick, renderer
/// update, renderer render. Returns `true` if the camera pose changed.
pub fn drive_frame(
    cam: &mut SplatCam,
    orbit: Option<&OrbitInput>,
    renderer: Option<&mut dyn SplatRenderer>,
) -> bool {
    let rotated = orbit.is_some_and(|orbit| {
        matches!(
            orbit.auto_rotate(cam),
            super::orbit::InputOutcome::Applied(_)
        )
    });
    let ticked = cam.tick();
    if let Some(renderer) = renderer {
        let state = cam.state();
        renderer.update(&state);
        renderer.render(&state);
    }
    rotated || ticked
}

/// Drive every viewport whose scene is ready. Runs in `FixedUpdate`.
pub fn drive_render_loop(
    mut viewports: Query<(
        &mut SplatCam,
        Option<&OrbitInput>,
        Option<&mut ViewportRenderer>,
        Option<&SceneLoad>,
    )>,
    mut redraw: EventWriter<RequestRedraw>,
) {
    for (mut cam, orbit, mut renderer, scene) in &mut viewports {
        if !scene.map_or(true, SceneLoad::is_ready) {
            continue;
        }
        let renderer = renderer.as_deref_mut().map(|renderer| renderer.0.as_mut());
        if drive_frame(cam.bypass_change_detection(), orbit, renderer) {
            cam.set_changed();
            redraw.send(RequestRedraw);
        }
    }
}

/// Mirror each controller's camera state onto its [`Transform`] and perspective [`Projection`].
pub fn sync_camera_transform(
    mut cameras: Query<(&SplatCam, &mut Transform, Option<&mut Projection>), Changed<SplatCam>>,
) {
    for (cam, mut transform, projection) in &mut cameras {
        let state = cam.state();
        *transform = state.transform();
        if let Some(mut projection) = projection {
            if let Projection::Perspective(ref mut perspective) = *projection {
                perspective.fov = state.fov;
                perspective.aspect_ratio = state.aspect_ratio;
                perspective.near = state.near;
                perspective.far = state.far;
            }
        }
    }
}
