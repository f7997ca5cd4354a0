//! Resolves pointer clicks into world space targets, and moves the camera toward them.

use bevy_ecs::prelude::*;
use bevy_input::prelude::*;
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_picking_core::{
    events::{Click, Pointer},
    pointer::PointerButton,
};
use bevy_reflect::prelude::*;
use bevy_window::{PrimaryWindow, Window};

use super::{
    component::{CameraState, SplatCam},
    input::PointerDrag,
    viewport::{Viewport, ViewportSize},
};
use crate::renderer::{SceneRaycast, ViewportRenderer};

/// A resolved click: where it landed and what it hit.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct PickResult {
    /// World space position of the hit.
    pub hit_point: Vec3,
    /// The object under the pointer.
    pub hit_object: Entity,
}

/// Convert a pointer position in pixels, origin top-left, to normalized device coordinates.
///
/// Returns `None` for an empty viewport.
pub fn pointer_to_ndc(pointer: Vec2, viewport: ViewportSize) -> Option<Vec2> {
    if viewport.is_empty() {
        return None;
    }
    let size = Vec2::new(viewport.width as f32, viewport.height as f32);
    Some(Vec2::new(
        pointer.x / size.x * 2.0 - 1.0,
        -(pointer.y / size.y) * 2.0 + 1.0,
    ))
}

/// The world space ray from the camera through a pointer position.
pub fn pointer_ray(pointer: Vec2, viewport: ViewportSize, camera: &CameraState) -> Option<Ray3d> {
    let ndc = pointer_to_ndc(pointer, viewport)?;
    let (right, up, forward) = camera.basis()?;
    let half_height = (camera.fov * 0.5).tan();
    let half_width = half_height * camera.aspect_ratio;
    let direction = forward + right * ndc.x * half_width + up * ndc.y * half_height;
    Some(Ray3d {
        origin: camera.position,
        direction: Dir3::new(direction).ok()?,
    })
}

/// Cast a ray from the camera through the pointer and return the nearest scene hit.
///
/// Intersection itself is delegated to `scene`. A miss is not an error.
pub fn resolve_pick<S: SceneRaycast + ?Sized>(
    pointer: Vec2,
    viewport: ViewportSize,
    camera: &CameraState,
    scene: &S,
) -> Option<PickResult> {
    let ray = pointer_ray(pointer, viewport, camera)?;
    let hit = scene.intersect(ray)?;
    Some(PickResult {
        hit_point: hit.point,
        hit_object: hit.object,
    })
}

/// Settings for moving the camera toward picked points.
#[derive(Debug, Clone, Reflect, Component)]
pub struct PickFocus {
    /// Should clicks move the camera?
    pub enabled: bool,
    /// World space offset from the hit point to the camera's destination, so the camera ends
    /// up near the picked surface rather than inside it.
    pub stand_off: Vec3,
    /// Duration of the focus transition, in seconds.
    pub duration: f32,
    /// The most recent pick the camera accepted a transition toward. Managed by the controller.
    pub last_pick: Option<PickResult>,
}

impl Default for PickFocus {
    fn default() -> Self {
        Self {
            enabled: true,
            stand_off: Vec3::new(0.0, 2.0, 5.0),
            duration: super::motion::DEFAULT_TRANSITION_SECS,
            last_pick: None,
        }
    }
}

impl PickFocus {
    /// Camera position and look-target for focusing on `pick`.
    pub fn destination(&self, pick: &PickResult) -> (Vec3, Vec3) {
        (pick.hit_point + self.stand_off, pick.hit_point)
    }

    /// Request a transition toward `pick`. Returns `true` if the controller accepted it.
    pub fn focus(&mut self, cam: &mut SplatCam, pick: PickResult) -> bool {
        if !self.enabled {
            return false;
        }
        let (position, target) = self.destination(&pick);
        let accepted = cam.request_transition(position, target, self.duration);
        if accepted {
            self.last_pick = Some(pick);
        }
        accepted
    }
}

/// Pick with the renderer of the viewport under the pointer when the primary button clicks
/// without dragging.
pub fn pick_with_renderer(
    mouse: Res<ButtonInput<MouseButton>>,
    drag: Res<PointerDrag>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewports: Query<(&mut SplatCam, &mut PickFocus, &Viewport, &ViewportRenderer)>,
) {
    if !mouse.just_released(MouseButton::Left) || !drag.is_click() {
        return;
    }
    let Some(pointer) = windows
        .get_single()
        .ok()
        .and_then(Window::physical_cursor_position)
    else {
        return;
    };
    for (mut cam, mut focus, viewport, renderer) in &mut viewports {
        let (Some(size), Some(local)) = (viewport.size(), viewport.local_pointer(pointer)) else {
            continue;
        };
        match resolve_pick(local, size, &cam.state(), renderer.0.as_ref()) {
            Some(pick) => {
                debug!("Picked {:?} at {}", pick.hit_object, pick.hit_point);
                focus.focus(&mut cam, pick);
            }
            None => trace!("Pick at {pointer} missed"),
        }
    }
}

/// Focus on hits reported by a `bevy_picking_core` backend.
///
/// The hit's camera selects which viewport moves. Hits without a position are ignored.
pub fn pick_from_pointer_events(
    mut clicks: EventReader<Pointer<Click>>,
    mut viewports: Query<(&mut SplatCam, &mut PickFocus)>,
) {
    for click in clicks.read() {
        if click.event.button != PointerButton::Primary {
            continue;
        }
        let hit = &click.event.hit;
        let Some(hit_point) = hit.position else {
            continue;
        };
        let Ok((mut cam, mut focus)) = viewports.get_mut(hit.camera) else {
            continue;
        };
        focus.focus(
            &mut cam,
            PickResult {
                hit_point,
                hit_object: click.target,
            },
        );
    }
}
