//! Feeds mouse input into the [`OrbitInput`] viewport under the pointer.

use bevy_ecs::prelude::*;
use bevy_input::{
    mouse::{MouseMotion, MouseScrollUnit, MouseWheel},
    prelude::*,
};
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_window::{PrimaryWindow, Window};

use super::{component::SplatCam, orbit::OrbitInput, viewport::Viewport};

/// Pointer travel, in pixels, above which a press-release counts as a drag instead of a click.
pub const CLICK_SLOP: f32 = 4.0;
/// Pixel-precision scroll deltas are divided by this to get wheel lines.
const PIXELS_PER_LINE: f32 = 100.0;

/// Tracks how far the primary pointer moved while the left button was held.
#[derive(Debug, Default, Clone, Reflect, Resource)]
pub struct PointerDrag {
    travel: f32,
    pressed: bool,
}

impl PointerDrag {
    /// Did the last left-button press travel less than [`CLICK_SLOP`]?
    pub fn is_click(&self) -> bool {
        self.travel < CLICK_SLOP
    }

    /// Total travel of the current or last press, in pixels.
    pub fn travel(&self) -> f32 {
        self.travel
    }
}

/// Accumulate pointer travel for click detection.
pub fn track_pointer_drag(
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut drag: ResMut<PointerDrag>,
) {
    let moved: f32 = motion.read().map(|event| event.delta.length()).sum();
    if mouse.just_pressed(MouseButton::Left) {
        drag.pressed = true;
        drag.travel = 0.0;
    } else if drag.pressed {
        drag.travel += moved;
    }
    if mouse.just_released(MouseButton::Left) {
        drag.pressed = false;
    }
}

/// Left drag orbits, right drag pans, the wheel zooms.
///
/// A drag moves the viewport it started over, even if the pointer leaves it. The wheel zooms the
/// viewport under the pointer.
pub fn orbit_from_input(
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut grabbed: Local<Option<Entity>>,
    mut cameras: Query<(Entity, &mut SplatCam, &OrbitInput, Option<&Viewport>)>,
) {
    let pointer = windows
        .get_single()
        .ok()
        .and_then(Window::physical_cursor_position);
    if mouse.any_just_pressed([MouseButton::Left, MouseButton::Right]) {
        *grabbed = cameras
            .iter()
            .find(|(.., viewport)| Viewport::accepts(*viewport, pointer))
            .map(|(entity, ..)| entity);
    }

    let screen_delta: Vec2 = motion.read().map(|event| event.delta).sum();
    let lines: f32 = wheel
        .read()
        .map(|event| match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / PIXELS_PER_LINE,
        })
        .sum();

    let orbiting = mouse.pressed(MouseButton::Left) && screen_delta != Vec2::ZERO;
    let panning = mouse.pressed(MouseButton::Right) && screen_delta != Vec2::ZERO;
    if !orbiting && !panning && lines == 0.0 {
        return;
    }

    for (entity, mut cam, orbit, viewport) in &mut cameras {
        if *grabbed == Some(entity) {
            if orbiting {
                orbit.orbit(&mut cam, screen_delta);
            } else if panning {
                let height = viewport
                    .and_then(Viewport::size)
                    .map_or(1.0, |size| size.height as f32);
                orbit.pan(&mut cam, screen_delta, height);
            }
        }
        if lines != 0.0 && Viewport::accepts(viewport, pointer) {
            orbit.zoom(&mut cam, lines);
        }
    }
}
