//! A `splat_orbit_cam` extension that draws a marker in the scene at the last picked point. This
//! makes it obvious to users what the camera is flying toward after a click.

use bevy_app::prelude::*;
use bevy_color::Color;
use bevy_ecs::prelude::*;
use bevy_gizmos::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

use crate::prelude::*;

/// See the [module](self) docs.
pub struct FocusIndicatorPlugin;

impl Plugin for FocusIndicatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, draw_focus.after(SplatCamSystems::Sync))
            .register_type::<FocusIndicator>();
    }
}

/// Optional. Configures whether or not a [`SplatCam`] should mark its picked point. The indicator
/// will be enabled if this component is not present.
#[derive(Debug, Component, Reflect)]
pub struct FocusIndicator {
    /// Should the indicator be visible on this camera?
    pub enabled: bool,
    /// Keep drawing after the camera arrives, instead of only while it is moving.
    pub persistent: bool,
}

impl Default for FocusIndicator {
    fn default() -> Self {
        Self {
            enabled: true,
            persistent: false,
        }
    }
}

/// Use gizmos to draw a cross at the picked point.
pub fn draw_focus(
    cameras: Query<(&SplatCam, &PickFocus, Option<&FocusIndicator>)>,
    mut gizmos: Gizmos,
) {
    for (cam, focus, indicator) in &cameras {
        let (enabled, persistent) = indicator.map_or((true, false), |i| (i.enabled, i.persistent));
        if !enabled || !(persistent || cam.is_animating()) {
            continue;
        }
        let Some(pick) = focus.last_pick else {
            continue;
        };
        let state = cam.state();
        // Constant apparent size regardless of distance.
        let scale = state.position.distance(pick.hit_point) * state.fov * 0.01;
        let color = Color::srgb(1.0, 0.0, 0.0);
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            gizmos.line(
                pick.hit_point - axis * scale,
                pick.hit_point + axis * scale,
                color,
            );
        }
    }
}
