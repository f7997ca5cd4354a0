//! The camera controller: motion state machine, navigation constraints, pointer input, picking,
//! viewport sizing, and the fixed-cadence render loop.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_picking_core::events::{Click, Pointer};
use bevy_time::prelude::*;
use bevy_transform::TransformSystem;
use bevy_window::RequestRedraw;

use crate::scene::{self, SceneLoadFailed};

pub mod component;
pub mod constraints;
pub mod driver;
pub mod input;
pub mod motion;
pub mod orbit;
pub mod pick;
pub mod viewport;

/// Adds the [`component::SplatCam`] controller systems to an app.
///
/// Input, picking, and viewport sizing run every frame. Camera ticks and renderer frames run in
/// `FixedUpdate`, which this plugin sets to [`SplatCamPlugin::frame_rate_hz`].
pub struct SplatCamPlugin {
    /// Render loop cadence, in frames per second.
    pub frame_rate_hz: f64,
}

impl Default for SplatCamPlugin {
    fn default() -> Self {
        Self {
            frame_rate_hz: driver::DEFAULT_FRAME_RATE_HZ,
        }
    }
}

/// System sets of the controller, in the order they run within a frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, SystemSet)]
pub enum SplatCamSystems {
    /// Viewport sizing and scene load polling, in `PreUpdate`.
    Observe,
    /// Pointer input and picking, in `Update`.
    Input,
    /// Auto-rotate, controller tick, and renderer frames, in `FixedUpdate`.
    Drive,
    /// Camera state mirrored to transforms, in `PostUpdate`.
    Sync,
}

impl Plugin for SplatCamPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(self.frame_rate_hz))
            .init_resource::<input::PointerDrag>()
            .add_event::<RequestRedraw>()
            .add_event::<Pointer<Click>>()
            .add_event::<SceneLoadFailed>()
            .add_systems(
                PreUpdate,
                (
                    viewport::observe_primary_window,
                    scene::poll_scene_loads,
                )
                    .in_set(SplatCamSystems::Observe),
            )
            .add_systems(
                Update,
                (
                    input::track_pointer_drag,
                    input::orbit_from_input,
                    pick::pick_with_renderer,
                    pick::pick_from_pointer_events,
                )
                    .chain()
                    .in_set(SplatCamSystems::Input),
            )
            .add_systems(
                FixedUpdate,
                driver::drive_render_loop.in_set(SplatCamSystems::Drive),
            )
            .add_systems(
                PostUpdate,
                driver::sync_camera_transform
                    .in_set(SplatCamSystems::Sync)
                    .before(TransformSystem::TransformPropagate),
            )
            .register_type::<component::SplatCam>()
            .register_type::<orbit::OrbitInput>()
            .register_type::<pick::PickFocus>()
            .register_type::<viewport::Viewport>()
            .register_type::<input::PointerDrag>();
    }
}
