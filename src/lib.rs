//! Camera choreography for viewers of streamed splat scenes.
//!
//! A [`SplatCam`](controller::component::SplatCam) owns each viewport's camera. It animates
//! transitions between poses, one at a time, and is the only writer of the camera state. Around
//! it, this crate provides:
//!
//! - orbit, pan, and zoom from pointer input, held inside a
//!   [`ConstraintSet`](controller::constraints::ConstraintSet), with an automatic return when
//!   the camera wanders out of bounds,
//! - click-to-focus, resolving pointer clicks into scene hits and flying toward them,
//! - viewport sizing that keeps the renderer's buffer and the camera's aspect ratio in step,
//! - a fixed-cadence render loop driving an opaque [`SplatRenderer`](renderer::SplatRenderer).
//!
//! Add [`DefaultSplatCamPlugins`], then add a [`SplatCam`](controller::component::SplatCam) to
//! any camera entity.

use bevy_app::{PluginGroup, PluginGroupBuilder};

pub mod controller;
pub mod extensions;
pub mod renderer;
pub mod scene;

/// Common imports.
pub mod prelude {
    pub use crate::{
        controller::{
            component::{CameraState, SplatCam},
            constraints::{BoundingVolume, ConstraintError, ConstraintSet},
            motion::{CameraMotion, Transition},
            orbit::{AutoRotate, OrbitInput, ReturnTrigger},
            pick::{PickFocus, PickResult},
            viewport::{Viewport, ViewportSize},
            SplatCamPlugin, SplatCamSystems,
        },
        renderer::{SceneHit, SceneRaycast, SplatRenderer, ViewportRenderer},
        scene::{SceneLoad, SceneLoadError, SceneStreamer, StreamOptions},
        DefaultSplatCamPlugins,
    };
}

/// Adds the camera controller and all enabled extensions.
pub struct DefaultSplatCamPlugins;

impl PluginGroup for DefaultSplatCamPlugins {
    #[allow(clippy::let_and_return)]
    fn build(self) -> PluginGroupBuilder {
        let group = PluginGroupBuilder::start::<Self>()
            .add(controller::SplatCamPlugin::default())
            .add(extensions::preset_views::PresetViewsPlugin);

        #[cfg(feature = "extension_focus_indicator")]
        let group = group.add(extensions::focus_indicator::FocusIndicatorPlugin);

        group
    }
}
