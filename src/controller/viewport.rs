//! Keeps the renderer's output buffer and the camera projection in step with the surface size.

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_math::URect;
use bevy_reflect::prelude::*;
use bevy_render::camera::Camera;
use bevy_window::{PrimaryWindow, Window};

use super::component::SplatCam;
use crate::renderer::{SplatRenderer, ViewportRenderer};

/// Size of a display surface in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct ViewportSize {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
}

impl ViewportSize {
    /// Create a size from pixel dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Does this surface cover no pixels, as when a window is minimized?
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, or `None` for an empty surface.
    pub fn aspect_ratio(&self) -> Option<f32> {
        (!self.is_empty()).then(|| self.width as f32 / self.height as f32)
    }
}

/// Where a viewport sits in the primary window, and the last surface size applied to its
/// renderer and camera.
#[derive(Debug, Clone, Copy, Default, Reflect, Component)]
pub struct Viewport {
    position: UVec2,
    size: Option<ViewportSize>,
}

impl Viewport {
    /// The last applied size, if any has been observed.
    pub fn size(&self) -> Option<ViewportSize> {
        self.size
    }

    /// Top-left corner of the viewport in the window, in physical pixels.
    pub fn position(&self) -> UVec2 {
        self.position
    }

    /// `pointer`, in window physical pixels, relative to this viewport's top-left corner.
    ///
    /// `None` if the pointer is outside the viewport or no size has been observed yet.
    pub fn local_pointer(&self, pointer: Vec2) -> Option<Vec2> {
        let size = self.size?;
        let local = pointer - self.position.as_vec2();
        let inside = local.x >= 0.0
            && local.y >= 0.0
            && local.x < size.width as f32
            && local.y < size.height as f32;
        inside.then_some(local)
    }

    /// Should input at `pointer` reach the camera owning `viewport`?
    ///
    /// Cameras without a [`Viewport`] take all input. Cameras with one only take input over it.
    pub fn accepts(viewport: Option<&Viewport>, pointer: Option<Vec2>) -> bool {
        match (viewport, pointer) {
            (None, _) => true,
            (Some(viewport), Some(pointer)) => viewport.local_pointer(pointer).is_some(),
            (Some(_), None) => false,
        }
    }

    /// Would observing `size` change anything?
    pub fn is_stale(&self, size: ViewportSize) -> bool {
        !size.is_empty() && self.size != Some(size)
    }

    /// Apply a newly observed surface size.
    ///
    /// Resizes the renderer's output buffer and updates the camera's aspect ratio. Repeated or
    /// empty sizes are no-ops, so callers can observe every frame without reallocating buffers.
    /// Returns `true` if anything changed.
    pub fn observe(
        &mut self,
        size: ViewportSize,
        cam: &mut SplatCam,
        renderer: Option<&mut dyn SplatRenderer>,
    ) -> bool {
        if !self.is_stale(size) {
            return false;
        }
        debug!("Viewport resized to {}x{}", size.width, size.height);
        self.size = Some(size);
        if let Some(renderer) = renderer {
            renderer.resize(size);
        }
        if let Some(aspect_ratio) = size.aspect_ratio() {
            cam.set_aspect_ratio(aspect_ratio);
        }
        true
    }
}

/// Observe each viewport's surface in the primary window.
///
/// A viewport on an entity with a [`Camera`] covers that camera's physical viewport rect, or the
/// whole window when the camera has none yet. Polling each frame covers both window resize events
/// and layout-driven surface changes.
pub fn observe_primary_window(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewports: Query<(
        &mut Viewport,
        &mut SplatCam,
        Option<&Camera>,
        Option<&mut ViewportRenderer>,
    )>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let whole_window = URect::new(
        0,
        0,
        window.resolution.physical_width(),
        window.resolution.physical_height(),
    );
    for (mut viewport, mut cam, camera, mut renderer) in &mut viewports {
        let rect = camera
            .and_then(Camera::physical_viewport_rect)
            .unwrap_or(whole_window);
        if viewport.position != rect.min {
            viewport.position = rect.min;
        }
        let size = ViewportSize::new(rect.width(), rect.height());
        // Checked first so unchanged viewports are not flagged as changed.
        if !viewport.is_stale(size) {
            continue;
        }
        let renderer = renderer.as_deref_mut().map(|renderer| renderer.0.as_mut());
        viewport.observe(size, &mut cam, renderer);
    }
}
