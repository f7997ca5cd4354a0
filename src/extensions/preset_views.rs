//! A `splat_orbit_cam` extension that moves a camera to named, predefined views, such as
//! "Front View" or "Top View" buttons in a viewer's UI.

use bevy_app::prelude::*;
use bevy_derive::{Deref, DerefMut};
use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_window::RequestRedraw;

use crate::prelude::*;

/// See the [module](self) docs.
pub struct PresetViewsPlugin;

impl Plugin for PresetViewsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PresetViewTrigger>()
            .add_systems(
                Update,
                PresetViewTrigger::receive.after(SplatCamSystems::Input),
            )
            .register_type::<PresetViews>();
    }
}

/// Send this event to move a camera to one of its [`PresetViews`].
///
/// The move is an ordinary transition: it is dropped if the camera is already animating.
#[derive(Debug, Event)]
pub struct PresetViewTrigger {
    /// The camera to move.
    pub camera: Entity,
    /// Index into the camera's [`PresetViews`].
    pub view: usize,
}

impl PresetViewTrigger {
    fn receive(
        mut events: EventReader<Self>,
        mut cameras: Query<(&mut SplatCam, &PresetViews)>,
        mut redraw: EventWriter<RequestRedraw>,
    ) {
        for event in events.read() {
            let Ok((mut cam, views)) = cameras.get_mut(event.camera) else {
                continue;
            };
            let Some(view) = views.get(event.view) else {
                warn!(
                    "Camera {:?} has no preset view {} ({} defined)",
                    event.camera,
                    event.view,
                    views.len()
                );
                continue;
            };
            let (position, target) = view.destination();
            let duration = view.duration.unwrap_or(cam.transition_duration);
            if cam.request_transition(position, target, duration) {
                debug!("Moving to preset view \"{}\"", view.label);
                redraw.send(RequestRedraw);
            }
        }
    }
}

/// A named camera pose.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct PresetView {
    /// Name shown to users.
    pub label: String,
    /// Camera position of the view.
    pub position: Vec3,
    /// Look-target of the view.
    pub target: Vec3,
    /// If set, the camera stops this far from `target`, along the direction of `position`.
    pub approach_distance: Option<f32>,
    /// Transition duration override, in seconds.
    pub duration: Option<f32>,
}

impl PresetView {
    /// A view at `position` looking at `target`.
    pub fn new(label: impl Into<String>, position: Vec3, target: Vec3) -> Self {
        Self {
            label: label.into(),
            position,
            target,
            approach_distance: None,
            duration: None,
        }
    }

    /// Stop `distance` away from the target instead of at `position`.
    pub fn with_approach_distance(self, distance: f32) -> Self {
        Self {
            approach_distance: Some(distance),
            ..self
        }
    }

    /// Camera position and look-target the transition should end at.
    pub fn destination(&self) -> (Vec3, Vec3) {
        let position = self
            .approach_distance
            .zip((self.position - self.target).try_normalize())
            .map_or(self.position, |(distance, direction)| {
                self.target + direction * distance
            });
        (position, self.target)
    }
}

/// The preset views available to a camera.
#[derive(Debug, Clone, Component, Reflect, Deref, DerefMut)]
pub struct PresetViews(pub Vec<PresetView>);

impl Default for PresetViews {
    fn default() -> Self {
        Self(vec![
            PresetView::new("Front View", Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO),
            PresetView::new("Top View", Vec3::new(0.0, -5.0, 0.0), Vec3::ZERO),
            PresetView::new("Side View", Vec3::new(5.0, -1.0, 0.0), Vec3::ZERO),
        ])
    }
}

impl PresetViews {
    /// Index of the first view with the given label.
    pub fn find(&self, label: &str) -> Option<usize> {
        self.iter().position(|view| view.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approach_distance_shortens_the_view() {
        let view = PresetView::new("Side View", Vec3::new(5.0, -1.0, 3.5), Vec3::ZERO)
            .with_approach_distance(2.5);
        let (position, target) = view.destination();
        assert_eq!(target, Vec3::ZERO);
        assert!((position.length() - 2.5).abs() < 1e-5);
        assert!(position.normalize().dot(view.position.normalize()) > 0.9999);
    }

    #[test]
    fn plain_views_go_exactly_where_asked() {
        let views = PresetViews::default();
        let index = views.find("Top View").unwrap();
        assert_eq!(
            views[index].destination(),
            (Vec3::new(0.0, -5.0, 0.0), Vec3::ZERO)
        );
        assert_eq!(views.find("Back View"), None);
    }
}
