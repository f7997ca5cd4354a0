//! A minimal example showing the steps needed to get started with the plugin.

use bevy::prelude::*;
use splat_orbit_cam::prelude::{
    CameraState, DefaultSplatCamPlugins, OrbitInput, PickFocus, SceneHit, SceneRaycast, SplatCam,
    SplatRenderer, Viewport, ViewportRenderer, ViewportSize,
};

fn main() {
    App::new()
        .add_plugins((
            DefaultPlugins,
            DefaultSplatCamPlugins, // Step 1: Add camera controller plugins
        ))
        .add_systems(Startup, (setup_camera, setup_scene))
        .run();
}

fn setup_camera(mut commands: Commands) {
    let state = CameraState {
        position: Vec3::new(-1.0, 2.5, 3.5),
        up: Vec3::Y,
        ..default()
    };
    commands.spawn((
        Camera3dBundle::default(),
        SplatCam::new(state), // Step 2: add the controller to any camera
        OrbitInput::default(), // Step 3 (optional): orbit, pan, and zoom with the mouse
        PickFocus::default(), // Step 4 (optional): click to fly toward a point
        Viewport::default(), // Step 5 (optional): follow the window size
        ViewportRenderer::new(GroundPlane), // Step 6 (optional): your splat renderer
    ));
}

//
// --- The below code is not important for the example ---
//

/// Stands in for a splat renderer. Bevy draws the scene; picks hit the ground plane.
struct GroundPlane;

impl SceneRaycast for GroundPlane {
    fn intersect(&self, ray: Ray3d) -> Option<SceneHit> {
        let distance = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y))?;
        Some(SceneHit {
            point: ray.get_point(distance),
            object: Entity::PLACEHOLDER,
        })
    }
}

impl SplatRenderer for GroundPlane {
    fn resize(&mut self, size: ViewportSize) {
        info!("Viewport is now {}x{}", size.width, size.height);
    }
    fn update(&mut self, _camera: &CameraState) {}
    fn render(&mut self, _camera: &CameraState) {}
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn(PbrBundle {
        mesh: meshes.add(Plane3d::default().mesh().size(20.0, 20.0)),
        material: materials.add(Color::srgb(0.3, 0.5, 0.3)),
        ..default()
    });
    for (i, x) in [-2.0, 0.0, 2.0].into_iter().enumerate() {
        commands.spawn(PbrBundle {
            mesh: meshes.add(Cuboid::new(1.0, 1.0 + i as f32, 1.0)),
            material: materials.add(Color::srgb(0.8, 0.7, 0.6)),
            transform: Transform::from_xyz(x, 0.5 + i as f32 * 0.5, 0.0),
            ..default()
        });
    }
    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
    commands.spawn(
        TextBundle::from_section(
            "Left Mouse - Orbit\nRight Mouse - Pan\nScroll - Zoom\nClick - Fly to point",
            TextStyle {
                font_size: 20.0,
                ..default()
            },
        )
        .with_style(Style {
            margin: UiRect::all(Val::Px(20.0)),
            ..default()
        }),
    );
}
