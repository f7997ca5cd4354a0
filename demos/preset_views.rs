//! Moving between preset views with the keyboard, once the scene has streamed in.

use bevy::prelude::*;
use splat_orbit_cam::{
    extensions::preset_views::{PresetViewTrigger, PresetViews},
    prelude::{
        CameraState, DefaultSplatCamPlugins, SceneLoad, SceneStreamer, SplatCam, StreamOptions,
        Viewport,
    },
    scene::SceneLoadFuture,
};

fn main() {
    App::new()
        .add_plugins((DefaultPlugins, DefaultSplatCamPlugins))
        .add_systems(Startup, setup)
        .add_systems(Update, send_preset_view_triggers)
        .run();
}

/// Resolves every load immediately.
struct InstantStreamer;

impl SceneStreamer for InstantStreamer {
    fn load(&mut self, _uri: &str, _options: &StreamOptions) -> SceneLoadFuture {
        Box::pin(std::future::ready(Ok(())))
    }
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let views = PresetViews::default();
    let (position, look_target) = views[0].destination();
    commands.spawn((
        Camera3dBundle::default(),
        SplatCam::new(CameraState {
            position,
            look_target,
            ..default()
        }),
        Viewport::default(),
        views,
        SceneLoad::start(
            &mut InstantStreamer,
            "assets/data/garden/garden.ksplat",
            &StreamOptions::default(),
        ),
    ));

    commands.spawn(PbrBundle {
        mesh: meshes.add(Cuboid::new(1.0, 2.0, 0.5)),
        material: materials.add(Color::srgb(0.8, 0.7, 0.6)),
        ..default()
    });
    commands.spawn(PointLightBundle {
        transform: Transform::from_xyz(3.0, -4.0, 4.0),
        ..default()
    });
    commands.spawn(TextBundle::from_section(
        "1 - Front View\n2 - Top View\n3 - Side View",
        TextStyle::default(),
    ));
}

fn send_preset_view_triggers(
    keys: Res<ButtonInput<KeyCode>>,
    cameras: Query<Entity, With<PresetViews>>,
    mut triggers: EventWriter<PresetViewTrigger>,
) {
    let view = if keys.just_pressed(KeyCode::Digit1) {
        0
    } else if keys.just_pressed(KeyCode::Digit2) {
        1
    } else if keys.just_pressed(KeyCode::Digit3) {
        2
    } else {
        return;
    };
    for camera in &cameras {
        triggers.send(PresetViewTrigger { camera, view });
    }
}
