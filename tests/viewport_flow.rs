//! End-to-end flows through a headless app: sizing, picking, preset views, scene gating, and the
//! fixed-cadence render loop.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    task::{Context, Poll},
};

use bevy_app::prelude::*;
use bevy_ecs::{event::Events, prelude::*};
use bevy_input::{
    mouse::{MouseButtonInput, MouseMotion, MouseScrollUnit, MouseWheel},
    prelude::*,
    ButtonState, InputPlugin,
};
use bevy_math::{prelude::*, DVec2};
use bevy_render::camera::{Camera, Projection};
use bevy_transform::prelude::*;
use bevy_window::{PrimaryWindow, Window, WindowResolution};
use splat_orbit_cam::{
    extensions::preset_views::{PresetViewTrigger, PresetViews, PresetViewsPlugin},
    prelude::*,
    scene::{SceneLoadFailed, SceneLoadFuture},
};

#[derive(Debug, Default)]
struct Calls {
    resizes: Vec<ViewportSize>,
    updates: usize,
    renders: usize,
}

/// Renders nothing; the scene is a unit sphere at the origin.
#[derive(Clone, Default)]
struct RecordingRenderer(Arc<Mutex<Calls>>);

impl RecordingRenderer {
    fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.0.lock().unwrap()
    }
}

impl SceneRaycast for RecordingRenderer {
    fn intersect(&self, ray: Ray3d) -> Option<SceneHit> {
        let along = (-ray.origin).dot(*ray.direction);
        let closest_sq = ray.origin.length_squared() - along * along;
        if along < 0.0 || closest_sq > 1.0 {
            return None;
        }
        Some(SceneHit {
            point: ray.get_point(along - (1.0 - closest_sq).sqrt()),
            object: Entity::from_raw(42),
        })
    }
}

impl SplatRenderer for RecordingRenderer {
    fn resize(&mut self, size: ViewportSize) {
        self.calls().resizes.push(size);
    }
    fn update(&mut self, _camera: &CameraState) {
        self.calls().updates += 1;
    }
    fn render(&mut self, _camera: &CameraState) {
        self.calls().renders += 1;
    }
}

struct GatedFuture {
    open: Arc<AtomicBool>,
    fail: bool,
}

impl Future for GatedFuture {
    type Output = Result<(), SceneLoadError>;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        if !self.open.load(Ordering::SeqCst) {
            return Poll::Pending;
        }
        Poll::Ready(if self.fail {
            Err(SceneLoadError::Decode {
                uri: "scene.ksplat".into(),
                reason: "truncated".into(),
            })
        } else {
            Ok(())
        })
    }
}

struct GatedStreamer {
    open: Arc<AtomicBool>,
    fail: bool,
}

impl SceneStreamer for GatedStreamer {
    fn load(&mut self, _uri: &str, _options: &StreamOptions) -> SceneLoadFuture {
        Box::pin(GatedFuture {
            open: self.open.clone(),
            fail: self.fail,
        })
    }
}

fn app() -> App {
    let mut app = App::new();
    app.add_plugins((InputPlugin, SplatCamPlugin::default(), PresetViewsPlugin));
    app
}

fn spawn_window(app: &mut App, cursor: Vec2) -> Entity {
    let mut window = Window::default();
    window.set_physical_cursor_position(Some(DVec2::new(cursor.x as f64, cursor.y as f64)));
    app.world_mut().spawn((window, PrimaryWindow)).id()
}

fn set_cursor(app: &mut App, window: Entity, cursor: Vec2) {
    app.world_mut()
        .get_mut::<Window>(window)
        .unwrap()
        .set_physical_cursor_position(Some(DVec2::new(cursor.x as f64, cursor.y as f64)));
}

/// A viewport covering the `x..x + 640` column of a 1280x720 window.
fn spawn_half_viewport(app: &mut App, renderer: &RecordingRenderer, x: u32) -> Entity {
    let mut camera = Camera::default();
    camera.viewport = Some(bevy_render::camera::Viewport {
        physical_position: UVec2::new(x, 0),
        physical_size: UVec2::new(640, 720),
        ..Default::default()
    });
    let entity = spawn_viewport(app, renderer);
    app.world_mut().entity_mut(entity).insert((
        camera,
        OrbitInput::new(ConstraintSet::new(1.0, 20.0, 0.0, std::f32::consts::PI).unwrap()),
    ));
    entity
}

fn spawn_viewport(app: &mut App, renderer: &RecordingRenderer) -> Entity {
    let state = CameraState {
        position: Vec3::new(0.0, 0.0, 10.0),
        look_target: Vec3::ZERO,
        up: Vec3::Y,
        ..Default::default()
    };
    app.world_mut()
        .spawn((
            SplatCam::new(state),
            Viewport::default(),
            PickFocus::default(),
            ViewportRenderer::new(renderer.clone()),
            Transform::default(),
        ))
        .id()
}

fn click(app: &mut App, window: Entity) {
    for state in [ButtonState::Pressed, ButtonState::Released] {
        app.world_mut().send_event(MouseButtonInput {
            button: MouseButton::Left,
            state,
            window,
        });
        app.update();
    }
}

fn run_fixed_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

fn cam(app: &App, entity: Entity) -> &SplatCam {
    app.world().get::<SplatCam>(entity).unwrap()
}

#[test]
fn window_size_reaches_renderer_and_camera_once() {
    let mut app = app();
    let renderer = RecordingRenderer::default();
    spawn_window(&mut app, Vec2::new(640.0, 360.0));
    let camera = spawn_viewport(&mut app, &renderer);

    app.update();
    app.update();
    app.update();

    assert_eq!(renderer.calls().resizes, vec![ViewportSize::new(1280, 720)]);
    let aspect = cam(&app, camera).state().aspect_ratio;
    assert!((aspect - 1280.0 / 720.0).abs() < 1e-6);
}

#[test]
fn click_flies_the_camera_to_the_picked_point() {
    let mut app = app();
    let renderer = RecordingRenderer::default();
    let window = spawn_window(&mut app, Vec2::new(640.0, 360.0));
    let camera = spawn_viewport(&mut app, &renderer);
    app.update();

    click(&mut app, window);

    let transition = *cam(&app, camera).transition().expect("click should start a transition");
    assert!((transition.to_target - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-4);
    assert!((transition.to_position - Vec3::new(0.0, 2.0, 6.0)).length() < 1e-4);

    run_fixed_frames(&mut app, 75);
    let cam = cam(&app, camera);
    assert!(!cam.is_animating());
    assert_eq!(cam.state().position, transition.to_position);
    assert_eq!(cam.look_target(), transition.to_target);

    let calls = renderer.calls();
    assert_eq!(calls.updates, 75);
    assert_eq!(calls.renders, 75);
}

#[test]
fn dragging_does_not_pick() {
    let mut app = app();
    let renderer = RecordingRenderer::default();
    let window = spawn_window(&mut app, Vec2::new(640.0, 360.0));
    let camera = spawn_viewport(&mut app, &renderer);
    app.update();

    app.world_mut().send_event(MouseButtonInput {
        button: MouseButton::Left,
        state: ButtonState::Pressed,
        window,
    });
    app.update();
    app.world_mut().send_event(MouseMotion {
        delta: Vec2::new(30.0, 0.0),
    });
    app.update();
    app.world_mut().send_event(MouseButtonInput {
        button: MouseButton::Left,
        state: ButtonState::Released,
        window,
    });
    app.update();

    assert!(!cam(&app, camera).is_animating());
}

#[test]
fn left_drag_orbits_when_orbit_input_is_present() {
    let mut app = app();
    let renderer = RecordingRenderer::default();
    let window = spawn_window(&mut app, Vec2::new(640.0, 360.0));
    let camera = spawn_viewport(&mut app, &renderer);
    app.world_mut().entity_mut(camera).insert(OrbitInput::new(
        ConstraintSet::new(1.0, 20.0, 0.0, std::f32::consts::PI).unwrap(),
    ));
    app.update();
    let before = cam(&app, camera).state();

    app.world_mut().send_event(MouseButtonInput {
        button: MouseButton::Left,
        state: ButtonState::Pressed,
        window,
    });
    app.world_mut().send_event(MouseMotion {
        delta: Vec2::new(50.0, 0.0),
    });
    app.update();

    let after = cam(&app, camera).state();
    assert_ne!(after.position, before.position);
    assert!((after.distance_to_target() - before.distance_to_target()).abs() < 1e-3);
    assert!(!cam(&app, camera).is_animating());
}

#[test]
fn each_viewport_takes_only_its_own_input() {
    let mut app = app();
    let left_renderer = RecordingRenderer::default();
    let right_renderer = RecordingRenderer::default();
    let window = spawn_window(&mut app, Vec2::new(320.0, 360.0));
    let left = spawn_half_viewport(&mut app, &left_renderer, 0);
    let right = spawn_half_viewport(&mut app, &right_renderer, 640);
    app.update();

    let half = ViewportSize::new(640, 720);
    assert_eq!(left_renderer.calls().resizes, vec![half]);
    assert_eq!(right_renderer.calls().resizes, vec![half]);
    let right_viewport = app.world().get::<Viewport>(right).unwrap();
    assert_eq!(right_viewport.position(), UVec2::new(640, 0));
    let start = cam(&app, right).state();

    // Drag over the left viewport.
    app.world_mut().send_event(MouseButtonInput {
        button: MouseButton::Left,
        state: ButtonState::Pressed,
        window,
    });
    app.update();
    app.world_mut().send_event(MouseMotion {
        delta: Vec2::new(50.0, 0.0),
    });
    app.update();
    app.world_mut().send_event(MouseButtonInput {
        button: MouseButton::Left,
        state: ButtonState::Released,
        window,
    });
    app.update();
    assert_ne!(cam(&app, left).state().position, start.position);
    assert_eq!(cam(&app, right).state().position, start.position);

    // Scroll over the right viewport.
    set_cursor(&mut app, window, Vec2::new(960.0, 360.0));
    let left_distance = cam(&app, left).state().distance_to_target();
    app.world_mut().send_event(MouseWheel {
        unit: MouseScrollUnit::Line,
        x: 0.0,
        y: 1.0,
        window,
    });
    app.update();
    assert!((cam(&app, right).state().distance_to_target() - 9.5).abs() < 1e-3);
    assert_eq!(cam(&app, left).state().distance_to_target(), left_distance);

    // Click in the middle of the right viewport.
    click(&mut app, window);
    assert!(!cam(&app, left).is_animating());
    let transition = *cam(&app, right).transition().unwrap();
    assert!((transition.to_target - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-3);
}

#[test]
fn projection_follows_the_observed_surface() {
    let mut app = app();
    let renderer = RecordingRenderer::default();
    let window = Window {
        resolution: WindowResolution::new(1525.0, 700.0),
        ..Default::default()
    };
    app.world_mut().spawn((window, PrimaryWindow));
    let camera = spawn_viewport(&mut app, &renderer);
    app.world_mut()
        .entity_mut(camera)
        .insert(Projection::default());

    app.update();

    let state = cam(&app, camera).state();
    let Projection::Perspective(perspective) = app.world().get::<Projection>(camera).unwrap()
    else {
        panic!("expected a perspective projection");
    };
    assert!((perspective.aspect_ratio - 1525.0 / 700.0).abs() < 1e-6);
    assert_eq!(perspective.aspect_ratio, state.aspect_ratio);
    assert_eq!(perspective.fov, state.fov);
    assert_eq!(perspective.near, state.near);
    assert_eq!(perspective.far, state.far);
}

#[test]
fn preset_view_trigger_requests_a_transition() {
    let mut app = app();
    let renderer = RecordingRenderer::default();
    let camera = spawn_viewport(&mut app, &renderer);
    app.world_mut()
        .entity_mut(camera)
        .insert(PresetViews::default());

    app.world_mut().send_event(PresetViewTrigger { camera, view: 1 });
    app.update();
    let transition = *cam(&app, camera).transition().unwrap();
    assert_eq!(transition.to_position, Vec3::new(0.0, -5.0, 0.0));

    // Mashing another view while animating is dropped.
    app.world_mut().send_event(PresetViewTrigger { camera, view: 2 });
    app.update();
    assert_eq!(cam(&app, camera).transition().unwrap().to_position, transition.to_position);
}

#[test]
fn transform_follows_the_camera_state() {
    let mut app = app();
    let renderer = RecordingRenderer::default();
    let camera = spawn_viewport(&mut app, &renderer);
    app.world_mut()
        .get_mut::<SplatCam>(camera)
        .unwrap()
        .request_transition(Vec3::new(3.0, 0.0, 4.0), Vec3::ZERO, 0.5);

    run_fixed_frames(&mut app, 25);
    app.update();

    let transform = app.world().get::<Transform>(camera).unwrap();
    assert!((transform.translation - Vec3::new(3.0, 0.0, 4.0)).length() < 1e-5);
    assert!((*transform.forward() - Vec3::new(-0.6, 0.0, -0.8)).length() < 1e-5);
}

#[test]
fn render_loop_waits_for_the_scene() {
    let mut app = app();
    let renderer = RecordingRenderer::default();
    let camera = spawn_viewport(&mut app, &renderer);
    let open = Arc::new(AtomicBool::new(false));
    let mut streamer = GatedStreamer {
        open: open.clone(),
        fail: false,
    };
    let load = SceneLoad::start(&mut streamer, "scene.ksplat", &StreamOptions::default());
    app.world_mut().entity_mut(camera).insert(load);

    app.update();
    run_fixed_frames(&mut app, 3);
    assert_eq!(renderer.calls().renders, 0);

    open.store(true, Ordering::SeqCst);
    app.update();
    run_fixed_frames(&mut app, 3);
    assert_eq!(renderer.calls().renders, 3);
    assert!(app.world().get::<SceneLoad>(camera).unwrap().is_ready());
}

#[test]
fn failed_scene_is_reported_and_never_rendered() {
    let mut app = app();
    let renderer = RecordingRenderer::default();
    let camera = spawn_viewport(&mut app, &renderer);
    let mut streamer = GatedStreamer {
        open: Arc::new(AtomicBool::new(true)),
        fail: true,
    };
    let load = SceneLoad::start(&mut streamer, "scene.ksplat", &StreamOptions::default());
    app.world_mut().entity_mut(camera).insert(load);

    app.update();
    run_fixed_frames(&mut app, 3);

    assert_eq!(renderer.calls().renders, 0);
    let events = app.world().resource::<Events<SceneLoadFailed>>();
    let failures: Vec<_> = events.get_reader().read(events).cloned().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].viewport, camera);
}
