//! The boundary with the asset streaming service that loads splat scenes.
//!
//! The controller never sees scene bytes. It starts a load, polls the returned future once per
//! frame without blocking, and only lets a viewport into the render loop once the load is done.

use std::{fmt, future::Future, pin::Pin};

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_reflect::prelude::*;
use bevy_tasks::futures_lite::future;
use bevy_transform::prelude::*;
use thiserror::Error;

/// A pending scene load, resolved once by the controller.
pub type SceneLoadFuture = Pin<Box<dyn Future<Output = Result<(), SceneLoadError>> + Send + Sync>>;

/// Why a scene failed to load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneLoadError {
    /// The scene could not be fetched.
    #[error("failed to fetch scene `{uri}`: {reason}")]
    Fetch {
        /// The scene that was requested.
        uri: String,
        /// Streamer-specific detail.
        reason: String,
    },
    /// The scene was fetched but could not be decoded.
    #[error("failed to decode scene `{uri}`: {reason}")]
    Decode {
        /// The scene that was requested.
        uri: String,
        /// Streamer-specific detail.
        reason: String,
    },
}

/// Options passed to the streaming service with each load.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct StreamOptions {
    /// Show splats as they arrive instead of waiting for the whole scene.
    pub progressive: bool,
    /// Splats with alpha below this value, out of 255, are discarded while loading.
    pub alpha_removal_threshold: f32,
    /// Placement of the loaded scene in the world.
    pub initial_transform: Transform,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            progressive: true,
            alpha_removal_threshold: 1.0,
            initial_transform: Transform::IDENTITY,
        }
    }
}

/// Loads splat scenes on behalf of a viewport.
pub trait SceneStreamer {
    /// Begin loading `uri`. The future completes once the scene is ready to render.
    fn load(&mut self, uri: &str, options: &StreamOptions) -> SceneLoadFuture;
}

/// Sent when a viewport's scene fails to load, for hosts that surface errors to users.
#[derive(Debug, Clone, Event)]
pub struct SceneLoadFailed {
    /// The viewport whose scene failed.
    pub viewport: Entity,
    /// What went wrong.
    pub error: SceneLoadError,
}

/// Load status of a viewport's scene. The render loop skips viewports that are not ready.
#[derive(Component)]
pub enum SceneLoad {
    /// Waiting on the streaming service.
    Loading {
        /// The scene being loaded.
        uri: String,
        /// Completes when the load finishes.
        task: SceneLoadFuture,
    },
    /// The scene is loaded.
    Ready,
    /// The load failed. The viewport stays out of the render loop.
    Failed(SceneLoadError),
}

impl fmt::Debug for SceneLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneLoad::Loading { uri, .. } => f
                .debug_struct("Loading")
                .field("uri", uri)
                .field("task", &"<future>")
                .finish(),
            SceneLoad::Ready => f.write_str("Ready"),
            SceneLoad::Failed(error) => f.debug_tuple("Failed").field(error).finish(),
        }
    }
}

impl SceneLoad {
    /// Ask `streamer` for `uri` and track the result.
    pub fn start<S: SceneStreamer + ?Sized>(
        streamer: &mut S,
        uri: impl Into<String>,
        options: &StreamOptions,
    ) -> Self {
        let uri = uri.into();
        info!("Loading scene `{uri}`");
        let task = streamer.load(&uri, options);
        SceneLoad::Loading { uri, task }
    }

    /// Has the scene finished loading successfully?
    pub fn is_ready(&self) -> bool {
        matches!(self, SceneLoad::Ready)
    }

    /// Poll a pending load once, without blocking.
    ///
    /// Returns the outcome on the poll that completes the load, and `None` otherwise, including
    /// on every poll after completion.
    pub fn poll(&mut self) -> Option<Result<(), SceneLoadError>> {
        let SceneLoad::Loading { task, .. } = self else {
            return None;
        };
        let outcome = future::block_on(future::poll_once(task))?;
        *self = match &outcome {
            Ok(()) => SceneLoad::Ready,
            Err(error) => SceneLoad::Failed(error.clone()),
        };
        Some(outcome)
    }
}

/// Poll every pending scene load, logging and reporting failures.
pub fn poll_scene_loads(
    mut scenes: Query<(Entity, &mut SceneLoad)>,
    mut failures: EventWriter<SceneLoadFailed>,
) {
    for (viewport, mut scene) in &mut scenes {
        if !matches!(*scene, SceneLoad::Loading { .. }) {
            continue;
        }
        match scene.poll() {
            Some(Ok(())) => info!("Scene for viewport {viewport:?} is ready"),
            Some(Err(error)) => {
                error!("Error loading the scene: {error}");
                failures.send(SceneLoadFailed { viewport, error });
            }
            None => (),
        }
    }
}
