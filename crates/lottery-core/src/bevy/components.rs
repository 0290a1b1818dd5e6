//! ECS Components for the lottery scene.

use bevy::prelude::*;

/// Marker component for the main camera.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MainCamera;

/// Camera that keeps the whole scene in view.
#[derive(Component, Debug, Clone)]
pub struct SceneCamera {
    /// Current zoom (screen pixels per scene pixel).
    pub zoom: f32,
    /// Zoom the camera is easing toward.
    pub target_zoom: f32,
    /// Smoothing factor (0.0-1.0, lower = smoother). Default 0.1 means 10% per frame.
    pub smoothing: f32,
    /// Extra room around the scene, as a fraction of its size.
    pub padding: f32,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            target_zoom: 1.0,
            smoothing: 0.1,
            padding: 0.05,
        }
    }
}
