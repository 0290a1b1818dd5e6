//! Camera systems for the lottery scene.
//!
//! The scene is centred on the world origin, so the camera never pans; it
//! only zooms to keep the whole machine inside the window.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::bevy::{LotterySceneRes, MainCamera, SceneCamera};

/// Spawns the main camera.
pub fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2d, MainCamera, SceneCamera::default()));
    tracing::info!("[camera] scene camera spawned");
}

/// Zoom that fits `scene_size` (plus padding) inside `window_size`.
pub fn fit_zoom(scene_size: Vec2, window_size: Vec2, padding: f32) -> f32 {
    let padded = scene_size * (1.0 + padding);
    let zoom = (window_size.x / padded.x).min(window_size.y / padded.y);
    zoom.clamp(0.05, 20.0)
}

/// Updates the target zoom so the scene fits the primary window.
pub fn update_fit_camera(
    mut cameras: Query<&mut SceneCamera, With<MainCamera>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    scene: Res<LotterySceneRes>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let scene_size = scene.scene.layout().scene_size;
    let window_size = Vec2::new(window.width(), window.height());

    for mut camera in &mut cameras {
        camera.target_zoom = fit_zoom(scene_size, window_size, camera.padding);
    }
}

/// Eases the zoom toward its target and applies it to the projection.
pub fn apply_camera_smoothing(
    mut cameras: Query<(&mut SceneCamera, &mut Projection), With<MainCamera>>,
) {
    for (mut camera, mut projection) in &mut cameras {
        camera.zoom += (camera.target_zoom - camera.zoom) * camera.smoothing;

        if let Projection::Orthographic(ortho) = projection.as_mut() {
            ortho.scale = 1.0 / camera.zoom;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_zoom_uses_tighter_axis() {
        let zoom = fit_zoom(Vec2::new(800.0, 1261.0), Vec2::new(1280.0, 720.0), 0.0);
        assert!((zoom - 720.0 / 1261.0).abs() < 1e-5);
    }

    #[test]
    fn test_fit_zoom_is_clamped() {
        assert_eq!(fit_zoom(Vec2::splat(1.0), Vec2::splat(1000.0), 0.0), 20.0);
    }
}
