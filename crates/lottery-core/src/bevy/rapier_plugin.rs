//! Fixed-step driver for the Rapier2D-backed scene.
//!
//! The scene owns its `PhysicsWorld` directly, so Bevy only has to decide
//! when a step happens. One `FixedUpdate` is exactly one scene frame.

use bevy::prelude::*;

use crate::bevy::resources::LotterySceneRes;
use crate::physics::PHYSICS_DT;

// ============================================================================
// System Sets
// ============================================================================

/// Ordering of the per-frame scene work inside `FixedUpdate`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SceneSet {
    /// Advance the scene (physics, phase logic, actions).
    Step,
    /// Republish scene events as messages.
    Publish,
}

// ============================================================================
// Systems
// ============================================================================

/// Advances the scene by one fixed frame.
pub fn tick_scene(scene: Option<ResMut<LotterySceneRes>>) {
    let Some(mut scene) = scene else {
        return;
    };
    scene.scene.tick();
}

// ============================================================================
// Plugin
// ============================================================================

/// Runs the scene at the physics rate (60 Hz).
pub struct LotteryPhysicsPlugin;

impl Plugin for LotteryPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_seconds(f64::from(PHYSICS_DT)));

        app.configure_sets(FixedUpdate, (SceneSet::Step, SceneSet::Publish).chain());
        app.add_systems(FixedUpdate, tick_scene.in_set(SceneSet::Step));
    }
}
