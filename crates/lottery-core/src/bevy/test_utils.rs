//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `LotteryHeadlessPlugin` for testing the draw
//! without a rendering or windowing backend.

use bevy::prelude::*;

use crate::bevy::plugin::LotteryHeadlessPlugin;
use crate::bevy::resources::{CommandQueue, LotterySceneRes, SceneCommand};
use crate::config::SceneConfig;
use crate::physics::PHYSICS_DT;
use crate::scene::DrawPhase;

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
}

impl TestApp {
    /// Create a new test app with the default scene.
    pub fn new() -> Self {
        Self::with_seed(12345)
    }

    /// Create a new test app with a specific RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::input::InputPlugin);
        app.add_plugins(LotteryHeadlessPlugin {
            config: SceneConfig::default_scene().with_seed(seed),
            command_queue: None,
        });
        // Only explicit step_physics calls advance the fixed clock.
        app.world_mut().resource_mut::<Time<Virtual>>().pause();
        app.update();
        Self { app }
    }

    /// Run a single frame update.
    pub fn update(&mut self) {
        self.app.update();
    }

    /// Advance the scene by exactly `n` fixed timesteps.
    ///
    /// Feeds time straight into the fixed-timestep accumulator, bypassing
    /// the paused virtual clock.
    pub fn step_physics(&mut self, n: usize) {
        let dt = std::time::Duration::from_secs_f32(PHYSICS_DT);
        for _ in 0..n {
            self.app
                .world_mut()
                .resource_mut::<Time<Fixed>>()
                .accumulate_overstep(dt);
            self.app.update();
        }
    }

    /// Steps until the reward is presented or `max_steps` have run.
    pub fn step_until_presented(&mut self, max_steps: usize) -> bool {
        for _ in 0..max_steps {
            if self.phase().is_presented() {
                return true;
            }
            self.step_physics(1);
        }
        self.phase().is_presented()
    }

    /// Push a command to the command queue.
    pub fn push_command(&mut self, cmd: SceneCommand) {
        self.app.world().resource::<CommandQueue>().push(cmd);
    }

    pub fn scene(&self) -> &LotterySceneRes {
        self.app.world().resource::<LotterySceneRes>()
    }

    pub fn phase(&self) -> DrawPhase {
        self.scene().scene.phase().clone()
    }

    /// Get a mutable reference to the World.
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
