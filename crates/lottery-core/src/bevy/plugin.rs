//! Bevy plugins for the lottery scene.
//!
//! Provides:
//! - `LotteryHeadlessPlugin`: Logic-only plugin (no rendering/window dependencies) for headless runs and tests
//! - `LotteryUnifiedPlugin`: Full plugin including `LotteryHeadlessPlugin` + camera, input and rendering

use bevy::prelude::*;

use crate::bevy::events::*;
use crate::bevy::rapier_plugin::{LotteryPhysicsPlugin, SceneSet};
use crate::bevy::resources::*;
use crate::bevy::systems;
use crate::config::SceneConfig;

// ============================================================================
// Headless Plugin (logic only, no rendering/window dependencies)
// ============================================================================

/// Headless plugin containing the whole draw without rendering or window dependencies.
///
/// Use this plugin with `MinimalPlugins` to run the scene without a
/// windowing or rendering backend.
///
/// Excluded systems:
/// - Gizmo rendering (`render_scene_nodes`)
/// - Window/Projection-dependent camera systems
/// - Keyboard shortcuts
pub struct LotteryHeadlessPlugin {
    pub config: SceneConfig,
    pub command_queue: Option<CommandQueue>,
}

impl Default for LotteryHeadlessPlugin {
    fn default() -> Self {
        Self {
            config: SceneConfig::default_scene(),
            command_queue: None,
        }
    }
}

impl Plugin for LotteryHeadlessPlugin {
    fn build(&self, app: &mut App) {
        // ====================================================================
        // Physics
        // ====================================================================
        app.add_plugins(LotteryPhysicsPlugin);

        // ====================================================================
        // Resources
        // ====================================================================
        let scene = match LotterySceneRes::new(self.config.clone()) {
            Ok(scene) => scene,
            Err(e) => {
                tracing::error!("[config] invalid scene config ({e}), using the default scene");
                LotterySceneRes::new(SceneConfig::default_scene().with_seed(self.config.rng_seed))
                    .expect("default scene config is valid")
            }
        };
        tracing::info!("[scene] draw ready with seed {}", scene.seed());

        app.insert_resource(scene)
            .insert_resource(self.command_queue.clone().unwrap_or_default());

        // ====================================================================
        // Messages
        // ====================================================================
        app.add_message::<BallsReleasedEvent>()
            .add_message::<DoorOpenedEvent>()
            .add_message::<BallSelectedEvent>()
            .add_message::<BallSettledEvent>()
            .add_message::<RevealStageEvent>()
            .add_message::<RewardPresentedEvent>()
            .add_message::<SceneRestartedEvent>();

        // ====================================================================
        // Systems
        // ====================================================================

        // Republish after every fixed step
        app.add_systems(
            FixedUpdate,
            systems::publish_scene_events.in_set(SceneSet::Publish),
        );

        // Command processing and event handlers
        app.add_systems(
            Update,
            (systems::process_commands, systems::log_reward).chain(),
        );
    }
}

// ============================================================================
// Unified Plugin (headless + rendering)
// ============================================================================

/// Unified plugin for the windowed viewer.
///
/// Includes `LotteryHeadlessPlugin` for the draw itself, plus systems that
/// require `Gizmos`, `Window`, `Projection`, `Camera2d` and keyboard input.
#[derive(Default)]
pub struct LotteryUnifiedPlugin {
    pub config: SceneConfig,
    pub command_queue: Option<CommandQueue>,
}

impl LotteryUnifiedPlugin {
    pub fn new(config: SceneConfig, command_queue: CommandQueue) -> Self {
        Self {
            config,
            command_queue: Some(command_queue),
        }
    }
}

impl Plugin for LotteryUnifiedPlugin {
    fn build(&self, app: &mut App) {
        // ====================================================================
        // Headless logic
        // ====================================================================
        app.add_plugins(LotteryHeadlessPlugin {
            config: self.config.clone(),
            command_queue: self.command_queue.clone(),
        });

        // ====================================================================
        // Rendering
        // ====================================================================
        app.init_resource::<systems::NodePalette>();
        app.add_systems(Update, systems::render_scene_nodes);

        // ====================================================================
        // Camera (needs Window/Projection)
        // ====================================================================
        app.add_systems(Startup, systems::setup_camera);
        app.add_systems(
            Update,
            (systems::update_fit_camera, systems::apply_camera_smoothing).chain(),
        );

        // ====================================================================
        // Input
        // ====================================================================
        app.add_systems(
            Update,
            systems::handle_keyboard_input.before(systems::process_commands),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bevy::test_utils::TestApp;
    use crate::scene::{DrawPhase, RevealStage, Reward};

    const MAX_STEPS: usize = 3600;

    #[derive(Resource, Default)]
    struct Collected {
        stages: Vec<RevealStage>,
        rewards: Vec<Reward>,
        restarts: Vec<u64>,
    }

    fn collect(
        mut collected: ResMut<Collected>,
        mut stages: MessageReader<RevealStageEvent>,
        mut rewards: MessageReader<RewardPresentedEvent>,
        mut restarts: MessageReader<SceneRestartedEvent>,
    ) {
        collected.stages.extend(stages.read().map(|e| e.stage));
        collected
            .rewards
            .extend(rewards.read().map(|e| e.reward.clone()));
        collected.restarts.extend(restarts.read().map(|e| e.seed));
    }

    fn collecting_app() -> TestApp {
        let mut test = TestApp::new();
        test.app.init_resource::<Collected>();
        test.app
            .add_systems(Update, collect.after(systems::process_commands));
        test
    }

    #[test]
    fn test_headless_draw_completes() {
        let mut test = TestApp::new();
        assert_eq!(test.phase(), DrawPhase::Waiting);

        assert!(test.step_until_presented(MAX_STEPS));
        assert!(test.scene().scene.reward().is_some());
        assert_eq!(test.scene().completed_draws, 1);
    }

    #[test]
    fn test_reveal_messages_are_published() {
        let mut test = collecting_app();
        assert!(test.step_until_presented(MAX_STEPS));
        test.update();

        let collected = test.world_mut().resource::<Collected>();
        assert_eq!(
            collected.stages,
            vec![
                RevealStage::Rise,
                RevealStage::Shake,
                RevealStage::Open,
                RevealStage::Coin
            ]
        );
        assert_eq!(collected.rewards.len(), 1);
    }

    #[test]
    fn test_impulse_command_starts_mixing() {
        let mut test = TestApp::new();
        test.push_command(SceneCommand::Impulse);
        test.update();
        assert_eq!(test.phase(), DrawPhase::Mixing);
    }

    #[test]
    fn test_restart_command_resets_draw() {
        let mut test = collecting_app();
        test.push_command(SceneCommand::Impulse);
        test.update();
        test.step_physics(30);
        assert_ne!(test.phase(), DrawPhase::Waiting);

        test.push_command(SceneCommand::Restart { seed: 99 });
        test.update();

        assert_eq!(test.phase(), DrawPhase::Waiting);
        assert_eq!(test.scene().seed(), 99);
        assert_eq!(test.scene().scene.frame(), 0);
        assert_eq!(test.world_mut().resource::<Collected>().restarts, vec![99]);
    }

    #[test]
    fn test_yield_defers_commands() {
        let mut test = TestApp::new();
        test.push_command(SceneCommand::Yield);
        test.push_command(SceneCommand::Impulse);

        test.update();
        assert_eq!(test.phase(), DrawPhase::Waiting);
        test.update();
        assert_eq!(test.phase(), DrawPhase::Mixing);
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let mut config = SceneConfig::default_scene().with_seed(7);
        config.ball_count = 0;

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(LotteryHeadlessPlugin {
            config,
            command_queue: None,
        });

        let scene = app.world().resource::<LotterySceneRes>();
        assert_eq!(scene.seed(), 7);
        assert_eq!(
            scene.scene.config().ball_count,
            SceneConfig::default_scene().ball_count
        );
    }
}
