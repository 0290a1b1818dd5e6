//! Command processing system.
//!
//! Processes commands pushed into the shared [`CommandQueue`] by the host.

use bevy::prelude::*;

use crate::bevy::{CommandQueue, LotterySceneRes, SceneCommand, SceneRestartedEvent};

/// System to process commands from the external command queue.
///
/// Handles commands until a Yield is encountered.
/// Commands after Yield are processed in the next frame.
pub fn process_commands(
    command_queue: Res<CommandQueue>,
    mut scene: ResMut<LotterySceneRes>,
    mut restarted: MessageWriter<SceneRestartedEvent>,
) {
    for command in command_queue.drain_until_yield() {
        match command {
            SceneCommand::Impulse => {
                tracing::info!("[command] Impulse");
                if !scene.scene.impulse_now() {
                    tracing::warn!(
                        "[command] Impulse ignored, draw is already {}",
                        scene.scene.phase().name()
                    );
                }
            }
            SceneCommand::Restart { seed } => {
                tracing::info!("[command] Restart with seed {seed}");
                scene.scene.restart(seed);
                restarted.write(SceneRestartedEvent { seed });
            }
            // Yield is consumed by drain_until_yield(), should not reach here
            SceneCommand::Yield => {}
        }
    }
}
