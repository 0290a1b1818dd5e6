//! Keyboard shortcuts.

use bevy::prelude::*;

use crate::bevy::{CommandQueue, LotterySceneRes, SceneCommand};

/// Space restarts with the next seed, Enter kicks the balls right away.
pub fn handle_keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    command_queue: Res<CommandQueue>,
    scene: Res<LotterySceneRes>,
) {
    if keyboard.just_pressed(KeyCode::Space) {
        command_queue.push(SceneCommand::Restart {
            seed: scene.seed().wrapping_add(1),
        });
    }
    if keyboard.just_pressed(KeyCode::Enter) {
        command_queue.push(SceneCommand::Impulse);
    }
}
