//! ECS Resources for the lottery scene.

use std::collections::VecDeque;
use std::sync::Arc;

use bevy::prelude::*;
use parking_lot::Mutex;

use crate::config::SceneConfig;
use crate::scene::{LotteryScene, SceneError};

/// Bevy Resource wrapping the running [`LotteryScene`].
#[derive(Resource, Debug)]
pub struct LotterySceneRes {
    pub scene: LotteryScene,
    /// Number of draws that reached their reward since the app started.
    pub completed_draws: u32,
}

impl LotterySceneRes {
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        Ok(Self {
            scene: LotteryScene::new(config)?,
            completed_draws: 0,
        })
    }

    /// Seed of the current draw.
    pub fn seed(&self) -> u64 {
        self.scene.config().rng_seed
    }
}

/// Commands that can be sent to the app from outside the ECS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneCommand {
    /// Kick the balls now instead of waiting for the start delay.
    Impulse,
    /// Throw the current draw away and start a new one.
    Restart { seed: u64 },
    /// Frame boundary marker - commands after this are processed in the next frame.
    Yield,
}

/// Thread-safe command queue shared between the host and the Bevy app.
#[derive(Resource, Clone, Debug)]
pub struct CommandQueue {
    inner: Arc<Mutex<VecDeque<SceneCommand>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Push a command to be processed.
    pub fn push(&self, command: SceneCommand) {
        self.inner.lock().push_back(command);
    }

    /// Drain all pending commands, including frame markers.
    pub fn drain(&self) -> Vec<SceneCommand> {
        self.inner.lock().drain(..).collect()
    }

    /// Drain commands until Yield or empty.
    ///
    /// Returns commands up to (not including) Yield.
    /// Yield itself is consumed but not returned.
    pub fn drain_until_yield(&self) -> Vec<SceneCommand> {
        let mut guard = self.inner.lock();
        let mut commands = Vec::new();

        while let Some(cmd) = guard.pop_front() {
            if cmd == SceneCommand::Yield {
                tracing::debug!("[command] Yield - deferring remaining commands to next frame");
                break;
            }
            commands.push(cmd);
        }

        commands
    }

    /// Check if there are pending commands.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
