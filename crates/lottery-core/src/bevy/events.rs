//! ECS Events (Messages) for the lottery scene.
//!
//! Scene events drained from [`crate::scene::LotteryScene`] are republished
//! here once per fixed step. In Bevy 0.18+, buffered events use the Message
//! trait instead of Event.

use bevy::prelude::*;

use crate::ball::BallId;
use crate::scene::{RevealStage, Reward};

/// Message fired when the balls get their initial kick.
#[derive(Message, Debug, Clone, Default)]
pub struct BallsReleasedEvent;

/// Message fired when the box floor opens.
#[derive(Message, Debug, Clone, Default)]
pub struct DoorOpenedEvent;

/// Message fired when the first ball drops out of the box.
#[derive(Message, Debug, Clone)]
pub struct BallSelectedEvent {
    pub ball_id: BallId,
}

/// Message fired when the result ball comes to rest in the pipe.
#[derive(Message, Debug, Clone)]
pub struct BallSettledEvent {
    pub ball_id: BallId,
}

/// Message fired when a reveal stage begins.
#[derive(Message, Debug, Clone)]
pub struct RevealStageEvent {
    pub stage: RevealStage,
}

/// Message fired when the reward is on screen.
#[derive(Message, Debug, Clone)]
pub struct RewardPresentedEvent {
    pub reward: Reward,
}

/// Message fired after the scene was rebuilt for a new draw.
#[derive(Message, Debug, Clone)]
pub struct SceneRestartedEvent {
    pub seed: u64,
}
