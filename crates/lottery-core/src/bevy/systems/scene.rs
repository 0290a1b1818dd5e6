//! Scene event publishing.

use bevy::prelude::*;

use crate::bevy::{
    BallSelectedEvent, BallSettledEvent, BallsReleasedEvent, DoorOpenedEvent, LotterySceneRes,
    RevealStageEvent, RewardPresentedEvent,
};
use crate::scene::SceneEvent;

/// Drains the events of the last scene frame into Bevy messages.
#[allow(clippy::too_many_arguments)]
pub fn publish_scene_events(
    mut scene: ResMut<LotterySceneRes>,
    mut released: MessageWriter<BallsReleasedEvent>,
    mut door_opened: MessageWriter<DoorOpenedEvent>,
    mut selected: MessageWriter<BallSelectedEvent>,
    mut settled: MessageWriter<BallSettledEvent>,
    mut stages: MessageWriter<RevealStageEvent>,
    mut presented: MessageWriter<RewardPresentedEvent>,
) {
    for event in scene.scene.drain_events() {
        match event {
            SceneEvent::BallsReleased => {
                released.write(BallsReleasedEvent);
            }
            SceneEvent::DoorOpened => {
                door_opened.write(DoorOpenedEvent);
            }
            SceneEvent::BallSelected(ball_id) => {
                selected.write(BallSelectedEvent { ball_id });
            }
            SceneEvent::BallSettled(ball_id) => {
                settled.write(BallSettledEvent { ball_id });
            }
            SceneEvent::StageStarted(stage) => {
                stages.write(RevealStageEvent { stage });
            }
            SceneEvent::RewardPresented(reward) => {
                scene.completed_draws += 1;
                presented.write(RewardPresentedEvent { reward });
            }
        }
    }
}

/// Logs every presented reward.
pub fn log_reward(mut rewards: MessageReader<RewardPresentedEvent>, scene: Res<LotterySceneRes>) {
    for RewardPresentedEvent { reward } in rewards.read() {
        tracing::info!(
            "[reward] draw #{} (seed {}): ball {} ({}) worth {}",
            scene.completed_draws,
            scene.seed(),
            reward.ball_id,
            reward.texture,
            reward.value
        );
    }
}
