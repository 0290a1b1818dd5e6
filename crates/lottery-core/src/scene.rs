//! The lottery draw: mixing, releasing one ball and revealing its reward.
//!
//! [`LotteryScene`] owns the physics world, the visual nodes and the running
//! actions. Each [`LotteryScene::tick`] advances exactly one fixed physics
//! frame, so a draw is fully reproducible from its seed.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI};

use bevy::math::Vec2;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rapier2d::prelude::Vector;
use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionRunner, EasingType};
use crate::ball::{BallId, BallManager, ball_texture};
use crate::config::{ConfigError, SceneConfig};
use crate::layout::MachineLayout;
use crate::machine::Machine;
use crate::node::{NodeId, NodeKind, SceneGraph, SceneNode};
use crate::physics::{PHYSICS_DT, PhysicsWorld};

/// Colour of the strip drawn over the open hole.
pub const HOLE_COVER_TINT: [f32; 3] = [0.134, 0.092, 0.077];

/// Lock rotation once the door opens (a quarter turn counter-clockwise).
const LOCK_OPEN_ANGLE: f32 = -FRAC_PI_2;

/// Shake amplitude of the result ball (10 degrees).
const SHAKE_ANGLE: f32 = PI / 18.0;

/// How far the cap swings open (135 degrees counter-clockwise).
const CAP_OPEN_ANGLE: f32 = -PI * 135.0 / 180.0;

/// Error type for building a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The presented result of a draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub ball_id: BallId,
    pub variant: u32,
    pub value: u32,
    pub texture: String,
}

/// Stages of the reveal chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevealStage {
    Rise,
    Shake,
    Open,
    Coin,
}

/// Phase of the draw. Phases only move forward until a restart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DrawPhase {
    /// Balls rest in the box until the kick.
    #[default]
    Waiting,
    /// Balls bounce while their restitution decays.
    Mixing,
    /// The floor has a hole; waiting for the first ball to drop out.
    DoorOpen,
    /// The result ball is falling down the pipe.
    Settling,
    Rising,
    Shaking,
    Opening,
    CoinReveal,
    Presented { reward: Reward },
}

impl DrawPhase {
    /// Position of the phase in the draw.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Waiting => 0,
            Self::Mixing => 1,
            Self::DoorOpen => 2,
            Self::Settling => 3,
            Self::Rising => 4,
            Self::Shaking => 5,
            Self::Opening => 6,
            Self::CoinReveal => 7,
            Self::Presented { .. } => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Mixing => "mixing",
            Self::DoorOpen => "door_open",
            Self::Settling => "settling",
            Self::Rising => "rising",
            Self::Shaking => "shaking",
            Self::Opening => "opening",
            Self::CoinReveal => "coin_reveal",
            Self::Presented { .. } => "presented",
        }
    }

    pub fn is_presented(&self) -> bool {
        matches!(self, Self::Presented { .. })
    }
}

/// Notable moments of a draw, drained by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    BallsReleased,
    DoorOpened,
    BallSelected(BallId),
    BallSettled(BallId),
    StageStarted(RevealStage),
    RewardPresented(Reward),
}

/// Completion hooks attached to actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    Risen,
    Shaken,
    CapOpened,
    CoinPlaced,
}

#[derive(Debug, Clone)]
struct Animation {
    runner: ActionRunner,
    cue: Option<Cue>,
}

/// Reveal nodes created along the way.
#[derive(Debug, Clone, Default)]
struct RevealNodes {
    ball: Option<NodeId>,
    shell: Option<NodeId>,
    coin: Option<NodeId>,
    stars: Vec<NodeId>,
}

/// Tracks whether the result ball has stopped moving.
#[derive(Debug, Clone, Default)]
struct IdleWatch {
    last_position: Option<Vec2>,
    still_frames: u32,
}

/// A complete lottery draw.
#[derive(Debug)]
pub struct LotteryScene {
    config: SceneConfig,
    layout: MachineLayout,
    world: PhysicsWorld,
    machine: Machine,
    balls: BallManager,
    graph: SceneGraph,
    /// Node of each ball.
    ball_nodes: HashMap<BallId, NodeId>,
    lock_node: NodeId,
    hole_cover: Option<NodeId>,
    animations: Vec<Animation>,
    reveal: RevealNodes,
    star_rng: ChaCha8Rng,
    phase: DrawPhase,
    phase_time: f32,
    elapsed: f32,
    frame: u64,
    result: Option<BallId>,
    idle: IdleWatch,
    next_nudge: f32,
    events: Vec<SceneEvent>,
}

impl LotteryScene {
    /// Validates `config` and builds the machine with its balls at rest.
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SceneConfig) -> Self {
        let [width, height] = config.scene_size;
        let layout = MachineLayout::new(Vec2::new(width, height), config.ball_width);
        let mut world = PhysicsWorld::with_gravity(Vector::new(0.0, config.physics.gravity));
        let machine = Machine::build(&mut world, &layout, &config.physics);

        let mut graph = SceneGraph::new();
        graph.add(SceneNode::from_rect(
            NodeKind::BoxBackground,
            "box",
            layout.box_background(),
        ));
        graph.add(
            SceneNode::from_rect(NodeKind::BodyBackground, "body", layout.body_background())
                .with_z(0.7),
        );
        graph.add(SceneNode::from_rect(
            NodeKind::FooterBackground,
            "footer",
            layout.footer_background(),
        ));
        let lock_node =
            graph.add(SceneNode::from_rect(NodeKind::Lock, "lock", layout.lock_rect()).with_z(1.0));

        let mut balls = BallManager::new(config.rng_seed);
        let ids = balls.spawn_balls(
            &mut world,
            &layout,
            &config.physics,
            config.ball_count,
            config.ball_variants,
        );
        let ball_size = Vec2::splat(layout.ball_diameter);
        let ball_nodes = ids
            .iter()
            .filter_map(|&id| {
                let ball = balls.get_ball(id)?;
                let position = balls.position(&world, id)?;
                let node = graph.add(
                    SceneNode::new(NodeKind::Ball(id), ball.texture(), position, ball_size)
                        .with_z(0.5),
                );
                Some((id, node))
            })
            .collect();

        tracing::info!(
            "[scene] built {}x{} scene with {} balls (seed {})",
            width,
            height,
            config.ball_count,
            config.rng_seed
        );

        Self {
            star_rng: ChaCha8Rng::seed_from_u64(config.rng_seed.wrapping_add(1)),
            config,
            layout,
            world,
            machine,
            balls,
            graph,
            ball_nodes,
            lock_node,
            hole_cover: None,
            animations: Vec::new(),
            reveal: RevealNodes::default(),
            phase: DrawPhase::Waiting,
            phase_time: 0.0,
            elapsed: 0.0,
            frame: 0,
            result: None,
            idle: IdleWatch::default(),
            next_nudge: 0.0,
            events: Vec::new(),
        }
    }

    /// Rebuilds the scene from scratch with a new seed.
    pub fn restart(&mut self, seed: u64) {
        tracing::info!("[scene] restarting with seed {seed}");
        *self = Self::build(self.config.clone().with_seed(seed));
    }

    /// Kicks the balls immediately instead of waiting for the start delay.
    /// Returns false when the balls were already released.
    pub fn impulse_now(&mut self) -> bool {
        if self.phase != DrawPhase::Waiting {
            return false;
        }
        self.release_balls();
        true
    }

    /// Advances the draw by one fixed frame.
    pub fn tick(&mut self) {
        self.frame += 1;
        self.elapsed += PHYSICS_DT;
        self.phase_time += PHYSICS_DT;

        match self.phase {
            DrawPhase::Waiting => {
                if self.phase_time >= self.config.timings.impulse_delay {
                    self.release_balls();
                }
            }
            DrawPhase::Mixing => self.update_mixing(),
            DrawPhase::DoorOpen => self.update_door(),
            DrawPhase::Settling => self.update_settling(),
            _ => {}
        }

        self.world.step();
        self.sync_ball_nodes();
        self.run_animations();
        self.follow_coin();
    }

    /// Ticks until the reward is presented or `max_frames` have run.
    pub fn run_until_presented(&mut self, max_frames: u64) -> Option<Reward> {
        for _ in 0..max_frames {
            if self.phase.is_presented() {
                break;
            }
            self.tick();
        }
        self.reward().cloned()
    }

    /// Takes the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> &DrawPhase {
        &self.phase
    }

    pub fn reward(&self) -> Option<&Reward> {
        match &self.phase {
            DrawPhase::Presented { reward } => Some(reward),
            _ => None,
        }
    }

    /// The selected ball, once one has dropped out of the box.
    pub fn result_ball(&self) -> Option<BallId> {
        self.result
    }

    pub fn nodes(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn layout(&self) -> &MachineLayout {
        &self.layout
    }

    pub fn balls(&self) -> &BallManager {
        &self.balls
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Seconds since the scene was built.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Hash of the physics state, for determinism checks.
    pub fn state_hash(&self) -> u64 {
        self.world.compute_hash()
    }

    fn enter(&mut self, next: DrawPhase) {
        if next.rank() <= self.phase.rank() {
            tracing::error!(
                "[scene] refusing to move draw phase backwards: {} -> {}",
                self.phase.name(),
                next.name()
            );
            return;
        }
        tracing::info!(
            "[scene] {} -> {} at frame {}",
            self.phase.name(),
            next.name(),
            self.frame
        );
        self.phase = next;
        self.phase_time = 0.0;
    }

    fn release_balls(&mut self) {
        let kick = Vec2::new(self.layout.width(), -self.layout.box_height)
            * self.config.physics.impulse_scale;
        self.balls.kick_all(&mut self.world, kick);
        self.events.push(SceneEvent::BallsReleased);
        self.enter(DrawPhase::Mixing);
    }

    fn update_mixing(&mut self) {
        let progress = self.phase_time / self.config.timings.box_mix;
        if progress >= 1.0 {
            self.balls.set_restitution_all(&mut self.world, 0.0);
            self.open_door();
        } else {
            self.balls
                .set_restitution_all(&mut self.world, 1.0 - progress);
        }
    }

    fn open_door(&mut self) {
        let cover = self.machine.open_door(&mut self.world);
        self.hole_cover = Some(self.graph.add(
            SceneNode::from_rect(NodeKind::HoleCover, "", cover)
                .with_tint(HOLE_COVER_TINT)
                .with_z(1.0),
        ));
        self.animate(
            self.lock_node,
            Action::rotate_to(LOCK_OPEN_ANGLE, self.config.timings.lock_rotate),
            None,
        );
        self.next_nudge = self.config.physics.exit_timeout;
        self.events.push(SceneEvent::DoorOpened);
        self.enter(DrawPhase::DoorOpen);
    }

    fn update_door(&mut self) {
        if let Some(id) = self
            .balls
            .first_exited(&self.world, self.layout.box_height)
        {
            self.machine.close_door(&mut self.world);
            self.result = Some(id);
            self.idle = IdleWatch {
                last_position: self.balls.position(&self.world, id),
                still_frames: 0,
            };
            tracing::info!("[scene] ball {id} dropped out of the box");
            self.events.push(SceneEvent::BallSelected(id));
            self.enter(DrawPhase::Settling);
            return;
        }

        if self.phase_time >= self.next_nudge {
            self.next_nudge += self.config.physics.exit_timeout;
            self.nudge_toward_hole();
        }
    }

    /// Pushes the ball nearest the hole into it when nothing has dropped out.
    fn nudge_toward_hole(&mut self) {
        let hole = self.layout.hole_center() + Vec2::new(0.0, self.layout.ball_diameter);
        let Some(id) = self.balls.nearest_to(&self.world, hole) else {
            return;
        };
        let Some(position) = self.balls.position(&self.world, id) else {
            return;
        };
        let velocity = (hole - position).normalize_or_zero() * self.config.physics.nudge_speed;
        tracing::warn!(
            "[scene] no ball left the box after {:.1}s, nudging ball {id}",
            self.phase_time
        );
        self.balls.set_velocity(&mut self.world, id, velocity);
    }

    fn update_settling(&mut self) {
        let Some(id) = self.result else {
            return;
        };
        let tuning = &self.config.physics;
        let position = self.balls.position(&self.world, id);

        let moved = match (self.idle.last_position, position) {
            (Some(last), Some(now)) => last.distance(now),
            _ => f32::INFINITY,
        };
        if moved <= tuning.idle_epsilon {
            self.idle.still_frames += 1;
        } else {
            self.idle.still_frames = 0;
        }
        self.idle.last_position = position;

        let idle = self.idle.still_frames >= tuning.idle_frames
            || self.balls.is_sleeping(&self.world, id)
            || self.phase_time >= tuning.settle_timeout;
        if idle {
            tracing::debug!(
                "[scene] ball {id} settled after {:.2}s",
                self.phase_time
            );
            self.events.push(SceneEvent::BallSettled(id));
            self.start_rise(id);
        }
    }

    fn start_rise(&mut self, id: BallId) {
        let node_id = self.ball_nodes.get(&id).copied();
        let detached = self.balls.detach_body(&mut self.world, id);

        if let Some(node) = node_id.and_then(|id| self.graph.get_mut(id)) {
            if let Some((position, rotation)) = detached {
                node.position = position;
                node.rotation = rotation;
            }
            node.z = 1.0;
        }

        let duration = self.config.timings.move_ball;
        if let Some(node_id) = node_id {
            self.reveal.ball = Some(node_id);
            let rise = Action::group([
                Action::move_by(Vec2::new(0.0, -self.layout.reveal_rise()), duration)
                    .eased(EasingType::EaseInOut),
                Action::resize_to(self.layout.reveal_ball_size, duration)
                    .eased(EasingType::EaseInOut),
                Action::rotate_to(0.0, duration),
            ]);
            self.animate(node_id, rise, Some(Cue::Risen));
        }

        if let Some(node) = self.hole_cover.and_then(|id| self.graph.get_mut(id)) {
            node.alpha = 0.0;
        }
        let others: Vec<NodeId> = self
            .graph
            .iter()
            .map(|n| n.id)
            .filter(|&n| Some(n) != node_id)
            .collect();
        for other in others {
            self.animate(
                other,
                Action::sequence([Action::fade_out(duration), Action::Remove]),
                None,
            );
        }

        self.events.push(SceneEvent::StageStarted(RevealStage::Rise));
        self.enter(DrawPhase::Rising);
    }

    fn start_shake(&mut self) {
        let Some(ball) = self.reveal.ball else {
            return;
        };
        let step = self.config.timings.shake / 4.0;
        let wobble = Action::sequence([
            Action::rotate_to(-SHAKE_ANGLE, step),
            Action::rotate_to(0.0, step),
            Action::rotate_to(SHAKE_ANGLE, step),
            Action::rotate_to(0.0, step),
        ]);
        self.animate(ball, Action::repeat(wobble, 2), Some(Cue::Shaken));
        self.events.push(SceneEvent::StageStarted(RevealStage::Shake));
        self.enter(DrawPhase::Shaking);
    }

    fn start_open(&mut self) {
        let Some(ball_node) = self.reveal.ball else {
            return;
        };
        let Some(ball_y) = self.graph.get(ball_node).map(|n| n.position.y) else {
            return;
        };
        if let Some(node) = self.graph.get_mut(ball_node) {
            node.alpha = 0.0;
        }

        let layout = &self.layout;
        let mid_x = layout.mid().x;
        let reveal = layout.reveal_ball_size;
        let piece = layout.piece_size();

        let hinge = 1.0 - layout.curve_padding / layout.piece_height;
        let cap = self.graph.add(
            SceneNode::new(
                NodeKind::Cap,
                "ball_cap",
                Vec2::new(mid_x - reveal.x / 2.0, ball_y),
                piece,
            )
            .with_anchor(Vec2::new(0.0, hinge))
            .with_z(1.0),
        );

        let variant = self
            .result
            .and_then(|id| self.balls.get_ball(id))
            .map_or(1, |b| b.variant);
        let shell = self.graph.add(
            SceneNode::new(
                NodeKind::Shell,
                format!("body_{}", ball_texture(variant)),
                Vec2::new(mid_x, ball_y + (reveal.y - piece.y) / 2.0),
                piece,
            )
            .with_z(0.5),
        );
        self.reveal.shell = Some(shell);

        let duration = self.config.timings.open_ball;
        let swing = Action::sequence([
            Action::group([
                Action::rotate_by(CAP_OPEN_ANGLE, duration),
                Action::fade_out(duration),
            ]),
            Action::Remove,
        ]);
        self.animate(cap, swing, Some(Cue::CapOpened));
        self.events.push(SceneEvent::StageStarted(RevealStage::Open));
        self.enter(DrawPhase::Opening);
    }

    fn start_coin(&mut self) {
        let Some(ball_y) = self
            .reveal
            .ball
            .and_then(|id| self.graph.get(id))
            .map(|n| n.position.y)
        else {
            return;
        };
        let layout = &self.layout;
        let coin_size = layout.coin_size;
        let coin = self.graph.add(
            SceneNode::new(
                NodeKind::Coin,
                "coin",
                Vec2::new(
                    layout.mid().x,
                    ball_y - coin_size.y / 2.0 + layout.curve_padding,
                ),
                coin_size,
            )
            .with_z(1.0),
        );
        self.reveal.coin = Some(coin);

        let star_size = layout.star_size;
        self.reveal.stars = (0..4u8)
            .map(|i| {
                self.graph.add(
                    SceneNode::new(NodeKind::Star(i), "star", Vec2::ZERO, star_size).with_z(1.0),
                )
            })
            .collect();
        self.follow_coin();
        self.start_twinkle();

        let timings = &self.config.timings;
        let duration = timings.move_coin;
        if let Some(shell) = self.reveal.shell {
            self.animate(
                shell,
                Action::sequence([Action::fade_out(duration), Action::Remove]),
                None,
            );
        }
        let grow = Action::group([
            Action::resize_to(coin_size * self.config.coin_growth, duration)
                .eased(EasingType::EaseOut),
            Action::move_to(self.layout.coin_target(), duration).eased(EasingType::EaseOut),
        ]);
        self.animate(coin, grow, Some(Cue::CoinPlaced));

        self.events.push(SceneEvent::StageStarted(RevealStage::Coin));
        self.enter(DrawPhase::CoinReveal);
    }

    /// Stars fade out and back in forever, starting one after another in a
    /// shuffled order.
    fn start_twinkle(&mut self) {
        let mut order = self.reveal.stars.clone();
        order.shuffle(&mut self.star_rng);
        let timings = &self.config.timings;
        let half = timings.star_twinkle;
        let stagger = timings.star_stagger;
        for (i, star) in order.into_iter().enumerate() {
            let twinkle = Action::sequence([
                Action::wait(i as f32 * stagger),
                Action::repeat_forever(Action::sequence([
                    Action::fade_out(half),
                    Action::fade_to(1.0, half),
                ])),
            ]);
            self.animate(star, twinkle, None);
        }
    }

    fn present(&mut self) {
        let Some(id) = self.result else {
            return;
        };
        if let Some(ball_node) = self.reveal.ball.take() {
            self.graph.remove(ball_node);
        }
        let variant = self.balls.get_ball(id).map_or(1, |b| b.variant);
        let reward = Reward {
            ball_id: id,
            variant,
            value: self.config.coin_value(variant),
            texture: ball_texture(variant),
        };
        tracing::info!(
            "[scene] presenting ball {} ({}) worth {}",
            reward.ball_id,
            reward.texture,
            reward.value
        );
        self.events.push(SceneEvent::RewardPresented(reward.clone()));
        self.enter(DrawPhase::Presented { reward });
    }

    fn animate(&mut self, node: NodeId, action: Action, cue: Option<Cue>) {
        self.animations.push(Animation {
            runner: ActionRunner::new(node, action),
            cue,
        });
    }

    /// Copies physics transforms onto the ball nodes.
    fn sync_ball_nodes(&mut self) {
        for ball in self.balls.balls() {
            let Some(&node_id) = self.ball_nodes.get(&ball.id) else {
                continue;
            };
            let (Some(position), Some(rotation)) = (
                self.balls.position(&self.world, ball.id),
                self.balls.rotation(&self.world, ball.id),
            ) else {
                continue;
            };
            if let Some(node) = self.graph.get_mut(node_id) {
                node.position = position;
                node.rotation = rotation;
            }
        }
    }

    fn run_animations(&mut self) {
        let mut removed = Vec::new();
        let mut cues = Vec::new();

        for animation in &mut self.animations {
            let Some(node) = self.graph.get_mut(animation.runner.node()) else {
                continue;
            };
            let tick = animation.runner.tick(node, PHYSICS_DT);
            if tick.remove {
                removed.push(animation.runner.node());
            }
            if tick.finished {
                cues.extend(animation.cue);
            }
        }

        for node_id in removed {
            self.remove_node(node_id);
        }
        let graph = &self.graph;
        self.animations
            .retain(|a| !a.runner.is_finished() && graph.contains(a.runner.node()));

        for cue in cues {
            match cue {
                Cue::Risen => self.start_shake(),
                Cue::Shaken => self.start_open(),
                Cue::CapOpened => self.start_coin(),
                Cue::CoinPlaced => self.present(),
            }
        }
    }

    /// Removes a node; a ball node takes its physics body with it.
    fn remove_node(&mut self, node_id: NodeId) {
        let Some(node) = self.graph.remove(node_id) else {
            return;
        };
        match node.kind {
            NodeKind::Ball(id) => {
                self.balls.detach_body(&mut self.world, id);
            }
            NodeKind::HoleCover => self.hole_cover = None,
            _ => {}
        }
    }

    /// Keeps the stars on the corners of the coin.
    fn follow_coin(&mut self) {
        let Some(bounds) = self
            .reveal
            .coin
            .and_then(|id| self.graph.get(id))
            .map(SceneNode::bounds)
        else {
            return;
        };
        let s = self.layout.star_spacing;
        let (min, max) = (bounds.min(), bounds.max());
        let corners = [
            Vec2::new(min.x - s, min.y - s),
            Vec2::new(max.x + s, min.y + s),
            Vec2::new(min.x - s, max.y + s),
            Vec2::new(max.x + s, max.y - s),
        ];
        for (&star, corner) in self.reveal.stars.iter().zip(corners) {
            if let Some(node) = self.graph.get_mut(star) {
                node.position = corner;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Generous upper bound for a whole draw (60 seconds).
    const MAX_FRAMES: u64 = 3600;

    fn scene(seed: u64) -> LotteryScene {
        LotteryScene::new(SceneConfig::default().with_seed(seed)).unwrap()
    }

    fn run_collecting(scene: &mut LotteryScene) -> Vec<SceneEvent> {
        let mut events = Vec::new();
        for _ in 0..MAX_FRAMES {
            scene.tick();
            events.extend(scene.drain_events());
            if scene.phase().is_presented() {
                break;
            }
        }
        events
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = SceneConfig::default();
        config.ball_count = 0;
        assert!(matches!(
            LotteryScene::new(config),
            Err(SceneError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_initial_scene() {
        let scene = scene(1);
        assert_eq!(*scene.phase(), DrawPhase::Waiting);
        assert_eq!(scene.balls().len(), 10);
        assert!(scene.result_ball().is_none());
        // box, body, footer, lock + 10 balls
        assert_eq!(scene.nodes().len(), 14);
        assert!(!scene.machine().is_open());
    }

    #[test]
    fn test_waits_before_kick() {
        let mut scene = scene(1);
        for _ in 0..60 {
            scene.tick();
        }
        assert_eq!(*scene.phase(), DrawPhase::Waiting);
        for _ in 0..61 {
            scene.tick();
        }
        assert_eq!(*scene.phase(), DrawPhase::Mixing);
        assert_eq!(scene.drain_events(), vec![SceneEvent::BallsReleased]);
    }

    #[test]
    fn test_impulse_now_skips_wait() {
        let mut scene = scene(1);
        assert!(scene.impulse_now());
        assert_eq!(*scene.phase(), DrawPhase::Mixing);
        assert!(!scene.impulse_now());
    }

    #[test]
    fn test_restitution_decays_then_door_opens() {
        let mut scene = scene(2);
        scene.impulse_now();
        for _ in 0..60 {
            scene.tick();
        }
        let ball = &scene.balls().balls()[0];
        let restitution = scene
            .world()
            .restitution(ball.collider_handle.unwrap())
            .unwrap();
        assert!(restitution > 0.3 && restitution < 0.7, "got {restitution}");

        for _ in 0..70 {
            scene.tick();
        }
        assert!(scene.phase().rank() >= DrawPhase::DoorOpen.rank());
        assert!(scene.nodes().find(NodeKind::HoleCover).is_some());
    }

    #[test]
    fn test_full_draw_presents_reward() {
        let mut scene = scene(12345);
        let events = run_collecting(&mut scene);

        let reward = scene.reward().cloned().expect("draw should finish");
        let result = scene.result_ball().unwrap();
        assert_eq!(reward.ball_id, result);
        assert_eq!(reward.value, scene.config().coin_value(reward.variant));
        assert_eq!(reward.texture, format!("ball_{}", reward.variant));

        let expected = vec![
            SceneEvent::BallsReleased,
            SceneEvent::DoorOpened,
            SceneEvent::BallSelected(result),
            SceneEvent::BallSettled(result),
            SceneEvent::StageStarted(RevealStage::Rise),
            SceneEvent::StageStarted(RevealStage::Shake),
            SceneEvent::StageStarted(RevealStage::Open),
            SceneEvent::StageStarted(RevealStage::Coin),
            SceneEvent::RewardPresented(reward),
        ];
        assert_eq!(events, expected);
    }

    #[test]
    fn test_only_coin_and_stars_remain() {
        let mut scene = scene(7);
        scene.run_until_presented(MAX_FRAMES).unwrap();

        let kinds: Vec<_> = scene.nodes().iter().map(|n| n.kind).collect();
        assert_eq!(kinds.len(), 5, "left over: {kinds:?}");
        assert!(kinds.contains(&NodeKind::Coin));
        assert_eq!(
            kinds.iter().filter(|k| matches!(k, NodeKind::Star(_))).count(),
            4
        );
        let coin = scene.nodes().find(NodeKind::Coin).unwrap();
        let grown = scene.layout().coin_size * scene.config().coin_growth;
        assert!((coin.size - grown).length() < 1e-2);
        assert!((coin.position - scene.layout().coin_target()).length() < 1e-2);
    }

    #[test]
    fn test_result_ball_is_never_replaced() {
        let mut scene = scene(99);
        let mut selected = None;
        for _ in 0..MAX_FRAMES {
            scene.tick();
            if let Some(id) = scene.result_ball() {
                assert_eq!(*selected.get_or_insert(id), id);
            }
            if scene.phase().is_presented() {
                break;
            }
        }
        let selections = scene
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SceneEvent::BallSelected(_)))
            .count();
        assert!(selections <= 1);
        assert!(selected.is_some());
    }

    #[test]
    fn test_body_removed_before_reveal() {
        let mut scene = scene(5);
        for _ in 0..MAX_FRAMES {
            scene.tick();
            if scene.phase().rank() >= DrawPhase::Rising.rank() {
                let id = scene.result_ball().unwrap();
                assert!(!scene.balls().get_ball(id).unwrap().has_body());
            }
            if scene.phase().is_presented() {
                break;
            }
        }
        assert!(scene.phase().is_presented());
        // Every other ball faded out with its body.
        assert_eq!(scene.world().rigid_body_set.len(), 0);
    }

    #[test]
    fn test_phases_only_move_forward() {
        let mut scene = scene(31);
        let mut last = scene.phase().rank();
        for _ in 0..MAX_FRAMES {
            scene.tick();
            let rank = scene.phase().rank();
            assert!(rank >= last);
            last = rank;
        }
        assert!(scene.phase().is_presented());
        assert!(scene.reward().is_some());
    }

    #[test]
    fn test_same_seed_same_draw() {
        let mut a = scene(2024);
        let mut b = scene(2024);
        for _ in 0..600 {
            a.tick();
            b.tick();
            assert_eq!(a.state_hash(), b.state_hash());
        }
        assert_eq!(
            a.run_until_presented(MAX_FRAMES),
            b.run_until_presented(MAX_FRAMES)
        );
        assert_eq!(a.frame(), b.frame());
    }

    #[test]
    fn test_restart_rebuilds_scene() {
        let mut scene = scene(3);
        let first = scene.run_until_presented(MAX_FRAMES).unwrap();

        scene.restart(3);
        assert_eq!(*scene.phase(), DrawPhase::Waiting);
        assert_eq!(scene.frame(), 0);
        assert!(scene.drain_events().is_empty());
        assert_eq!(scene.run_until_presented(MAX_FRAMES), Some(first));
    }

    fn scene_with(config: SceneConfig) -> LotteryScene {
        LotteryScene::new(config).unwrap()
    }

    fn tick_until(scene: &mut LotteryScene, phase: &DrawPhase) {
        for _ in 0..MAX_FRAMES {
            if scene.phase() == phase {
                return;
            }
            scene.tick();
        }
        panic!("never reached {}", phase.name());
    }

    #[test]
    fn test_large_scene_with_wide_balls_builds() {
        let mut config = SceneConfig::default().with_seed(4);
        config.scene_size = [2000.0, 3000.0];
        config.ball_width = 390.0;
        let scene = scene_with(config);
        assert_eq!(scene.balls().len(), 10);
    }

    #[test]
    fn test_nudge_pushes_nearest_ball_into_hole() {
        let mut scene = scene(11);
        scene.impulse_now();
        tick_until(&mut scene, &DrawPhase::DoorOpen);

        let target = scene.layout().hole_center() + Vec2::new(0.0, scene.layout().ball_diameter);
        let id = scene.balls().nearest_to(scene.world(), target).unwrap();
        let position = scene.balls().position(scene.world(), id).unwrap();
        scene.nudge_toward_hole();

        let velocity = scene.balls().velocity(scene.world(), id).unwrap();
        let nudge_speed = scene.config().physics.nudge_speed;
        assert!((velocity.length() - nudge_speed).abs() < 1e-2);
        assert!(velocity.normalize().dot((target - position).normalize()) > 0.999);
    }

    #[test]
    fn test_stalled_door_nudges_every_exit_timeout() {
        let mut config = SceneConfig::default().with_seed(11);
        config.physics.exit_timeout = 0.05;
        let mut scene = scene_with(config);
        scene.impulse_now();
        tick_until(&mut scene, &DrawPhase::DoorOpen);
        assert!((scene.next_nudge - 0.05).abs() < 1e-6);

        // Four frames pass the first deadline but not the second.
        for _ in 0..4 {
            scene.tick();
        }
        assert_eq!(*scene.phase(), DrawPhase::DoorOpen);
        assert!((scene.next_nudge - 0.1).abs() < 1e-6);

        for _ in 0..3 {
            scene.tick();
        }
        if *scene.phase() == DrawPhase::DoorOpen {
            assert!((scene.next_nudge - 0.15).abs() < 1e-6);
        }
    }

    #[test]
    fn test_settle_timeout_forces_reveal() {
        let mut config = SceneConfig::default().with_seed(12345);
        config.physics.idle_epsilon = 0.0;
        config.physics.idle_frames = 100_000;
        config.physics.settle_timeout = 0.25;
        let mut scene = scene_with(config);

        let mut selected_at = None;
        let mut settled_at = None;
        for _ in 0..MAX_FRAMES {
            scene.tick();
            for event in scene.drain_events() {
                match event {
                    SceneEvent::BallSelected(_) => selected_at = Some(scene.frame()),
                    SceneEvent::BallSettled(_) => settled_at = Some(scene.frame()),
                    _ => {}
                }
            }
            if settled_at.is_some() {
                break;
            }
        }
        let waited = settled_at.unwrap() - selected_at.unwrap();
        assert!((15..=16).contains(&waited), "settled after {waited} frames");
        assert_eq!(*scene.phase(), DrawPhase::Rising);
    }

    #[test]
    fn test_sleeping_ball_counts_as_settled() {
        let mut config = SceneConfig::default().with_seed(12345);
        config.physics.idle_frames = 100_000;
        config.physics.settle_timeout = 30.0;
        let mut scene = scene_with(config);
        tick_until(&mut scene, &DrawPhase::Settling);

        let id = scene.result_ball().unwrap();
        let handle = scene.balls().get_ball(id).unwrap().body_handle.unwrap();
        scene.world.get_rigid_body_mut(handle).unwrap().sleep();
        scene.drain_events();
        scene.tick();

        assert_eq!(scene.drain_events()[0], SceneEvent::BallSettled(id));
        assert_eq!(*scene.phase(), DrawPhase::Rising);
    }

    #[test]
    fn test_ball_nodes_follow_their_balls() {
        let mut scene = scene(6);
        scene.impulse_now();
        for _ in 0..30 {
            scene.tick();
        }
        for ball in scene.balls().balls() {
            let node = scene.nodes().get(scene.ball_nodes[&ball.id]).unwrap();
            assert_eq!(node.kind, NodeKind::Ball(ball.id));
            assert_eq!(Some(node.position), scene.balls().position(scene.world(), ball.id));
        }
    }

    #[test]
    fn test_phase_cannot_move_backwards() {
        let mut scene = scene(1);
        scene.impulse_now();
        scene.enter(DrawPhase::Waiting);
        assert_eq!(*scene.phase(), DrawPhase::Mixing);
    }

    #[test]
    fn test_stars_surround_coin() {
        let mut scene = scene(8);
        for _ in 0..MAX_FRAMES {
            scene.tick();
            if *scene.phase() == DrawPhase::CoinReveal {
                break;
            }
        }
        scene.tick();
        let coin = scene.nodes().find(NodeKind::Coin).unwrap().bounds();
        let star0 = scene.nodes().find(NodeKind::Star(0)).unwrap();
        let star3 = scene.nodes().find(NodeKind::Star(3)).unwrap();
        assert!(star0.position.x < coin.min().x && star0.position.y < coin.min().y);
        assert!(star3.position.x > coin.max().x && star3.position.y < coin.max().y);
    }
}
