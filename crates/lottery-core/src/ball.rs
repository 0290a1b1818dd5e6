//! Lottery balls with deterministic spawning.

use bevy::math::Vec2;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PhysicsTuning;
use crate::layout::MachineLayout;
use crate::physics::PhysicsWorld;

/// Unique identifier for a ball, in spawn order.
pub type BallId = u32;

/// A ball inside the machine.
#[derive(Debug, Clone)]
pub struct Ball {
    pub id: BallId,
    /// Texture variant, `1..=ball_variants`.
    pub variant: u32,
    pub radius: f32,
    /// `None` once the body has been detached for the reveal.
    pub body_handle: Option<RigidBodyHandle>,
    pub collider_handle: Option<ColliderHandle>,
}

impl Ball {
    /// Texture name of this ball's variant.
    pub fn texture(&self) -> String {
        ball_texture(self.variant)
    }

    pub fn has_body(&self) -> bool {
        self.body_handle.is_some()
    }
}

/// Texture name for a ball variant.
pub fn ball_texture(variant: u32) -> String {
    format!("ball_{variant}")
}

/// Snapshot of a ball suitable for logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub id: BallId,
    pub variant: u32,
    pub position: [f32; 2],
    pub rotation: f32,
}

/// Owns the balls of one draw and the RNG that places them.
#[derive(Debug, Clone)]
pub struct BallManager {
    balls: Vec<Ball>,
    next_id: BallId,
    rng: ChaCha8Rng,
    seed: u64,
}

impl BallManager {
    /// Creates a new ball manager with the given RNG seed.
    pub fn new(seed: u64) -> Self {
        Self {
            balls: Vec::new(),
            next_id: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Spawns `count` balls on the spawn band of `layout`, each with a random
    /// horizontal position and variant. Returns the new ids in spawn order.
    pub fn spawn_balls(
        &mut self,
        world: &mut PhysicsWorld,
        layout: &MachineLayout,
        tuning: &PhysicsTuning,
        count: u32,
        variants: u32,
    ) -> Vec<BallId> {
        let (min_x, max_x) = layout.spawn_x_range();
        let y = layout.spawn_y();
        let radius = layout.ball_radius();

        (0..count)
            .map(|_| {
                let x = self.rng.random_range(min_x..max_x);
                let variant = self.rng.random_range(1..=variants.max(1));
                self.spawn_ball_at(world, tuning, Vec2::new(x, y), radius, variant)
            })
            .collect()
    }

    /// Spawns a ball at a specific position.
    pub fn spawn_ball_at(
        &mut self,
        world: &mut PhysicsWorld,
        tuning: &PhysicsTuning,
        position: Vec2,
        radius: f32,
        variant: u32,
    ) -> BallId {
        let id = self.next_id;
        self.next_id += 1;

        let rigid_body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(position.x, position.y))
            .linear_damping(tuning.ball_damping)
            .angular_damping(tuning.ball_damping)
            .ccd_enabled(true)
            .build();
        let body_handle = world.add_rigid_body(rigid_body);

        // Min keeps the bounce controlled by the ball so the mix can decay it.
        let collider = ColliderBuilder::ball(radius)
            .restitution(1.0)
            .restitution_combine_rule(CoefficientCombineRule::Min)
            .friction(tuning.ball_friction)
            .density(1.0)
            .build();
        let collider_handle = world.add_collider(collider, body_handle);

        self.balls.push(Ball {
            id,
            variant,
            radius,
            body_handle: Some(body_handle),
            collider_handle: Some(collider_handle),
        });
        id
    }

    /// Adds `velocity` to every ball that still has a body.
    pub fn kick_all(&self, world: &mut PhysicsWorld, velocity: Vec2) {
        for ball in &self.balls {
            let Some(handle) = ball.body_handle else {
                continue;
            };
            if let Some(body) = world.get_rigid_body_mut(handle) {
                let current = body.linvel();
                body.set_linvel(
                    Vector::new(current.x + velocity.x, current.y + velocity.y),
                    true,
                );
            }
        }
    }

    /// Replaces the linear velocity of one ball.
    pub fn set_velocity(&self, world: &mut PhysicsWorld, id: BallId, velocity: Vec2) {
        let Some(handle) = self.get_ball(id).and_then(|ball| ball.body_handle) else {
            return;
        };
        if let Some(body) = world.get_rigid_body_mut(handle) {
            body.set_linvel(Vector::new(velocity.x, velocity.y), true);
        }
    }

    /// Sets the restitution of every ball collider.
    pub fn set_restitution_all(&self, world: &mut PhysicsWorld, restitution: f32) {
        for collider in self.balls.iter().filter_map(|ball| ball.collider_handle) {
            world.set_restitution(collider, restitution);
        }
    }

    /// First ball, in spawn order, whose top edge has dropped below `floor_y`.
    pub fn first_exited(&self, world: &PhysicsWorld, floor_y: f32) -> Option<BallId> {
        self.balls
            .iter()
            .filter(|ball| ball.has_body())
            .find(|ball| {
                self.position(world, ball.id)
                    .is_some_and(|pos| pos.y - ball.radius > floor_y)
            })
            .map(|ball| ball.id)
    }

    /// Ball with a body closest to `point`.
    pub fn nearest_to(&self, world: &PhysicsWorld, point: Vec2) -> Option<BallId> {
        self.balls
            .iter()
            .filter_map(|ball| {
                self.position(world, ball.id)
                    .map(|pos| (ball.id, pos.distance_squared(point)))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Removes the physics body of a ball, keeping its bookkeeping entry.
    /// Returns the last known position and rotation.
    pub fn detach_body(&mut self, world: &mut PhysicsWorld, id: BallId) -> Option<(Vec2, f32)> {
        let position = self.position(world, id)?;
        let rotation = self.rotation(world, id).unwrap_or(0.0);
        let ball = self.balls.iter_mut().find(|b| b.id == id)?;
        if let Some(handle) = ball.body_handle.take() {
            world.remove_rigid_body(handle);
        }
        ball.collider_handle = None;
        Some((position, rotation))
    }

    pub fn get_ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    fn body<'w>(&self, world: &'w PhysicsWorld, id: BallId) -> Option<&'w RigidBody> {
        self.get_ball(id)
            .and_then(|ball| ball.body_handle)
            .and_then(|handle| world.get_rigid_body(handle))
    }

    /// Position of a ball with a body.
    pub fn position(&self, world: &PhysicsWorld, id: BallId) -> Option<Vec2> {
        self.body(world, id).map(|body| {
            let pos = body.translation();
            Vec2::new(pos.x, pos.y)
        })
    }

    /// Rotation of a ball with a body, clockwise radians.
    pub fn rotation(&self, world: &PhysicsWorld, id: BallId) -> Option<f32> {
        self.body(world, id).map(|body| body.rotation().angle())
    }

    pub fn velocity(&self, world: &PhysicsWorld, id: BallId) -> Option<Vec2> {
        self.body(world, id).map(|body| {
            let vel = body.linvel();
            Vec2::new(vel.x, vel.y)
        })
    }

    pub fn is_sleeping(&self, world: &PhysicsWorld, id: BallId) -> bool {
        self.body(world, id).is_some_and(|body| body.is_sleeping())
    }

    /// Snapshot of every ball that still has a body.
    pub fn states(&self, world: &PhysicsWorld) -> Vec<BallState> {
        self.balls
            .iter()
            .filter_map(|ball| {
                let pos = self.position(world, ball.id)?;
                Some(BallState {
                    id: ball.id,
                    variant: ball.variant,
                    position: [pos.x, pos.y],
                    rotation: self.rotation(world, ball.id).unwrap_or(0.0),
                })
            })
            .collect()
    }

    /// Removes all balls and re-seeds the RNG.
    pub fn clear(&mut self, world: &mut PhysicsWorld) {
        for ball in self.balls.drain(..) {
            if let Some(handle) = ball.body_handle {
                world.remove_rigid_body(handle);
            }
        }
        self.next_id = 0;
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }
}
