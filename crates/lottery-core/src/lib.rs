//! Lottery Ball Machine Core Library
//!
//! A physics-driven lottery draw: balls are mixed in a box using `Rapier2D`,
//! one drops out through a door, and a staged reveal presents its reward.
//!
//! This library provides two layers:
//! - Simulation: a deterministic, fixed-step [`LotteryScene`] with no ECS dependency
//! - Bevy: plugins that drive the scene from `FixedUpdate` and render its nodes

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod action;
pub mod ball;
pub mod config;
pub mod layout;
pub mod machine;
pub mod node;
pub mod physics;
pub mod scene;

// Bevy integration
pub mod bevy;

pub use action::{Action, ActionRunner, EasingType};
pub use ball::{Ball, BallId, BallManager, BallState};
pub use config::{ConfigError, PhysicsTuning, SceneConfig, StageTimings};
pub use layout::{EdgeRole, EdgeSpec, MachineLayout, Rect};
pub use machine::Machine;
pub use node::{NodeId, NodeKind, SceneGraph, SceneNode};
pub use physics::{PHYSICS_DT, PhysicsWorld, default_gravity};
pub use scene::{DrawPhase, LotteryScene, RevealStage, Reward, SceneError, SceneEvent};
