//! Bevy integration for the lottery scene.
//!
//! The simulation lives in a [`LotterySceneRes`] resource and is advanced once
//! per `FixedUpdate`. Scene events are republished as Bevy messages, external
//! callers talk to the app through the shared [`CommandQueue`], and the
//! unified plugin draws every scene node with gizmos.

pub mod components;
pub mod events;
pub mod plugin;
pub mod rapier_plugin;
pub mod resources;
pub mod systems;

#[cfg(test)]
pub(crate) mod test_utils;

pub use components::*;
pub use events::*;
pub use plugin::{LotteryHeadlessPlugin, LotteryUnifiedPlugin};
pub use rapier_plugin::{LotteryPhysicsPlugin, SceneSet};
pub use resources::*;
