//! Systems for the lottery scene.
//!
//! Organized by functionality:
//! - camera: Fit-to-window camera with smoothing
//! - command: Command queue processing
//! - input: Keyboard shortcuts for the viewer
//! - rendering: Gizmo rendering of scene nodes
//! - scene: Scene event publishing and reward logging

pub mod camera;
pub mod command;
pub mod input;
pub mod rendering;
pub mod scene;

pub use camera::*;
pub use command::*;
pub use input::*;
pub use rendering::*;
pub use scene::*;
