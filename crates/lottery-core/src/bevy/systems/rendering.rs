//! Rendering systems for the lottery scene.
//!
//! Uses Bevy's Gizmos API for debug-style rendering of the scene nodes.
//! Every texture name maps to a flat palette colour.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::bevy::LotterySceneRes;
use crate::node::SceneNode;

/// Colours used to draw node textures.
#[derive(Resource, Debug, Clone)]
pub struct NodePalette {
    colors: HashMap<String, [f32; 3]>,
    /// Colour for textures not in the palette.
    pub fallback: [f32; 3],
}

impl Default for NodePalette {
    fn default() -> Self {
        let colors = [
            ("box", [0.55, 0.36, 0.24]),
            ("body", [0.75, 0.22, 0.17]),
            ("footer", [0.45, 0.15, 0.12]),
            ("lock", [0.95, 0.77, 0.2]),
            ("ball_1", [0.9, 0.25, 0.25]),
            ("ball_2", [0.25, 0.5, 0.95]),
            ("ball_3", [0.3, 0.8, 0.35]),
            ("ball_4", [0.95, 0.85, 0.25]),
            ("ball_cap", [0.95, 0.95, 0.95]),
            ("coin", [1.0, 0.8, 0.1]),
            ("star", [1.0, 1.0, 0.7]),
        ]
        .into_iter()
        .map(|(name, color)| (name.to_string(), color))
        .collect();
        Self {
            colors,
            fallback: [0.8, 0.8, 0.8],
        }
    }
}

impl NodePalette {
    /// Colour of a node, honouring its tint and alpha.
    /// Shell textures (`body_ball_N`) reuse the colour of their ball.
    pub fn color_for(&self, node: &SceneNode) -> Color {
        let [r, g, b] = node.tint.unwrap_or_else(|| {
            let name = node.texture.strip_prefix("body_").filter(|n| n.starts_with("ball_"));
            self.colors
                .get(name.unwrap_or(&node.texture))
                .copied()
                .unwrap_or(self.fallback)
        });
        Color::srgba(r, g, b, node.alpha)
    }

    pub fn set(&mut self, texture: impl Into<String>, color: [f32; 3]) {
        self.colors.insert(texture.into(), color);
    }
}

/// Balls and the coin are drawn as ellipses, everything else as rectangles.
fn is_round(texture: &str) -> bool {
    texture == "coin" || (texture.starts_with("ball_") && texture != "ball_cap")
}

/// Converts scene pixels (`y` down, origin top-left) to Bevy world space.
pub fn scene_to_world(point: Vec2, scene_size: Vec2) -> Vec2 {
    Vec2::new(point.x - scene_size.x / 2.0, scene_size.y / 2.0 - point.y)
}

/// System to draw every visible scene node.
pub fn render_scene_nodes(
    mut gizmos: Gizmos,
    scene: Res<LotterySceneRes>,
    palette: Res<NodePalette>,
) {
    let scene_size = scene.scene.layout().scene_size;

    for node in scene.scene.nodes().draw_order() {
        if node.alpha <= 0.0 {
            continue;
        }
        let color = palette.color_for(node);
        let center = scene_to_world(node.center(), scene_size);
        let rotation = Rot2::radians(-node.rotation);
        let isometry = Isometry2d::new(center, rotation);

        if is_round(&node.texture) {
            gizmos.ellipse_2d(isometry, node.size / 2.0, color);
            // Spoke so the spin of a ball is visible.
            gizmos.line_2d(center, center + rotation * Vec2::X * (node.size.x / 2.0), color);
        } else {
            gizmos.rect_2d(isometry, node.size, color);
        }
    }
}
