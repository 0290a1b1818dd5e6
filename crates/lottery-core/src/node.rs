//! Visual nodes of the scene.
//!
//! Nodes are plain data: the draw logic moves them around through actions and
//! the renderer reads them back every frame. Positions are scene pixels,
//! `y` down, and `anchor` is the fraction of the node size (from the top-left
//! corner) that sits on `position`.

use bevy::math::Vec2;

use crate::ball::BallId;
use crate::layout::Rect;

/// Unique identifier for a node within one scene.
pub type NodeId = u32;

/// What a node depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    BoxBackground,
    BodyBackground,
    FooterBackground,
    Lock,
    HoleCover,
    Ball(BallId),
    /// Upper half of the result ball, hinged at its left edge.
    Cap,
    /// Lower half of the result ball.
    Shell,
    Coin,
    Star(u8),
}

/// A drawable node.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub texture: String,
    pub position: Vec2,
    pub size: Vec2,
    pub anchor: Vec2,
    /// Clockwise rotation in radians around the anchor.
    pub rotation: f32,
    pub alpha: f32,
    pub z: f32,
    /// Flat colour for untextured nodes (RGB, 0..1).
    pub tint: Option<[f32; 3]>,
}

impl SceneNode {
    pub fn new(kind: NodeKind, texture: impl Into<String>, position: Vec2, size: Vec2) -> Self {
        Self {
            id: 0,
            kind,
            texture: texture.into(),
            position,
            size,
            anchor: Vec2::splat(0.5),
            rotation: 0.0,
            alpha: 1.0,
            z: 0.0,
            tint: None,
        }
    }

    /// Node covering `rect`, anchored at its centre.
    pub fn from_rect(kind: NodeKind, texture: impl Into<String>, rect: Rect) -> Self {
        Self::new(kind, texture, rect.center, rect.size).with_rotation(rect.rotation)
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: Vec2) -> Self {
        self.anchor = anchor;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    #[must_use]
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    #[must_use]
    pub fn with_tint(mut self, tint: [f32; 3]) -> Self {
        self.tint = Some(tint);
        self
    }

    /// Centre of the node's rectangle after applying the anchor and rotation.
    pub fn center(&self) -> Vec2 {
        let local = (Vec2::splat(0.5) - self.anchor) * self.size;
        self.position + Vec2::from_angle(self.rotation).rotate(local)
    }

    /// Axis-aligned bounds, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.center(), self.size)
    }
}

/// Flat list of nodes with stable ids.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    next_id: NodeId,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its assigned id.
    pub fn add(&mut self, mut node: SceneNode) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        node.id = id;
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        Some(self.nodes.remove(index))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn find(&self, kind: NodeKind) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter()
    }

    /// Nodes in draw order (ascending z, then insertion order).
    pub fn draw_order(&self) -> Vec<&SceneNode> {
        let mut nodes: Vec<&SceneNode> = self.nodes.iter().collect();
        nodes.sort_by(|a, b| a.z.total_cmp(&b.z));
        nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
