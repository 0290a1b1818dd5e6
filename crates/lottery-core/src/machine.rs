//! Static colliders of the ball machine and the door that releases a ball.

use rapier2d::prelude::*;

use crate::config::PhysicsTuning;
use crate::layout::{BOTTOM_EDGE_INDEX, EdgeRole, EdgeSpec, MachineLayout, Rect};
use crate::physics::PhysicsWorld;

/// Handle of one static edge inside the physics world.
#[derive(Debug, Clone, Copy)]
pub struct EdgeHandle {
    pub role: EdgeRole,
    pub collider: ColliderHandle,
}

/// The box, pipe and door colliders of one machine.
#[derive(Debug, Clone)]
pub struct Machine {
    box_edges: Vec<EdgeHandle>,
    pipe_edges: [EdgeHandle; 2],
    footer: EdgeHandle,
    door_halves: [EdgeHandle; 2],
    hole_cover: Rect,
    open: bool,
}

fn insert_edge(world: &mut PhysicsWorld, spec: &EdgeSpec, restitution: f32) -> EdgeHandle {
    let rect = spec.rect;
    let collider = ColliderBuilder::cuboid(rect.size.x / 2.0, rect.size.y / 2.0)
        .translation(Vector::new(rect.center.x, rect.center.y))
        .rotation(rect.rotation)
        .restitution(restitution)
        .friction(0.0)
        .build();
    EdgeHandle {
        role: spec.role,
        collider: world.add_static_collider(collider),
    }
}

impl Machine {
    /// Inserts every static edge of `layout` into `world`.
    ///
    /// The door halves are created disabled; the full-width floor is active
    /// until [`Machine::open_door`] is called.
    pub fn build(world: &mut PhysicsWorld, layout: &MachineLayout, tuning: &PhysicsTuning) -> Self {
        let box_edges = layout
            .box_edges()
            .iter()
            .map(|spec| insert_edge(world, spec, tuning.wall_restitution))
            .collect();

        let pipe_edges = layout
            .pipe_edges()
            .map(|spec| insert_edge(world, &spec, tuning.pipe_restitution));
        let footer = insert_edge(world, &layout.footer_floor(), 0.0);

        let door_halves = layout
            .door_halves()
            .map(|spec| insert_edge(world, &spec, tuning.wall_restitution));
        for half in &door_halves {
            world.set_collider_enabled(half.collider, false);
        }

        tracing::debug!(
            "[machine] built {} box edges, pipe, footer and door",
            layout.box_edges().len()
        );

        Self {
            box_edges,
            pipe_edges,
            footer,
            door_halves,
            hole_cover: layout.hole_cover(),
            open: false,
        }
    }

    /// Replaces the full floor with the two door halves.
    /// Returns the rect that should be covered while the hole is open.
    pub fn open_door(&mut self, world: &mut PhysicsWorld) -> Rect {
        if let Some(bottom) = self.box_edges.get(BOTTOM_EDGE_INDEX) {
            world.set_collider_enabled(bottom.collider, false);
        }
        for half in &self.door_halves {
            world.set_collider_enabled(half.collider, true);
        }
        self.open = true;
        self.hole_cover
    }

    /// Restores the full floor with no bounce and disables the door halves.
    pub fn close_door(&mut self, world: &mut PhysicsWorld) {
        if let Some(bottom) = self.box_edges.get(BOTTOM_EDGE_INDEX) {
            world.set_restitution(bottom.collider, 0.0);
            world.set_collider_enabled(bottom.collider, true);
        }
        for half in &self.door_halves {
            world.set_collider_enabled(half.collider, false);
        }
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn box_edges(&self) -> &[EdgeHandle] {
        &self.box_edges
    }

    pub fn pipe_edges(&self) -> &[EdgeHandle; 2] {
        &self.pipe_edges
    }

    pub fn footer(&self) -> EdgeHandle {
        self.footer
    }

    pub fn door_halves(&self) -> &[EdgeHandle; 2] {
        &self.door_halves
    }

    /// Full-width floor collider.
    pub fn bottom_edge(&self) -> Option<ColliderHandle> {
        self.box_edges.get(BOTTOM_EDGE_INDEX).map(|edge| edge.collider)
    }
}
