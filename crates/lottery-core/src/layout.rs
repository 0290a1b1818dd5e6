//! Machine geometry derived from the scene size.
//!
//! All ratios come from an 800-pixel-wide reference layout; every length is
//! scaled by `unit = scene_width / 800`. Coordinates are scene pixels with
//! the origin at the top-left corner and `y` growing downward.

use std::f32::consts::FRAC_PI_4;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// Width of the reference layout all ratios are expressed in.
pub const DESIGN_WIDTH: f32 = 800.0;

/// Index of the full-width bottom edge inside [`MachineLayout::box_edges`].
pub const BOTTOM_EDGE_INDEX: usize = 3;

/// An oriented rectangle (centre, full size, clockwise rotation in radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
    pub rotation: f32,
}

impl Rect {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            size,
            rotation: 0.0,
        }
    }

    #[must_use]
    pub fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.size / 2.0
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.size / 2.0
    }
}

/// What a static collider is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeRole {
    BoxLeft,
    BoxTop,
    BoxRight,
    BoxBottom,
    CornerTopLeft,
    CornerTopRight,
    CornerBottomLeft,
    CornerBottomRight,
    PipeLeft,
    PipeRight,
    FooterFloor,
    DoorLeft,
    DoorRight,
}

/// A static collider description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSpec {
    pub role: EdgeRole,
    pub rect: Rect,
}

impl EdgeSpec {
    fn new(role: EdgeRole, rect: Rect) -> Self {
        Self { role, rect }
    }
}

/// Geometry of the ball machine for one scene size.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineLayout {
    pub scene_size: Vec2,
    /// Scale from design units to scene pixels.
    pub unit: f32,
    pub box_height: f32,
    /// Decorative band above the box's top wall.
    pub dummy_top_height: f32,
    pub edge_weight: f32,
    pub body_height: f32,
    pub footer_height: f32,
    pub hole_width: f32,
    pub ball_diameter: f32,
    pub lock_size: Vec2,
    /// Size of the result ball once it has risen to the centre.
    pub reveal_ball_size: Vec2,
    /// Height of each shell half when the ball cracks open.
    pub piece_height: f32,
    pub curve_padding: f32,
    pub coin_size: Vec2,
    pub star_size: Vec2,
    pub star_spacing: f32,
    pub corner_size: Vec2,
    /// Horizontal inset of the corner deflectors.
    pub corner_curve: f32,
}

impl MachineLayout {
    /// Computes the layout for `scene_size` with a ball `ball_width` design units wide.
    pub fn new(scene_size: Vec2, ball_width: f32) -> Self {
        let w = scene_size.x;
        let unit = w / DESIGN_WIDTH;
        let edge_weight = 16.0 * unit;
        Self {
            scene_size,
            unit,
            box_height: w / (DESIGN_WIDTH / 790.0),
            dummy_top_height: w / (DESIGN_WIDTH / 141.0),
            edge_weight,
            body_height: w / (DESIGN_WIDTH / 225.0),
            footer_height: w / (DESIGN_WIDTH / 247.0),
            hole_width: (ball_width + 5.0) * unit,
            ball_diameter: ball_width * unit,
            lock_size: Vec2::new(158.0, 140.0) * unit,
            reveal_ball_size: Vec2::new(400.0, 395.0) * unit,
            piece_height: 230.0 * unit,
            curve_padding: 32.0 * unit,
            coin_size: Vec2::new(200.0, 210.0) * unit,
            star_size: Vec2::new(40.0, 65.0) * unit,
            star_spacing: 8.0 * unit,
            corner_size: Vec2::new(190.0 * unit, edge_weight),
            corner_curve: 145.0 * unit,
        }
    }

    pub fn width(&self) -> f32 {
        self.scene_size.x
    }

    pub fn height(&self) -> f32 {
        self.scene_size.y
    }

    pub fn mid(&self) -> Vec2 {
        self.scene_size / 2.0
    }

    pub fn ball_radius(&self) -> f32 {
        self.ball_diameter / 2.0
    }

    /// Centre of the opening in the box floor.
    pub fn hole_center(&self) -> Vec2 {
        Vec2::new(self.mid().x, self.box_height - self.edge_weight / 2.0)
    }

    pub fn box_background(&self) -> Rect {
        Rect::new(
            Vec2::new(self.mid().x, self.box_height / 2.0),
            Vec2::new(self.width(), self.box_height),
        )
    }

    pub fn body_background(&self) -> Rect {
        Rect::new(
            Vec2::new(self.mid().x, self.box_height + self.body_height / 2.0),
            Vec2::new(self.width(), self.body_height),
        )
    }

    pub fn footer_background(&self) -> Rect {
        Rect::new(
            Vec2::new(
                self.mid().x,
                self.box_height + self.body_height + self.footer_height / 2.0,
            ),
            Vec2::new(self.width(), self.footer_height),
        )
    }

    /// Lock icon sitting on the lower edge of the body panel.
    pub fn lock_rect(&self) -> Rect {
        let bottom_body = self.box_height + self.body_height;
        let padding_bottom = self.edge_weight + 4.0 * self.unit;
        Rect::new(
            Vec2::new(
                self.mid().x,
                bottom_body - padding_bottom - self.lock_size.y / 2.0,
            ),
            self.lock_size,
        )
    }

    /// Walls of the mixing box. The full-width floor sits at [`BOTTOM_EDGE_INDEX`].
    pub fn box_edges(&self) -> Vec<EdgeSpec> {
        let w = self.width();
        let ew = self.edge_weight;
        let edge_height = self.box_height - self.dummy_top_height;
        let side = Vec2::new(ew, edge_height);
        let top_bottom = Vec2::new(w, ew);
        let side_y = self.dummy_top_height + edge_height / 2.0;

        let cw = self.corner_size.x;
        let top_corner_y = self.dummy_top_height + (cw / 2.0 - 40.0 * self.unit) + ew;
        let bottom_corner_y = self.box_height - ew / 2.0 - (cw / 2.0 - 30.0 * self.unit);
        let left_x = self.corner_curve / 2.0;
        let right_x = w - self.corner_curve / 2.0;

        vec![
            EdgeSpec::new(EdgeRole::BoxLeft, Rect::new(Vec2::new(ew / 2.0, side_y), side)),
            EdgeSpec::new(
                EdgeRole::BoxTop,
                Rect::new(
                    Vec2::new(self.mid().x, self.dummy_top_height + ew / 2.0),
                    top_bottom,
                ),
            ),
            EdgeSpec::new(
                EdgeRole::BoxRight,
                Rect::new(Vec2::new(w - ew / 2.0, side_y), side),
            ),
            EdgeSpec::new(
                EdgeRole::BoxBottom,
                Rect::new(
                    Vec2::new(self.mid().x, self.box_height - ew / 2.0),
                    top_bottom,
                ),
            ),
            EdgeSpec::new(
                EdgeRole::CornerTopLeft,
                Rect::new(Vec2::new(left_x, top_corner_y), self.corner_size).rotated(-FRAC_PI_4),
            ),
            EdgeSpec::new(
                EdgeRole::CornerTopRight,
                Rect::new(Vec2::new(right_x, top_corner_y), self.corner_size).rotated(FRAC_PI_4),
            ),
            EdgeSpec::new(
                EdgeRole::CornerBottomLeft,
                Rect::new(Vec2::new(left_x, bottom_corner_y), self.corner_size)
                    .rotated(FRAC_PI_4),
            ),
            EdgeSpec::new(
                EdgeRole::CornerBottomRight,
                Rect::new(Vec2::new(right_x, bottom_corner_y), self.corner_size)
                    .rotated(-FRAC_PI_4),
            ),
        ]
    }

    /// Two walls forming the pipe the released ball drops through.
    pub fn pipe_edges(&self) -> [EdgeSpec; 2] {
        let ew = self.edge_weight;
        let height = self.body_height + self.footer_height;
        let size = Vec2::new(ew, height);
        let y = self.box_height + height / 2.0;
        let offset = self.hole_width / 2.0 + ew / 2.0;
        [
            EdgeSpec::new(
                EdgeRole::PipeLeft,
                Rect::new(Vec2::new(self.mid().x - offset, y), size),
            ),
            EdgeSpec::new(
                EdgeRole::PipeRight,
                Rect::new(Vec2::new(self.mid().x + offset, y), size),
            ),
        ]
    }

    /// Floor at the bottom of the pipe where the released ball comes to rest.
    pub fn footer_floor(&self) -> EdgeSpec {
        let ew = self.edge_weight;
        EdgeSpec::new(
            EdgeRole::FooterFloor,
            Rect::new(
                Vec2::new(self.mid().x, self.height() - ew / 2.0),
                Vec2::new(self.hole_width, ew),
            ),
        )
    }

    /// Floor halves used while the door is open, leaving a centred hole.
    pub fn door_halves(&self) -> [EdgeSpec; 2] {
        let ew = self.edge_weight;
        let half_hole = self.hole_width / 2.0;
        let edge_width = self.mid().x - half_hole;
        let y = self.box_height - ew / 2.0;
        let size = Vec2::new(edge_width, ew);
        [
            EdgeSpec::new(
                EdgeRole::DoorLeft,
                Rect::new(Vec2::new(edge_width / 2.0, y), size),
            ),
            EdgeSpec::new(
                EdgeRole::DoorRight,
                Rect::new(Vec2::new(self.mid().x + half_hole + edge_width / 2.0, y), size),
            ),
        ]
    }

    /// Dark strip drawn over the hole so balls below the floor do not show through.
    pub fn hole_cover(&self) -> Rect {
        Rect::new(
            self.hole_center(),
            Vec2::new(self.hole_width, self.edge_weight),
        )
    }

    /// Horizontal range balls are spawned in.
    pub fn spawn_x_range(&self) -> (f32, f32) {
        (self.ball_diameter, self.width() - self.ball_diameter)
    }

    /// Spawn height: one ball diameter above the inner floor.
    pub fn spawn_y(&self) -> f32 {
        self.box_height - self.edge_weight - self.ball_diameter
    }

    /// Upward travel of the result ball when it rises to the centre.
    pub fn reveal_rise(&self) -> f32 {
        self.mid().y - self.reveal_ball_size.y / 2.0
    }

    /// Size of a shell half.
    pub fn piece_size(&self) -> Vec2 {
        Vec2::new(self.reveal_ball_size.x, self.piece_height)
    }

    /// Final centre of the coin.
    pub fn coin_target(&self) -> Vec2 {
        Vec2::new(self.mid().x, self.mid().y - self.coin_size.y / 2.0)
    }
}
