//! Frame composition
//!
//! `draw_frame` turns a [`GameState`] into drawing commands against a
//! [`Surface`]. The browser uses the canvas backend; tests and the headless
//! runner record into a [`DrawList`].

#[cfg(target_arch = "wasm32")]
pub mod canvas;

use glam::Vec2;

use crate::assets::Sprite;
use crate::sim::GameState;

/// Axis-aligned rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WALL: Color = Color::rgb(128, 128, 128);
    pub const BATTERY: Color = Color::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS colour string for canvas fill styles
    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Drawing primitives the game needs
pub trait Surface {
    fn draw_image(&mut self, sprite: Sprite, dest: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
}

/// Draw one frame: background, player, walls, batteries (back to front)
pub fn draw_frame<S: Surface + ?Sized>(state: &GameState, surface: &mut S) {
    let t = &state.tuning;

    surface.draw_image(
        Sprite::Background,
        Rect::new(0.0, 0.0, t.surface_width, t.surface_height),
    );
    surface.draw_image(
        Sprite::Player,
        Rect::new(
            t.player_x,
            state.player_y - t.player_half(),
            t.player_size,
            t.player_size,
        ),
    );

    for wall in &state.obstacles {
        surface.fill_rect(Rect::new(wall.x, wall.y, t.wall_width, wall.height), Color::WALL);
    }

    let r = t.pickup_radius;
    for battery in &state.pickups {
        surface.fill_circle(Vec2::new(battery.x + r, battery.y + r), r, Color::BATTERY);
    }
}

/// A recorded drawing command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Image(Sprite, Rect),
    Rect(Rect, Color),
    Circle(Vec2, f32, Color),
}

/// Surface that records commands instead of drawing
#[derive(Debug, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCmd>,
}

impl Surface for DrawList {
    fn draw_image(&mut self, sprite: Sprite, dest: Rect) {
        self.commands.push(DrawCmd::Image(sprite, dest));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCmd::Rect(rect, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCmd::Circle(center, radius, color));
    }
}
