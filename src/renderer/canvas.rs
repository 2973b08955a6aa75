//! Canvas 2D backend

use std::collections::HashMap;
use std::f64::consts::TAU;

use glam::Vec2;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::{Color, Rect, Surface};
use crate::assets::Sprite;

/// Draws onto an HTML canvas with preloaded sprite images
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    images: HashMap<Sprite, HtmlImageElement>,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, images: HashMap<Sprite, HtmlImageElement>) -> Self {
        Self { ctx, images }
    }
}

impl Surface for CanvasSurface {
    fn draw_image(&mut self, sprite: Sprite, dest: Rect) {
        let Some(image) = self.images.get(&sprite) else {
            log::warn!("No image for {:?}", sprite);
            return;
        };
        if let Err(e) = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            dest.x as f64,
            dest.y as f64,
            dest.w as f64,
            dest.h as f64,
        ) {
            log::warn!("drawImage failed for {:?}: {:?}", sprite, e);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&color.css());
        self.ctx
            .fill_rect(rect.x as f64, rect.y as f64, rect.w as f64, rect.h as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.begin_path();
        self.ctx.set_fill_style_str(&color.css());
        self.ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU)
            .ok();
        self.ctx.fill();
    }
}
