//! Collision primitives
//!
//! Everything solid in the game is an axis-aligned rectangle and the player is a
//! circle, so a single circle/rectangle overlap test covers obstacles and ground.
//! Touching counts as a hit: a circle whose distance to the rectangle equals
//! its radius collides.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clamp;

/// A circle in play-area coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// An axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Shrink by `inset` on every side
    ///
    /// Returns `None` when nothing is left of the rectangle.
    pub fn inset(&self, inset: f32) -> Option<Rect> {
        let w = self.w - inset * 2.0;
        let h = self.h - inset * 2.0;
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        Some(Rect::new(self.x + inset, self.y + inset, w, h))
    }

    /// Point on (or inside) the rectangle closest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            clamp(p.x, self.x, self.right()),
            clamp(p.y, self.y, self.bottom()),
        )
    }
}

/// Check whether `circle` overlaps `rect` shrunk by `inset` on all sides
///
/// Degenerate rectangles (zero or negative area after the inset) never collide.
pub fn circle_rect_collides(circle: &Circle, rect: &Rect, inset: f32) -> bool {
    let Some(rect) = rect.inset(inset) else {
        return false;
    };
    let nearest = rect.closest_point(circle.center);
    circle.center.distance_squared(nearest) <= circle.radius * circle.radius
}
