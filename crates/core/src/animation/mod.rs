//! Cosmetic per-note decorations.
//!
//! Each note carries three growth counters that advance once per drawn frame
//! and never rewind. A counter that reaches the canvas width stops drawing;
//! the note itself stays until the registry prunes it.

use rand::Rng;

use crate::{
    config::{CanvasConfig, DecorationConfig},
    render::{Point, Rect, Surface},
    Rgb,
};

/// Monotonic counter with a fixed increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Growth {
    value: u32,
    step: u32,
}

impl Growth {
    pub fn new(start: u32, step: u32) -> Self {
        Self { value: start, step }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn is_finished(&self, limit: u32) -> bool {
        self.value >= limit
    }

    /// Yields the current value and grows, or `None` once `limit` is reached.
    pub fn advance(&mut self, limit: u32) -> Option<u32> {
        if self.is_finished(limit) {
            return None;
        }
        let current = self.value;
        self.value = self.value.saturating_add(self.step);
        Some(current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decorations {
    /// Radius of the ring centred on the canvas.
    pub ring: Growth,
    /// Radius of the ring drawn around a random point each frame.
    pub scatter_ring: Growth,
    /// Outline thickness of the square dropped at a random point each frame.
    pub scatter_mark: Growth,
}

impl Decorations {
    pub fn new(config: &DecorationConfig) -> Self {
        Self {
            ring: Growth::new(config.ring_start, config.ring_step),
            scatter_ring: Growth::new(config.scatter_ring_start, config.scatter_ring_step),
            scatter_mark: Growth::new(config.scatter_mark_start, config.scatter_mark_step),
        }
    }

    pub fn is_finished(&self, canvas: &CanvasConfig) -> bool {
        self.ring.is_finished(canvas.width)
            && self.scatter_ring.is_finished(canvas.width)
            && self.scatter_mark.is_finished(canvas.width)
    }

    /// Draws whichever decorations are still growing and advances them.
    pub fn draw<S, R>(
        &mut self,
        surface: &mut S,
        color: Rgb,
        canvas: &CanvasConfig,
        config: &DecorationConfig,
        rng: &mut R,
    ) where
        S: Surface + ?Sized,
        R: Rng,
    {
        let limit = canvas.width;
        let max_x = i32::try_from(canvas.width).unwrap_or(i32::MAX);
        let max_y = i32::try_from(canvas.height).unwrap_or(i32::MAX);

        if let Some(radius) = self.ring.advance(limit) {
            let center = Point::new(max_x / 2, max_y / 2);
            surface.draw_circle_outline(
                center,
                radius,
                ring_thickness(radius, config.thickness_threshold),
                color,
            );
        }

        if let Some(radius) = self.scatter_ring.advance(limit) {
            let center = Point::new(rng.gen_range(0..=max_x), rng.gen_range(0..=max_y));
            surface.draw_circle_outline(
                center,
                radius,
                ring_thickness(radius, config.thickness_threshold),
                color,
            );
        }

        if let Some(thickness) = self.scatter_mark.advance(limit) {
            let rect = Rect::new(
                rng.gen_range(0..=max_x),
                rng.gen_range(0..=max_y),
                config.scatter_mark_size,
                config.scatter_mark_size,
            );
            surface.draw_rect_outline(rect, thickness, color);
        }
    }
}

fn ring_thickness(radius: u32, threshold: u32) -> u32 {
    if radius > threshold {
        threshold
    } else {
        1
    }
}
