use serde::{Deserialize, Serialize};

use crate::Result;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const GRAY: Rgb = Rgb::new(128, 128, 128);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const PINK: Rgb = Rgb::new(255, 0, 255);
    pub const DARK_GREEN: Rgb = Rgb::new(0, 128, 0);
    pub const DARK_RED: Rgb = Rgb::new(128, 0, 0);
    pub const DARK_BLUE: Rgb = Rgb::new(0, 0, 128);
    pub const DARK_PINK: Rgb = Rgb::new(128, 0, 128);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Canvas coordinate. Points may lie off-canvas; surfaces clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Drawing backend the frame driver renders into.
///
/// Implementations own rasterisation, buffering and window events; the core
/// only issues primitives in canvas coordinates and presents once per frame.
pub trait Surface {
    fn clear(&mut self, color: Rgb);

    /// Draws a small fixed-size dot centred on `pos`.
    fn draw_point(&mut self, pos: Point, color: Rgb);

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb, thickness: u32);

    fn draw_circle_outline(&mut self, center: Point, radius: u32, thickness: u32, color: Rgb);

    fn draw_rect_outline(&mut self, rect: Rect, thickness: u32, color: Rgb);

    /// Publishes the frame drawn since the last call.
    fn present(&mut self) -> Result<()>;

    /// Polled once per frame. Returning `true` ends the frame loop.
    fn quit_requested(&mut self) -> bool;
}

/// One primitive issued to a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgb),
    Point {
        pos: Point,
        color: Rgb,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgb,
        thickness: u32,
    },
    Circle {
        center: Point,
        radius: u32,
        thickness: u32,
        color: Rgb,
    },
    Rect {
        rect: Rect,
        thickness: u32,
        color: Rgb,
    },
}

/// In-memory surface that keeps the commands of the frame being drawn.
///
/// Used by tests and by headless runs. With `quit_after` set it requests quit
/// once that many frames have been presented.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    last_frame: Vec<DrawCommand>,
    frames_presented: u64,
    quit_after: Option<u64>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface that asks the driver to stop after `frames` presents.
    pub fn headless(frames: u64) -> Self {
        Self {
            quit_after: Some(frames),
            ..Self::default()
        }
    }

    /// Commands drawn since the most recent `clear` or `present`.
    pub fn pending(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commands of the most recently presented frame.
    pub fn last_frame(&self) -> &[DrawCommand] {
        &self.last_frame
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn take_pending(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, color: Rgb) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_point(&mut self, pos: Point, color: Rgb) {
        self.commands.push(DrawCommand::Point { pos, color });
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb, thickness: u32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            thickness,
        });
    }

    fn draw_circle_outline(&mut self, center: Point, radius: u32, thickness: u32, color: Rgb) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            thickness,
            color,
        });
    }

    fn draw_rect_outline(&mut self, rect: Rect, thickness: u32, color: Rgb) {
        self.commands.push(DrawCommand::Rect {
            rect,
            thickness,
            color,
        });
    }

    fn present(&mut self) -> Result<()> {
        self.last_frame = std::mem::take(&mut self.commands);
        self.frames_presented += 1;
        Ok(())
    }

    fn quit_requested(&mut self) -> bool {
        self.quit_after
            .map(|limit| self.frames_presented >= limit)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_moves_commands_into_last_frame() {
        let mut surface = RecordingSurface::new();
        surface.clear(Rgb::BLACK);
        surface.draw_point(Point::new(1, 2), Rgb::WHITE);
        surface.present().unwrap();

        assert!(surface.pending().is_empty());
        assert_eq!(surface.last_frame().len(), 2);
        assert_eq!(surface.frames_presented(), 1);
    }

    #[test]
    fn headless_surface_requests_quit_after_limit() {
        let mut surface = RecordingSurface::headless(2);
        assert!(!surface.quit_requested());
        surface.present().unwrap();
        assert!(!surface.quit_requested());
        surface.present().unwrap();
        assert!(surface.quit_requested());
    }

    #[test]
    fn plain_surface_never_quits() {
        let mut surface = RecordingSurface::new();
        for _ in 0..10 {
            surface.present().unwrap();
        }
        assert!(!surface.quit_requested());
    }
}
