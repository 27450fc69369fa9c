//! SDL2 window backend.

use interval_visualiser_core::{
    Point, Rect, Result, Rgb, Surface, VisualiserConfig, VisualiserError,
};
use sdl2::{
    event::Event, keyboard::Keycode, pixels::Color, render::Canvas, video::Window, EventPump, Sdl,
};

pub struct SdlSurface {
    _context: Sdl,
    canvas: Canvas<Window>,
    events: EventPump,
    point_size: u32,
    /// First drawing error of the current frame, reported by `present`.
    failure: Option<String>,
}

impl SdlSurface {
    pub fn open(config: &VisualiserConfig) -> Result<Self> {
        let context = sdl2::init().map_err(VisualiserError::render)?;
        let video = context.video().map_err(VisualiserError::render)?;

        let window = video
            .window("Interval Visualiser", config.canvas.width, config.canvas.height)
            .position_centered()
            .build()
            .map_err(|err| VisualiserError::render(err.to_string()))?;

        let canvas = window
            .into_canvas()
            .accelerated()
            .build()
            .map_err(|err| VisualiserError::render(err.to_string()))?;

        let events = context.event_pump().map_err(VisualiserError::render)?;

        tracing::info!(
            width = config.canvas.width,
            height = config.canvas.height,
            "opened SDL window"
        );

        Ok(Self {
            _context: context,
            canvas,
            events,
            point_size: config.decoration.point_size,
            failure: None,
        })
    }

    fn record(&mut self, outcome: std::result::Result<(), String>) {
        if let Err(err) = outcome {
            self.failure.get_or_insert(err);
        }
    }
}

fn color(rgb: Rgb) -> Color {
    Color::RGB(rgb.r, rgb.g, rgb.b)
}

fn point(p: Point) -> sdl2::rect::Point {
    sdl2::rect::Point::new(p.x, p.y)
}

/// Midpoint rasterisation of a one-pixel circle.
fn circle_points(center: Point, radius: i32, out: &mut Vec<sdl2::rect::Point>) {
    let (cx, cy) = (center.x, center.y);
    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;
    while x >= y {
        for (dx, dy) in [
            (x, y),
            (y, x),
            (-y, x),
            (-x, y),
            (-x, -y),
            (-y, -x),
            (y, -x),
            (x, -y),
        ] {
            out.push(sdl2::rect::Point::new(cx + dx, cy + dy));
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

impl Surface for SdlSurface {
    fn clear(&mut self, rgb: Rgb) {
        self.canvas.set_draw_color(color(rgb));
        self.canvas.clear();
    }

    fn draw_point(&mut self, pos: Point, rgb: Rgb) {
        let size = self.point_size.max(1);
        let half = (size / 2) as i32;
        self.canvas.set_draw_color(color(rgb));
        let outcome = self
            .canvas
            .fill_rect(sdl2::rect::Rect::new(pos.x - half, pos.y - half, size, size));
        self.record(outcome);
    }

    fn draw_line(&mut self, from: Point, to: Point, rgb: Rgb, thickness: u32) {
        self.canvas.set_draw_color(color(rgb));
        for offset in 0..thickness.max(1) as i32 {
            let outcome = self.canvas.draw_line(
                point(Point::new(from.x, from.y + offset)),
                point(Point::new(to.x, to.y + offset)),
            );
            self.record(outcome);
        }
    }

    fn draw_circle_outline(&mut self, center: Point, radius: u32, thickness: u32, rgb: Rgb) {
        // The outline grows inwards from `radius`.
        let outer = radius as i32;
        let inner = outer - thickness.max(1) as i32 + 1;
        let mut points = Vec::new();
        for r in inner.max(0)..=outer {
            circle_points(center, r, &mut points);
        }
        self.canvas.set_draw_color(color(rgb));
        let outcome = self.canvas.draw_points(points.as_slice());
        self.record(outcome);
    }

    fn draw_rect_outline(&mut self, rect: Rect, thickness: u32, rgb: Rgb) {
        self.canvas.set_draw_color(color(rgb));
        for inset in 0..thickness.max(1) {
            let width = rect.width.saturating_sub(2 * inset);
            let height = rect.height.saturating_sub(2 * inset);
            if width == 0 || height == 0 {
                break;
            }
            let outcome = self.canvas.draw_rect(sdl2::rect::Rect::new(
                rect.x + inset as i32,
                rect.y + inset as i32,
                width,
                height,
            ));
            self.record(outcome);
        }
    }

    fn present(&mut self) -> Result<()> {
        self.canvas.present();
        match self.failure.take() {
            Some(err) => Err(VisualiserError::render(err)),
            None => Ok(()),
        }
    }

    fn quit_requested(&mut self) -> bool {
        let mut quit = false;
        for event in self.events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => quit = true,
                _ => {}
            }
        }
        quit
    }
}
