use rand::Rng;

use crate::{
    config::{CanvasConfig, VisualiserConfig},
    registry::{Note, NoteRegistry},
    render::{Point, Surface},
    Rgb,
};

/// Vertical pixels per semitone.
const PITCH_SPACING: i64 = 4;

/// Where `note` sits on the canvas at `step`.
///
/// New notes appear on the right edge and drift left one pixel per step;
/// higher pitches sit higher up.
pub fn note_position(note: &Note, step: u64, canvas: &CanvasConfig) -> Point {
    let age = i64::try_from(note.age(step)).unwrap_or(i64::MAX);
    let x = i64::from(canvas.width).saturating_sub(age);
    let y = i64::from(canvas.height) - PITCH_SPACING * i64::from(note.pitch);
    Point::new(clamp_i32(x), clamp_i32(y))
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Draws every tracked note: its dot, a line to each linked note that is
/// still tracked, then its decorations.
///
/// Returns the number of notes drawn.
pub fn draw_notes<S, R>(
    registry: &mut NoteRegistry,
    step: u64,
    config: &VisualiserConfig,
    surface: &mut S,
    rng: &mut R,
) -> usize
where
    S: Surface + ?Sized,
    R: Rng,
{
    let mut drawn = 0;
    for id in registry.ids() {
        let Some(note) = registry.get(id) else {
            continue;
        };

        let pos = note_position(note, step, &config.canvas);
        let dot = if note.active { Rgb::WHITE } else { Rgb::GRAY };
        surface.draw_point(pos, dot);

        for other in registry.resolve_links(note) {
            let color = config.palette.color(note, other);
            surface.draw_line(pos, note_position(other, step, &config.canvas), color, 1);
        }

        let own_color = config.palette.color(note, note);
        if let Some(note) = registry.get_mut(id) {
            note.decorations.draw(
                surface,
                own_color,
                &config.canvas,
                &config.decoration,
                rng,
            );
        }
        drawn += 1;
    }
    drawn
}
