//! Per-frame loop tying input, registry and rendering together.
//!
//! Every frame runs the same fixed sequence: advance the step, drain input,
//! apply events, prune, clear, draw, present, check for quit, pace.

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info};

use crate::{
    config::VisualiserConfig,
    midi::{ByteSource, Decoder, MidiEvent},
    registry::NoteRegistry,
    render::Surface,
    scene,
    timeline::{FramePacer, StepClock},
    Result, Rgb,
};

const READ_CHUNK: usize = 256;

/// What happened during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub step: u64,
    pub events: usize,
    pub pruned: usize,
    pub drawn: usize,
    pub quit: bool,
}

/// Owns the step clock, the registry and both collaborators.
pub struct FrameDriver<I, S, R = StdRng> {
    config: VisualiserConfig,
    clock: StepClock,
    registry: NoteRegistry,
    decoder: Decoder,
    input: I,
    surface: S,
    pacer: FramePacer,
    rng: R,
}

impl<I, S> FrameDriver<I, S, StdRng>
where
    I: ByteSource,
    S: Surface,
{
    /// Builds a driver paced at the configured frame rate.
    pub fn new(config: VisualiserConfig, input: I, surface: S) -> Self {
        let pacer = FramePacer::new(config.frame_rate);
        Self::with_parts(config, input, surface, pacer, StdRng::from_entropy())
    }
}

impl<I, S, R> FrameDriver<I, S, R>
where
    I: ByteSource,
    S: Surface,
    R: Rng,
{
    pub fn with_parts(
        config: VisualiserConfig,
        input: I,
        surface: S,
        pacer: FramePacer,
        rng: R,
    ) -> Self {
        let registry = NoteRegistry::new(config.release_policy, config.decoration);
        Self {
            config,
            clock: StepClock::new(),
            registry,
            decoder: Decoder::new(),
            input,
            surface,
            pacer,
            rng,
        }
    }

    pub fn step(&self) -> u64 {
        self.clock.step()
    }

    pub fn registry(&self) -> &NoteRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    /// Runs frames until the surface asks to quit.
    pub fn run(&mut self) -> Result<u64> {
        info!(
            width = self.config.canvas.width,
            height = self.config.canvas.height,
            frame_rate = self.config.frame_rate,
            window = self.config.window,
            "frame loop started"
        );
        loop {
            let report = self.tick()?;
            if report.quit {
                info!(step = report.step, "quit requested");
                return Ok(report.step);
            }
        }
    }

    /// Runs exactly one frame.
    pub fn tick(&mut self) -> Result<FrameReport> {
        let step = self.clock.advance();

        self.poll_input(step);
        let events = self.apply_events(step);
        let pruned = self.registry.prune_older_than(step, self.config.window);

        self.surface.clear(Rgb::BLACK);
        let drawn = scene::draw_notes(
            &mut self.registry,
            step,
            &self.config,
            &mut self.surface,
            &mut self.rng,
        );
        self.surface.present()?;

        let quit = self.surface.quit_requested();
        if !quit {
            self.pacer.tick();
        }

        Ok(FrameReport {
            step,
            events,
            pruned,
            drawn,
            quit,
        })
    }

    fn poll_input(&mut self, step: u64) {
        self.input.begin_poll(step);
        let mut chunk = [0u8; READ_CHUNK];
        while self.input.available() > 0 {
            let read = self.input.read(&mut chunk);
            if read == 0 {
                break;
            }
            self.decoder.feed(&chunk[..read]);
        }
    }

    fn apply_events(&mut self, step: u64) -> usize {
        let mut applied = 0;
        for event in self.decoder.events() {
            match event {
                MidiEvent::NoteStarted { pitch, .. } => {
                    self.registry.on_note_started(step, pitch);
                }
                MidiEvent::NoteStopped { pitch, .. } => {
                    self.registry.on_note_stopped(pitch);
                }
            }
            applied += 1;
        }
        if applied > 0 {
            debug!(step, applied, live = self.registry.len(), "applied MIDI events");
        }
        applied
    }
}

impl<I, S, R> std::fmt::Debug for FrameDriver<I, S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDriver")
            .field("step", &self.clock.step())
            .field("notes", &self.registry.len())
            .field("pending_bytes", &self.decoder.pending_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        midi::{ScriptedSource, NOTE_OFF, NOTE_ON},
        render::{DrawCommand, RecordingSurface},
    };

    fn driver(
        input: ScriptedSource,
        surface: RecordingSurface,
    ) -> FrameDriver<ScriptedSource, RecordingSurface> {
        FrameDriver::with_parts(
            VisualiserConfig::default(),
            input,
            surface,
            FramePacer::unlimited(),
            StdRng::seed_from_u64(11),
        )
    }

    fn pitches_and_activity(driver: &FrameDriver<ScriptedSource, RecordingSurface>) -> Vec<(u8, bool)> {
        driver
            .registry()
            .iter()
            .map(|note| (note.pitch, note.active))
            .collect()
    }

    #[test]
    fn start_start_stop_scenario() {
        let input = ScriptedSource::new()
            .at_step(1, [NOTE_ON, 60, 100])
            .at_step(2, [NOTE_ON, 64, 100])
            .at_step(3, [NOTE_OFF, 60, 0]);
        let mut driver = driver(input, RecordingSurface::new());

        for _ in 0..3 {
            driver.tick().unwrap();
        }

        assert_eq!(driver.step(), 3);
        assert_eq!(pitches_and_activity(&driver), vec![(60, false), (64, true)]);

        let notes: Vec<_> = driver.registry().iter().collect();
        assert!(notes[0].intervals.is_empty());
        assert_eq!(notes[1].intervals, vec![notes[0].id]);
        assert_eq!(notes[0].created_step, 1);
        assert_eq!(notes[1].created_step, 2);
    }

    #[test]
    fn idle_steps_empty_the_registry() {
        let input = ScriptedSource::new().at_step(1, [NOTE_ON, 60, 100, NOTE_ON, 67, 100]);
        let mut driver = driver(input, RecordingSurface::new());

        let mut last = FrameReport::default();
        for _ in 0..700 {
            last = driver.tick().unwrap();
        }

        assert_eq!(last.step, 700);
        assert!(driver.registry().is_empty());
        assert_eq!(last.drawn, 0);
    }

    #[test]
    fn note_survives_until_window_elapses() {
        let input = ScriptedSource::new().at_step(1, [NOTE_ON, 60, 100]);
        let mut driver = driver(input, RecordingSurface::new());

        for _ in 0..640 {
            driver.tick().unwrap();
        }
        assert_eq!(driver.registry().len(), 1);

        let report = driver.tick().unwrap();
        assert_eq!(report.step, 641);
        assert_eq!(report.pruned, 1);
        assert!(driver.registry().is_empty());
    }

    #[test]
    fn stray_note_off_changes_nothing() {
        let input = ScriptedSource::new()
            .at_step(1, [NOTE_ON, 60, 100])
            .at_step(2, [NOTE_OFF, 72, 0]);
        let mut driver = driver(input, RecordingSurface::new());

        driver.tick().unwrap();
        let report = driver.tick().unwrap();

        assert_eq!(report.events, 1);
        assert_eq!(pitches_and_activity(&driver), vec![(60, true)]);
    }

    #[test]
    fn all_pending_events_are_drained_in_one_frame() {
        let bytes: Vec<u8> = (0..40u8).flat_map(|i| [NOTE_ON, 40 + i, 90]).collect();
        let input = ScriptedSource::new().at_step(1, bytes);
        let mut driver = driver(input, RecordingSurface::new());

        let report = driver.tick().unwrap();

        assert_eq!(report.events, 40);
        assert_eq!(driver.registry().len(), 40);
        let last = driver.registry().iter().last().unwrap();
        assert_eq!(last.intervals.len(), 39);
    }

    #[test]
    fn split_message_completes_on_later_frame() {
        let input = ScriptedSource::new()
            .at_step(1, [NOTE_ON, 60])
            .at_step(3, [100]);
        let mut driver = driver(input, RecordingSurface::new());

        assert_eq!(driver.tick().unwrap().events, 0);
        assert_eq!(driver.tick().unwrap().events, 0);
        assert_eq!(driver.tick().unwrap().events, 1);
        assert_eq!(driver.registry().iter().next().unwrap().created_step, 3);
    }

    #[test]
    fn frame_starts_with_clear_and_is_presented() {
        let input = ScriptedSource::new().at_step(1, [NOTE_ON, 60, 100]);
        let mut driver = driver(input, RecordingSurface::new());

        driver.tick().unwrap();

        let frame = driver.surface().last_frame();
        assert_eq!(frame.first(), Some(&DrawCommand::Clear(Rgb::BLACK)));
        assert!(frame
            .iter()
            .any(|command| matches!(command, DrawCommand::Point { color: Rgb::WHITE, .. })));
        assert_eq!(driver.surface().frames_presented(), 1);
    }

    #[test]
    fn run_stops_on_quit_request() {
        let mut driver = driver(ScriptedSource::demo(), RecordingSurface::headless(250));

        let last_step = driver.run().unwrap();

        assert_eq!(last_step, 250);
        assert_eq!(driver.surface().frames_presented(), 250);
        assert_eq!(driver.input().remaining(), 0);
        assert_eq!(driver.registry().active_count(), 0);
    }
}
