use std::time::{Duration, Instant};

/// Global step counter. One step per rendered frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepClock {
    step: u64,
}

impl StepClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    /// Moves to the next step and returns it.
    pub fn advance(&mut self) -> u64 {
        self.step += 1;
        self.step
    }
}

/// Caps the frame rate by sleeping out whatever is left of each frame.
#[derive(Debug, Clone)]
pub struct FramePacer {
    frame: Option<Duration>,
    last_tick: Option<Instant>,
}

impl FramePacer {
    pub fn new(frame_rate: u32) -> Self {
        let frame = (frame_rate > 0).then(|| Duration::from_secs(1) / frame_rate);
        Self {
            frame,
            last_tick: None,
        }
    }

    /// A pacer that never sleeps.
    pub fn unlimited() -> Self {
        Self {
            frame: None,
            last_tick: None,
        }
    }

    pub fn frame_duration(&self) -> Option<Duration> {
        self.frame
    }

    /// Waits until one frame has passed since the previous call and returns
    /// the time actually spent sleeping.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let slept = match (self.frame, self.last_tick) {
            (Some(frame), Some(last)) => {
                let elapsed = now.saturating_duration_since(last);
                match frame.checked_sub(elapsed) {
                    Some(remaining) if !remaining.is_zero() => {
                        spin_sleep::sleep(remaining);
                        remaining
                    }
                    _ => Duration::ZERO,
                }
            }
            _ => Duration::ZERO,
        };
        self.last_tick = Some(Instant::now());
        slept
    }
}
