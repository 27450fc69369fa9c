//! Framing of raw MIDI bytes into note events.

mod source;

use std::collections::VecDeque;

use tracing::trace;

pub use source::{ByteSource, DeviceSource, ScriptedSource};

/// Status byte of a channel-1 note-on message.
pub const NOTE_ON: u8 = 0x90;
/// Status byte of a channel-1 note-off message.
pub const NOTE_OFF: u8 = 0x80;

const MESSAGE_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MidiEvent {
    NoteStarted { pitch: u8, velocity: u8 },
    NoteStopped { pitch: u8, velocity: u8 },
}

impl MidiEvent {
    pub fn pitch(&self) -> u8 {
        match *self {
            MidiEvent::NoteStarted { pitch, .. } | MidiEvent::NoteStopped { pitch, .. } => pitch,
        }
    }

    /// Wire form of the event.
    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            MidiEvent::NoteStarted { pitch, velocity } => [NOTE_ON, pitch, velocity],
            MidiEvent::NoteStopped { pitch, velocity } => [NOTE_OFF, pitch, velocity],
        }
    }
}

/// Incremental decoder for fixed three-byte note messages.
///
/// Bytes are fed as they arrive. A note message missing its payload stays
/// buffered until the next feed completes it. Any other leading byte is
/// dropped on its own, so unsupported messages are skipped byte by byte.
#[derive(Debug, Default)]
pub struct Decoder {
    pending: VecDeque<u8>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes);
    }

    /// Bytes held back waiting for the rest of a message.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Lazily decodes every complete message buffered so far.
    pub fn events(&mut self) -> DecodedEvents<'_> {
        DecodedEvents {
            pending: &mut self.pending,
        }
    }
}

/// Iterator returned by [`Decoder::events`].
#[derive(Debug)]
pub struct DecodedEvents<'a> {
    pending: &'a mut VecDeque<u8>,
}

impl Iterator for DecodedEvents<'_> {
    type Item = MidiEvent;

    fn next(&mut self) -> Option<MidiEvent> {
        loop {
            let status = *self.pending.front()?;
            if status != NOTE_ON && status != NOTE_OFF {
                trace!(status, "skipping unsupported byte");
                self.pending.pop_front();
                continue;
            }

            if self.pending.len() < MESSAGE_LEN {
                trace!(status, buffered = self.pending.len(), "incomplete message");
                return None;
            }

            let (pitch, velocity) = (self.pending[1], self.pending[2]);
            self.pending.drain(..MESSAGE_LEN);

            return Some(if status == NOTE_ON {
                MidiEvent::NoteStarted { pitch, velocity }
            } else {
                MidiEvent::NoteStopped { pitch, velocity }
            });
        }
    }
}
