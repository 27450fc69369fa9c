//! Core library for the Interval Visualiser.
//!
//! Notes arriving from a MIDI device become points that scroll across a
//! timeline. Each note is joined by a line to every note that was still
//! sounding when it started, colored by pitch class, and trails a few
//! growing decorations. The crate is split by concern: MIDI framing, the
//! note registry and its link graph, color mapping, decoration state, the
//! drawing of a frame, and the frame driver that sequences them against a
//! pluggable rendering [`Surface`].

pub mod animation;
pub mod config;
pub mod driver;
pub mod error;
pub mod mapping;
pub mod midi;
pub mod registry;
pub mod render;
pub mod scene;
pub mod timeline;

pub use animation::{Decorations, Growth};
pub use config::{CanvasConfig, DecorationConfig, VisualiserConfig};
pub use driver::{FrameDriver, FrameReport};
pub use error::{Result, VisualiserError};
pub use mapping::{Interval, Palette};
pub use midi::{ByteSource, Decoder, DeviceSource, MidiEvent, ScriptedSource};
pub use registry::{Note, NoteId, NoteRegistry, ReleasePolicy};
pub use render::{DrawCommand, Point, Rect, RecordingSurface, Rgb, Surface};
pub use timeline::{FramePacer, StepClock};
