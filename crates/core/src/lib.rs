//! Core library for the Doodle Melody toy.
//!
//! A drawing surface records pointer strokes into an RGBA pixel buffer. On
//! request the buffer is scanned column by column into a short melody, which
//! is rendered by a small sine synthesizer behind a lazily opened audio
//! output. Everything here is headless; the window lives in the app crate.

pub mod audio;
pub mod brush;
pub mod canvas;
pub mod config;
pub mod error;
pub mod melody;
pub mod session;
pub mod synth;
pub mod timeline;

pub use audio::{AudioBackend, AudioContext, AudioEngine, SharedSynth};
pub use brush::BrushPalette;
pub use canvas::{PixelBuffer, Point, Rgba, Surface};
pub use config::{
    AppConfig, AudioConfig, BrushConfig, CanvasConfig, EnvelopeConfig, MelodyConfig, Swatch,
};
pub use error::{DoodleError, Result};
pub use melody::{MelodyScanner, NoteEvent};
pub use session::{Session, UiEvent};
pub use synth::{Envelope, Synthesizer, Voice};
pub use timeline::{NoteSchedule, PlaybackClock, ScheduledNote};
