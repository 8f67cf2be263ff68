//! Column scan that turns the drawing into a melody.
//!
//! The canvas is cut into equal vertical steps. Each step samples one pixel
//! column and looks for the topmost painted pixel; its height selects a pitch
//! from the scale, higher on screen meaning higher in pitch.

use serde::{Deserialize, Serialize};

use crate::{config::MelodyConfig, PixelBuffer};

/// One note derived from the canvas, timed relative to the moment the melody
/// is played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub step: usize,
    pub frequency_hz: f32,
    pub start_s: f32,
    pub duration_s: f32,
}

#[derive(Debug, Clone)]
pub struct MelodyScanner {
    steps: usize,
    total_duration_s: f32,
    note_duration_s: f32,
    scale: Vec<f32>,
}

impl MelodyScanner {
    pub fn new(config: &MelodyConfig) -> Self {
        Self {
            steps: config.steps,
            total_duration_s: config.total_duration_s,
            note_duration_s: config.note_duration_s,
            scale: config.scale.clone(),
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Pixel column sampled by `step`: `floor(width * step / steps)`.
    pub fn column_for_step(&self, step: usize, width: usize) -> usize {
        width * step / self.steps
    }

    /// Offset of `step` from the start of the melody.
    pub fn start_for_step(&self, step: usize) -> f32 {
        (step as f32 / self.steps as f32) * self.total_duration_s
    }

    /// Maps a row to a scale pitch. Row 0 is the top of the canvas and picks
    /// the last (highest) entry of the scale.
    pub fn pitch_for_row(&self, row: usize, height: usize) -> f32 {
        let len = self.scale.len();
        let normalised = row as f64 / height as f64;
        let index = ((normalised * len as f64).floor() as usize).min(len - 1);
        self.scale[len - 1 - index]
    }

    /// Scans the canvas and returns the notes in step order. Steps whose
    /// column is entirely transparent produce nothing.
    pub fn scan(&self, pixels: &PixelBuffer) -> Vec<NoteEvent> {
        if self.scale.is_empty() || self.steps == 0 {
            return Vec::new();
        }

        let (width, height) = (pixels.width(), pixels.height());
        let notes: Vec<NoteEvent> = (0..self.steps)
            .filter_map(|step| {
                let column = self.column_for_step(step, width);
                let row = topmost_painted_row(pixels, column)?;
                Some(NoteEvent {
                    step,
                    frequency_hz: self.pitch_for_row(row, height),
                    start_s: self.start_for_step(step),
                    duration_s: self.note_duration_s,
                })
            })
            .collect();

        tracing::debug!(notes = notes.len(), steps = self.steps, "scanned canvas");
        notes
    }
}

fn topmost_painted_row(pixels: &PixelBuffer, column: usize) -> Option<usize> {
    (0..pixels.height()).find(|&row| {
        pixels
            .get(column, row)
            .map(|pixel| pixel.a > 0)
            .unwrap_or(false)
    })
}
