use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{DoodleError, Result, Rgba};

/// C major pentatonic over two octaves, lowest pitch first.
pub const PENTATONIC_C_MAJOR: [f32; 10] = [
    261.63, 293.66, 329.63, 392.00, 440.00, 523.25, 587.33, 659.25, 783.99, 880.00,
];

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub canvas: CanvasConfig,
    pub brushes: BrushConfig,
    pub melody: MelodyConfig,
    pub envelope: EnvelopeConfig,
    pub audio: AudioConfig,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing fields fall back to their
    /// defaults; the result is validated before it is returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.canvas.validate()?;
        self.brushes.validate()?;
        self.melody.validate()?;
        self.envelope.validate()?;
        self.audio.validate()?;

        if self.envelope.attack_s >= self.melody.note_duration_s {
            return Err(DoodleError::invalid(format!(
                "envelope attack ({}s) must be shorter than the note duration ({}s)",
                self.envelope.attack_s, self.melody.note_duration_s
            )));
        }
        Ok(())
    }
}

/// Drawing surface dimensions and stroke geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: usize,
    pub height: usize,
    /// Line width of every stroke, in canvas units.
    pub stroke_width: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            stroke_width: 5.0,
        }
    }
}

impl CanvasConfig {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DoodleError::invalid(format!(
                "canvas must not be empty (got {}x{})",
                self.width, self.height
            )));
        }
        if !(self.stroke_width > 0.0) {
            return Err(DoodleError::invalid("stroke width must be positive"));
        }
        Ok(())
    }
}

/// A single selectable brush.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swatch {
    pub name: String,
    pub color: Rgba,
}

impl Swatch {
    pub fn new(name: impl Into<String>, color: Rgba) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub swatches: Vec<Swatch>,
    /// Index of the swatch that starts out active.
    pub active: usize,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            swatches: vec![
                Swatch::new("blue", Rgba::opaque(0x00, 0x00, 0xff)),
                Swatch::new("red", Rgba::opaque(0xff, 0x00, 0x00)),
                Swatch::new("green", Rgba::opaque(0x00, 0xa0, 0x00)),
                Swatch::new("black", Rgba::opaque(0x00, 0x00, 0x00)),
            ],
            active: 0,
        }
    }
}

impl BrushConfig {
    fn validate(&self) -> Result<()> {
        if self.swatches.is_empty() {
            return Err(DoodleError::invalid("brush palette must not be empty"));
        }
        if self.active >= self.swatches.len() {
            return Err(DoodleError::invalid(format!(
                "active brush {} is out of range for {} swatches",
                self.active,
                self.swatches.len()
            )));
        }
        Ok(())
    }
}

/// Sampling policy used to turn the canvas into notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodyConfig {
    /// Number of equal-width vertical slices scanned for notes.
    pub steps: usize,
    pub total_duration_s: f32,
    pub note_duration_s: f32,
    /// Frequencies in Hz, lowest first. The top of the canvas maps to the
    /// last entry.
    pub scale: Vec<f32>,
}

impl Default for MelodyConfig {
    fn default() -> Self {
        Self {
            steps: 32,
            total_duration_s: 4.0,
            note_duration_s: 1.0,
            scale: PENTATONIC_C_MAJOR.to_vec(),
        }
    }
}

impl MelodyConfig {
    fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(DoodleError::invalid("melody needs at least one step"));
        }
        if self.scale.is_empty() {
            return Err(DoodleError::invalid("scale must contain at least one pitch"));
        }
        if let Some(bad) = self.scale.iter().find(|hz| !(**hz > 0.0)) {
            return Err(DoodleError::invalid(format!(
                "scale frequencies must be positive (got {bad})"
            )));
        }
        if !(self.total_duration_s > 0.0) || !(self.note_duration_s > 0.0) {
            return Err(DoodleError::invalid("melody durations must be positive"));
        }
        Ok(())
    }
}

/// Gain envelope applied to every note: linear attack to `peak_gain`, then an
/// exponential fall towards `floor_gain` at the end of the note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    pub peak_gain: f32,
    pub attack_s: f32,
    pub floor_gain: f32,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            peak_gain: 0.7,
            attack_s: 0.05,
            floor_gain: 0.0001,
        }
    }
}

impl EnvelopeConfig {
    fn validate(&self) -> Result<()> {
        // An exponential ramp cannot start or end at zero.
        if !(self.peak_gain > 0.0) || !(self.floor_gain > 0.0) {
            return Err(DoodleError::invalid(
                "envelope peak and floor gains must be positive",
            ));
        }
        if !(self.attack_s > 0.0) {
            return Err(DoodleError::invalid("envelope attack must be positive"));
        }
        Ok(())
    }
}

/// Configuration specific to the audio subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Requested output latency; translated into a fixed buffer size when the
    /// device supports it.
    pub target_latency_s: f32,
    /// Sample rate used when rendering without a device.
    pub offline_sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            target_latency_s: 0.01,
            offline_sample_rate: 48_000,
        }
    }
}

impl AudioConfig {
    fn validate(&self) -> Result<()> {
        if !(self.target_latency_s > 0.0) {
            return Err(DoodleError::invalid("target latency must be positive"));
        }
        if self.offline_sample_rate == 0 {
            return Err(DoodleError::invalid("offline sample rate must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = AppConfig::from_json(r#"{ "canvas": { "width": 320 } }"#).unwrap();

        assert_eq!(config.canvas.width, 320);
        assert_eq!(config.canvas.height, 400);
        assert_eq!(config.melody.steps, 32);
        assert_eq!(config.brushes.swatches[0].color, Rgba::opaque(0, 0, 0xff));
    }

    #[test]
    fn round_trips_through_json() {
        let config = AppConfig::default();
        let text = config.to_json_pretty().unwrap();

        assert!(text.contains("\"#0000ff\""));
        assert_eq!(AppConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn rejects_out_of_range_active_brush() {
        let err = AppConfig::from_json(r#"{ "brushes": { "active": 9 } }"#).unwrap_err();
        assert!(matches!(err, DoodleError::InvalidInput(_)));
    }

    #[test]
    fn rejects_attack_longer_than_note() {
        let mut config = AppConfig::default();
        config.envelope.attack_s = 2.0;

        let err = config.validate().unwrap_err();
        assert!(format!("{err}").contains("attack"));
    }

    #[test]
    fn rejects_bad_colors() {
        let err = AppConfig::from_json(
            r#"{ "brushes": { "swatches": [{ "name": "x", "color": "blue" }] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, DoodleError::Json(_)));
    }

    #[test]
    fn rejects_empty_scale() {
        let err = AppConfig::from_json(r#"{ "melody": { "scale": [] } }"#).unwrap_err();
        assert!(format!("{err}").contains("scale"));
    }
}
