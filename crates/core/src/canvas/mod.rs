//! Drawing surface: an RGBA pixel grid plus the pointer state machine that
//! turns mouse drags into round-capped strokes.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{config::CanvasConfig, DoodleError, Result};

/// 8-bit RGBA color. Serialised as `#rrggbb` (or `#rrggbbaa` when not opaque).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const WHITE: Self = Self::opaque(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xff)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Packs the color channels as `0x00RRGGBB`, dropping alpha.
    pub fn to_rgb_u32(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Source-over compositing onto an opaque background.
    pub fn over(self, background: Rgba) -> Rgba {
        let alpha = u32::from(self.a);
        let mix = |fg: u8, bg: u8| -> u8 {
            ((u32::from(fg) * alpha + u32::from(bg) * (255 - alpha) + 127) / 255) as u8
        };
        Rgba::opaque(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Rgba {
    type Err = DoodleError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix('#')
            .filter(|hex| {
                (hex.len() == 6 || hex.len() == 8) && hex.bytes().all(|b| b.is_ascii_hexdigit())
            })
            .ok_or_else(|| DoodleError::invalid(format!("`{s}` is not a #rrggbb color")))?;

        let channel = |index: usize| {
            u8::from_str_radix(&hex[index * 2..index * 2 + 2], 16)
                .map_err(|_| DoodleError::invalid(format!("`{s}` is not a #rrggbb color")))
        };

        let alpha = if hex.len() == 8 { channel(3)? } else { 0xff };
        Ok(Rgba::new(channel(0)?, channel(1)?, channel(2)?, alpha))
    }
}

impl TryFrom<String> for Rgba {
    type Error = DoodleError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

/// Canvas-relative position. Pixel `(x, y)` covers `[x, x + 1) × [y, y + 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Row-major grid of RGBA pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    /// Creates a fully transparent buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Writes a pixel; coordinates outside the buffer are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: Rgba) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(Rgba::is_transparent)
    }

    /// Paints every pixel whose centre lies within `width / 2` of the segment
    /// `from..to`. The distance test gives round caps at both ends.
    pub fn stroke_segment(&mut self, from: Point, to: Point, width: f32, color: Rgba) {
        let radius = width * 0.5;
        if !(radius > 0.0) || self.pixels.is_empty() {
            return;
        }

        let min_x = (from.x.min(to.x) - radius).floor().max(0.0);
        let min_y = (from.y.min(to.y) - radius).floor().max(0.0);
        let max_x = (from.x.max(to.x) + radius).ceil().min(self.width as f32 - 1.0);
        let max_y = (from.y.max(to.y) + radius).ceil().min(self.height as f32 - 1.0);
        if min_x > max_x || min_y > max_y {
            return;
        }

        let radius_sq = radius * radius;
        for y in min_y as usize..=max_y as usize {
            for x in min_x as usize..=max_x as usize {
                let centre = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_sq_to_segment(centre, from, to) <= radius_sq {
                    self.pixels[y * self.width + x] = color;
                }
            }
        }
    }
}

fn distance_sq_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (px, py) = (a.x + t * dx - p.x, a.y + t * dy - p.y);
    px * px + py * py
}

/// Pointer-driven drawing surface.
///
/// While the pointer is down each move draws one independent segment from
/// the previous point, then moves the path cursor to the new point. Leaving
/// the surface or releasing the pointer ends the stroke.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: PixelBuffer,
    stroke_width: f32,
    color: Rgba,
    drawing: bool,
    last_point: Option<Point>,
}

impl Surface {
    pub fn new(config: &CanvasConfig, color: Rgba) -> Self {
        Self {
            pixels: PixelBuffer::new(config.width, config.height),
            stroke_width: config.stroke_width,
            color,
            drawing: false,
            last_point: None,
        }
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn pointer_down(&mut self, at: Point) {
        self.drawing = true;
        self.last_point = Some(at);
    }

    /// Returns `true` when a segment was drawn.
    pub fn pointer_move(&mut self, to: Point) -> bool {
        if !self.drawing {
            return false;
        }

        let from = self.last_point.replace(to).unwrap_or(to);
        self.pixels
            .stroke_segment(from, to, self.stroke_width, self.color);
        true
    }

    pub fn pointer_up(&mut self) {
        self.end_stroke();
    }

    pub fn pointer_leave(&mut self) {
        self.end_stroke();
    }

    pub fn clear(&mut self) {
        self.pixels.clear();
    }

    fn end_stroke(&mut self) {
        self.drawing = false;
        self.last_point = None;
    }
}
