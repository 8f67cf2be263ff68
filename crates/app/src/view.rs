//! Software rendering of the window: canvas over a white page, toolbar below.

use doodle_melody_core::{Rgba, Session};

use crate::layout::{Layout, Rect, ToolbarAction};

const TOOLBAR_BG: u32 = 0x00_E8_E8_E8;
const BUTTON_BG: u32 = 0x00_FF_FF_FF;
const BUTTON_BORDER: u32 = 0x00_90_90_90;
const PLAY_ICON: u32 = 0x00_20_A0_40;
const CLEAR_ICON: u32 = 0x00_C0_30_30;
const ACTIVE_MARKER: u32 = 0x00_20_20_20;

/// `0x00RRGGBB` framebuffer handed to the window.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    #[inline]
    fn put(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: u32) {
        for y in rect.y..(rect.y + rect.height).min(self.height) {
            for x in rect.x..(rect.x + rect.width).min(self.width) {
                self.pixels[y * self.width + x] = color;
            }
        }
    }

    fn outline_rect(&mut self, rect: Rect, thickness: usize, color: u32) {
        let t = thickness.min(rect.width / 2).min(rect.height / 2);
        let strips = [
            Rect { height: t, ..rect },
            Rect { y: rect.y + rect.height - t, height: t, ..rect },
            Rect { width: t, ..rect },
            Rect { x: rect.x + rect.width - t, width: t, ..rect },
        ];
        for strip in strips {
            self.fill_rect(strip, color);
        }
    }

    /// Bresenham line, one pixel wide.
    fn line(&mut self, from: (i32, i32), to: (i32, i32), color: u32) {
        let (mut x0, mut y0) = from;
        let (x1, y1) = to;
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Right-pointing triangle inscribed in `rect` with a margin.
    fn play_icon(&mut self, rect: Rect, color: u32) {
        let margin = rect.width / 4;
        let (left, top) = (rect.x + margin, rect.y + margin);
        let size = rect.height - 2 * margin;
        let half = size / 2;
        for row in 0..size {
            let reach = if row <= half { row } else { size - row };
            for col in 0..=reach {
                self.put((left + col) as i32, (top + row) as i32, color);
            }
        }
    }

    fn cross_icon(&mut self, rect: Rect, color: u32) {
        let margin = (rect.width / 4) as i32;
        let (x0, y0) = (rect.x as i32 + margin, rect.y as i32 + margin);
        let (x1, y1) = (
            (rect.x + rect.width) as i32 - margin - 1,
            (rect.y + rect.height) as i32 - margin - 1,
        );
        for offset in 0..2 {
            self.line((x0 + offset, y0), (x1 + offset, y1), color);
            self.line((x0 + offset, y1), (x1 + offset, y0), color);
        }
    }
}

/// Redraws the whole window from the session state.
pub fn compose(frame: &mut Frame, session: &Session, layout: &Layout) {
    let canvas = layout.canvas();
    let pixels = session.surface().pixels();
    for y in 0..canvas.height.min(frame.height) {
        for x in 0..canvas.width.min(frame.width) {
            let color = pixels.get(x, y).unwrap_or(Rgba::TRANSPARENT);
            frame.pixels[(canvas.y + y) * frame.width + canvas.x + x] =
                color.over(Rgba::WHITE).to_rgb_u32();
        }
    }

    frame.fill_rect(
        Rect {
            x: canvas.x + canvas.width,
            y: canvas.y,
            width: frame.width.saturating_sub(canvas.x + canvas.width),
            height: canvas.height,
        },
        TOOLBAR_BG,
    );
    frame.fill_rect(
        Rect {
            x: 0,
            y: canvas.y + canvas.height,
            width: frame.width,
            height: frame.height.saturating_sub(canvas.y + canvas.height),
        },
        TOOLBAR_BG,
    );

    let palette = session.palette();
    for (rect, action) in layout.buttons() {
        match action {
            ToolbarAction::Play => {
                frame.fill_rect(*rect, BUTTON_BG);
                frame.outline_rect(*rect, 1, BUTTON_BORDER);
                frame.play_icon(*rect, PLAY_ICON);
            }
            ToolbarAction::Clear => {
                frame.fill_rect(*rect, BUTTON_BG);
                frame.outline_rect(*rect, 1, BUTTON_BORDER);
                frame.cross_icon(*rect, CLEAR_ICON);
            }
            ToolbarAction::Brush(index) => {
                let Some((_, swatch, active)) = palette.iter().nth(*index) else {
                    continue;
                };
                frame.fill_rect(*rect, swatch.color.over(Rgba::WHITE).to_rgb_u32());
                if active {
                    frame.outline_rect(*rect, 3, ACTIVE_MARKER);
                } else {
                    frame.outline_rect(*rect, 1, BUTTON_BORDER);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doodle_melody_core::{AppConfig, AudioBackend, Point, UiEvent};

    fn setup() -> (Session, Layout, Frame) {
        let mut config = AppConfig::default();
        config.canvas.width = 300;
        config.canvas.height = 100;
        let session = Session::new(&config, AudioBackend::Offline { sample_rate: 8_000 }).unwrap();
        let layout = Layout::new(&config.canvas, session.palette().len());
        let frame = Frame::new(layout.width(), layout.height());
        (session, layout, frame)
    }

    fn at(frame: &Frame, x: usize, y: usize) -> u32 {
        frame.pixels[y * frame.width + x]
    }

    #[test]
    fn blank_canvas_shows_white_page() {
        let (session, layout, mut frame) = setup();
        compose(&mut frame, &session, &layout);

        assert!(frame.pixels[..300 * 100].iter().all(|p| *p == 0x00_FF_FF_FF));
        assert_eq!(at(&frame, 299, 105), TOOLBAR_BG);
    }

    #[test]
    fn strokes_show_in_brush_color() {
        let (mut session, layout, mut frame) = setup();
        session.handle(UiEvent::PointerDown(Point::new(10.0, 50.0))).unwrap();
        session.handle(UiEvent::PointerMove(Point::new(60.0, 50.0))).unwrap();
        compose(&mut frame, &session, &layout);

        assert_eq!(at(&frame, 30, 50), 0x00_00_00_FF);
    }

    #[test]
    fn only_active_swatch_is_marked() {
        let (mut session, layout, mut frame) = setup();
        session.handle(UiEvent::SelectBrush(2)).unwrap();
        compose(&mut frame, &session, &layout);

        let markers: Vec<usize> = layout
            .buttons()
            .iter()
            .filter_map(|(rect, action)| match action {
                ToolbarAction::Brush(index) => Some((*index, *rect)),
                _ => None,
            })
            .filter(|(_, rect)| at(&frame, rect.x + 2, rect.y + 2) == ACTIVE_MARKER)
            .map(|(index, _)| index)
            .collect();
        assert_eq!(markers, vec![2]);
    }
}
