use doodle_melody_core::UiEvent;

use crate::layout::Layout;

/// Turns the polled mouse state of each frame into pointer events, the way
/// a browser would dispatch them to the canvas and toolbar.
#[derive(Debug, Default)]
pub struct PointerTracker {
    was_down: bool,
    over_canvas: bool,
    last_pos: Option<(f32, f32)>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `pos` is the mouse position in window coordinates, `None` when the
    /// mouse is outside the window.
    pub fn update(&mut self, layout: &Layout, pos: Option<(f32, f32)>, down: bool) -> Vec<UiEvent> {
        let mut events = Vec::new();
        let pressed = down && !self.was_down;
        let released = !down && self.was_down;
        let over_canvas = pos
            .map(|(x, y)| layout.canvas().contains(x, y))
            .unwrap_or(false);

        if self.over_canvas && !over_canvas {
            events.push(UiEvent::PointerLeave);
        }

        if let Some((x, y)) = pos {
            let at = layout.to_canvas(x, y);
            if over_canvas {
                if pressed {
                    events.push(UiEvent::PointerDown(at));
                } else if self.last_pos != pos {
                    events.push(UiEvent::PointerMove(at));
                }
                if released {
                    events.push(UiEvent::PointerUp);
                }
            } else if pressed {
                if let Some(action) = layout.hit(x, y) {
                    events.push(action.event());
                }
            }
        }

        self.was_down = down;
        self.over_canvas = over_canvas;
        self.last_pos = pos;
        events
    }
}
