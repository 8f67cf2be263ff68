//! Window geometry: the canvas sits at the top-left, the toolbar below it.

use doodle_melody_core::{CanvasConfig, Point, UiEvent};

pub const TOOLBAR_HEIGHT: usize = 48;
const BUTTON_SIZE: usize = 32;
const GAP: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x as f32
            && y >= self.y as f32
            && x < (self.x + self.width) as f32
            && y < (self.y + self.height) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Play,
    Clear,
    Brush(usize),
}

impl ToolbarAction {
    pub fn event(self) -> UiEvent {
        match self {
            ToolbarAction::Play => UiEvent::Play,
            ToolbarAction::Clear => UiEvent::Clear,
            ToolbarAction::Brush(index) => UiEvent::SelectBrush(index),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    canvas: Rect,
    buttons: Vec<(Rect, ToolbarAction)>,
    width: usize,
    height: usize,
}

impl Layout {
    pub fn new(canvas: &CanvasConfig, swatches: usize) -> Self {
        let canvas_rect = Rect {
            x: 0,
            y: 0,
            width: canvas.width,
            height: canvas.height,
        };
        let top = canvas.height + (TOOLBAR_HEIGHT - BUTTON_SIZE) / 2;
        let button_at = |slot: usize, extra_gap: usize| Rect {
            x: GAP + slot * (BUTTON_SIZE + GAP) + extra_gap,
            y: top,
            width: BUTTON_SIZE,
            height: BUTTON_SIZE,
        };

        let mut buttons = vec![
            (button_at(0, 0), ToolbarAction::Play),
            (button_at(1, 0), ToolbarAction::Clear),
        ];
        // Swatches are set apart from the two command buttons.
        buttons.extend(
            (0..swatches).map(|index| (button_at(index + 2, GAP * 2), ToolbarAction::Brush(index))),
        );

        // The toolbar may be wider than a narrow canvas.
        let toolbar_width = buttons
            .last()
            .map(|(rect, _)| rect.x + rect.width + GAP)
            .unwrap_or(0);

        Self {
            canvas: canvas_rect,
            buttons,
            width: canvas.width.max(toolbar_width),
            height: canvas.height + TOOLBAR_HEIGHT,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn canvas(&self) -> Rect {
        self.canvas
    }

    pub fn buttons(&self) -> &[(Rect, ToolbarAction)] {
        &self.buttons
    }

    /// Window position translated into canvas coordinates.
    pub fn to_canvas(&self, x: f32, y: f32) -> Point {
        Point::new(x - self.canvas.x as f32, y - self.canvas.y as f32)
    }

    pub fn hit(&self, x: f32, y: f32) -> Option<ToolbarAction> {
        self.buttons
            .iter()
            .find(|(rect, _)| rect.contains(x, y))
            .map(|(_, action)| *action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        let canvas = CanvasConfig {
            width: 400,
            height: 200,
            stroke_width: 5.0,
        };
        Layout::new(&canvas, 4)
    }

    #[test]
    fn window_fits_canvas_and_toolbar() {
        let layout = layout();
        assert_eq!((layout.width(), layout.height()), (400, 200 + TOOLBAR_HEIGHT));
        assert_eq!(layout.buttons().len(), 6);
    }

    #[test]
    fn hit_tests_each_button() {
        let layout = layout();
        for (rect, action) in layout.buttons() {
            let (x, y) = (rect.x as f32 + 1.0, rect.y as f32 + 1.0);
            assert_eq!(layout.hit(x, y), Some(*action));
        }
        assert_eq!(layout.hit(5.0, 5.0), None);
        assert_eq!(layout.hit(399.0, 247.0), None);
    }

    #[test]
    fn buttons_do_not_overlap_the_canvas() {
        let layout = layout();
        let canvas = layout.canvas();
        for (rect, _) in layout.buttons() {
            assert!(rect.y >= canvas.y + canvas.height);
        }
    }

    #[test]
    fn window_widens_to_fit_the_toolbar() {
        let canvas = CanvasConfig {
            width: 50,
            height: 40,
            ..CanvasConfig::default()
        };
        let layout = Layout::new(&canvas, 4);
        assert!(layout.width() > canvas.width);
        assert_eq!(layout.canvas().width, 50);
        for (rect, _) in layout.buttons() {
            assert!(rect.x + rect.width <= layout.width());
        }

        let wide = Layout::new(&CanvasConfig::default(), 4);
        assert_eq!(wide.width(), CanvasConfig::default().width);
    }

    #[test]
    fn actions_map_to_ui_events() {
        assert_eq!(ToolbarAction::Play.event(), UiEvent::Play);
        assert_eq!(ToolbarAction::Brush(2).event(), UiEvent::SelectBrush(2));
    }
}
