use doodle_melody_core::{DoodleError, Result, UiEvent};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::view::Frame;

const BRUSH_KEYS: [Key; 9] = [
    Key::Key1,
    Key::Key2,
    Key::Key3,
    Key::Key4,
    Key::Key5,
    Key::Key6,
    Key::Key7,
    Key::Key8,
    Key::Key9,
];

/// Thin wrapper over the minifb window.
pub struct DoodleWindow {
    window: Window,
}

impl DoodleWindow {
    pub fn open(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| DoodleError::Window(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    pub fn present(&mut self, frame: &Frame) -> Result<()> {
        self.window
            .update_with_buffer(&frame.pixels, frame.width, frame.height)
            .map_err(|e| DoodleError::Window(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// Mouse position in window pixels, `None` while outside the window.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// Keyboard equivalents of the toolbar: space or P plays, C clears and
    /// the number keys pick a brush.
    pub fn shortcuts(&self, brushes: usize) -> Vec<UiEvent> {
        let pressed = |key| self.window.is_key_pressed(key, KeyRepeat::No);
        let mut events = Vec::new();

        if pressed(Key::Space) || pressed(Key::P) {
            events.push(UiEvent::Play);
        }
        if pressed(Key::C) {
            events.push(UiEvent::Clear);
        }
        events.extend(
            BRUSH_KEYS
                .iter()
                .take(brushes)
                .enumerate()
                .filter(|(_, key)| pressed(**key))
                .map(|(index, _)| UiEvent::SelectBrush(index)),
        );
        events
    }
}
