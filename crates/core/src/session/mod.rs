//! Event dispatch tying the drawing surface, brushes and audio together.

use crate::{
    AppConfig, AudioBackend, AudioEngine, BrushPalette, MelodyScanner, NoteEvent, Point, Result,
    Surface,
};

/// Everything the user can do to the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp,
    PointerLeave,
    Play,
    Clear,
    SelectBrush(usize),
}

/// Single owner of the drawing surface, the brush palette and the audio
/// engine. Events are applied one at a time in arrival order.
#[derive(Debug)]
pub struct Session {
    surface: Surface,
    palette: BrushPalette,
    scanner: MelodyScanner,
    audio: AudioEngine,
}

impl Session {
    pub fn new(config: &AppConfig, backend: AudioBackend) -> Result<Self> {
        config.validate()?;
        let palette = BrushPalette::from_config(&config.brushes)?;
        Ok(Self {
            surface: Surface::new(&config.canvas, palette.active_color()),
            palette,
            scanner: MelodyScanner::new(&config.melody),
            audio: AudioEngine::new(backend, &config.audio, &config.envelope),
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn palette(&self) -> &BrushPalette {
        &self.palette
    }

    pub fn audio(&self) -> &AudioEngine {
        &self.audio
    }

    pub fn handle(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::PointerDown(at) => self.surface.pointer_down(at),
            UiEvent::PointerMove(to) => {
                self.surface.pointer_move(to);
            }
            UiEvent::PointerUp => self.surface.pointer_up(),
            UiEvent::PointerLeave => self.surface.pointer_leave(),
            UiEvent::Play => {
                self.play_melody()?;
            }
            UiEvent::Clear => self.clear(),
            UiEvent::SelectBrush(index) => self.select_brush(index)?,
        }
        Ok(())
    }

    /// Scans the current drawing and hands the notes to the audio engine.
    /// Returns the notes derived from the canvas, whether or not audio output
    /// is available.
    pub fn play_melody(&mut self) -> Result<Vec<NoteEvent>> {
        let notes = self.scanner.scan(self.surface.pixels());
        let scheduled = self.audio.play(&notes)?;
        tracing::info!(notes = notes.len(), scheduled, "playing melody");
        Ok(notes)
    }

    pub fn clear(&mut self) {
        self.surface.clear();
        tracing::debug!("canvas cleared");
    }

    pub fn select_brush(&mut self, index: usize) -> Result<()> {
        let color = self.palette.select(index)?;
        self.surface.set_color(color);
        tracing::debug!(index, %color, "brush selected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DoodleError, Rgba};

    fn session() -> Session {
        let mut config = AppConfig::default();
        config.canvas.width = 320;
        config.canvas.height = 200;
        config.audio.offline_sample_rate = 8_000;
        Session::new(&config, AudioBackend::offline(&config.audio)).unwrap()
    }

    fn drag(session: &mut Session, points: &[(f32, f32)]) {
        let (x, y) = points[0];
        session.handle(UiEvent::PointerDown(Point::new(x, y))).unwrap();
        for &(x, y) in &points[1..] {
            session.handle(UiEvent::PointerMove(Point::new(x, y))).unwrap();
        }
        session.handle(UiEvent::PointerUp).unwrap();
    }

    #[test]
    fn blank_canvas_plays_nothing() {
        let mut session = session();
        assert!(session.play_melody().unwrap().is_empty());
        assert!(!session.audio().is_context_created());
    }

    #[test]
    fn horizontal_line_plays_one_note_per_covered_step() {
        let mut session = session();
        // Topmost painted row is 22, which falls in the second-highest band.
        drag(&mut session, &[(0.0, 25.0), (319.0, 25.0)]);

        let notes = session.play_melody().unwrap();
        assert_eq!(notes.len(), 32);
        assert!(notes.iter().all(|n| n.frequency_hz == 783.99));
        assert!(session.audio().is_context_created());
    }

    #[test]
    fn repeated_plays_stack_without_recreating_audio() {
        let mut session = session();
        drag(&mut session, &[(0.0, 100.0), (40.0, 100.0)]);

        session.handle(UiEvent::Play).unwrap();
        let synth = session.audio().context().unwrap().synth();
        let first = synth.lock().unwrap().pending();

        session.handle(UiEvent::Play).unwrap();
        let again = session.audio().context().unwrap().synth();
        assert!(std::sync::Arc::ptr_eq(&synth, &again));
        assert_eq!(again.lock().unwrap().pending(), first * 2);
    }

    #[test]
    fn next_stroke_uses_selected_brush() {
        let mut session = session();
        session.handle(UiEvent::SelectBrush(1)).unwrap();
        drag(&mut session, &[(10.0, 10.0), (20.0, 10.0)]);

        let red = session.palette().active_color();
        assert_eq!(red, Rgba::opaque(0xff, 0, 0));
        assert_eq!(session.surface().color(), red);
        assert_eq!(session.surface().pixels().get(15, 10), Some(red));
        assert_eq!(session.palette().iter().filter(|(_, _, a)| *a).count(), 1);
    }

    #[test]
    fn unknown_brush_is_an_error() {
        let mut session = session();
        let err = session.handle(UiEvent::SelectBrush(99)).unwrap_err();
        assert!(matches!(err, DoodleError::InvalidInput(_)));
        assert!(session.palette().is_active(0));
    }

    #[test]
    fn clear_then_play_is_silent() {
        let mut session = session();
        drag(&mut session, &[(0.0, 50.0), (300.0, 60.0)]);
        session.handle(UiEvent::Clear).unwrap();

        assert!(session.surface().pixels().is_blank());
        assert!(session.play_melody().unwrap().is_empty());
    }

    #[test]
    fn leaving_the_canvas_ends_the_stroke() {
        let mut session = session();
        session.handle(UiEvent::PointerDown(Point::new(10.0, 10.0))).unwrap();
        session.handle(UiEvent::PointerLeave).unwrap();
        session.handle(UiEvent::PointerMove(Point::new(100.0, 100.0))).unwrap();

        assert!(session.surface().pixels().is_blank());
    }
}
