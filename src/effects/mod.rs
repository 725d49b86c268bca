use crate::canvas::{Canvas, Color, Frame, Viewport};
use crossterm::event::Event;
use fastrand::Rng;

pub mod countdown;
pub mod fireworks;
pub mod stickers;

/// Shared state every effect draws into: the logical viewport, the
/// persistent canvas and the random source.
pub struct Stage {
    pub viewport: Viewport,
    pub canvas: Canvas,
    pub rng: Rng,
}

impl Stage {
    pub fn new(viewport: Viewport, background: Color, rng: Rng) -> Self {
        let (cols, rows) = sub_pixels(&viewport);
        Self {
            canvas: Canvas::new(cols, rows, viewport.scale, background),
            viewport,
            rng,
        }
    }

    /// New extents; the canvas is wiped, entities stay where they are.
    pub fn resize(&mut self, viewport: Viewport) {
        let (cols, rows) = sub_pixels(&viewport);
        self.canvas.resize(cols, rows);
        self.viewport = viewport;
    }
}

fn sub_pixels(viewport: &Viewport) -> (usize, usize) {
    (
        (viewport.width / viewport.scale).round() as usize,
        (viewport.height / viewport.scale).round() as usize,
    )
}

pub trait Effect {
    fn update(&mut self, dt: f32, stage: &mut Stage);
    /// Draws transient elements onto the composed frame.
    fn overlay(&self, _frame: &mut Frame, _viewport: &Viewport) {}
    fn handle_event(&mut self, _event: &Event, _stage: &mut Stage) {}
}
