use ratatui::style::Color;

use super::raster::{draw_line, draw_marker};
use super::BrailleCanvas;
use crate::geo::WorldPoint;
use crate::map::{DrawTarget, Paint, Viewport};

/// Text placed on a character cell
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub col: u16,
    pub row: u16,
    pub text: String,
    pub color: Color,
}

/// Draw target that rasterizes world lines onto braille canvases, one per colour
pub struct BrailleTarget {
    viewport: Viewport,
    cols: usize,
    rows: usize,
    layers: Vec<(Color, BrailleCanvas)>,
    labels: Vec<Label>,
    paint: Paint,
}

impl BrailleTarget {
    /// Canvas sized to the viewport's pixel dimensions
    pub fn new(viewport: Viewport) -> Self {
        let cols = viewport.width.div_ceil(2);
        let rows = viewport.height.div_ceil(4);
        Self {
            viewport,
            cols,
            rows,
            layers: Vec::new(),
            labels: Vec::new(),
            paint: Paint::default(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Canvases in the order their colours were first used
    pub fn layers(&self) -> impl Iterator<Item = (Color, &BrailleCanvas)> {
        self.layers.iter().map(|(color, canvas)| (*color, canvas))
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    fn canvas(&mut self) -> &mut BrailleCanvas {
        let color = self.paint.color;
        let idx = match self.layers.iter().position(|(c, _)| *c == color) {
            Some(idx) => idx,
            None => {
                self.layers.push((color, BrailleCanvas::new(self.cols, self.rows)));
                self.layers.len() - 1
            }
        };
        &mut self.layers[idx].1
    }
}

impl DrawTarget for BrailleTarget {
    fn draw_line(&mut self, a: WorldPoint, b: WorldPoint) {
        let p0 = self.viewport.world_to_pixel(a);
        let p1 = self.viewport.world_to_pixel(b);
        if !self.viewport.line_might_be_visible(p0, p1) {
            return;
        }
        draw_line(self.canvas(), p0.0, p0.1, p1.0, p1.1);
    }

    fn draw_string(&mut self, text: &str, at: WorldPoint) {
        let (px, py) = self.viewport.world_to_pixel(at);
        if !self.viewport.is_visible(px, py) {
            return;
        }
        draw_marker(self.canvas(), px, py, 1);

        if px < 0 || py < 0 {
            return;
        }
        // Braille pixels to character cells, text just right of the marker
        let col = (px / 2) as u16;
        let row = (py / 4) as u16;
        if let Some(col) = col.checked_add(2) {
            self.labels.push(Label {
                col,
                row,
                text: text.to_string(),
                color: self.paint.color,
            });
        }
    }

    fn set_paint(&mut self, paint: Paint) {
        self.paint = paint;
    }
}
