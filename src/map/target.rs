use ratatui::style::Color;

use crate::geo::{WorldPoint, WorldRect};

/// Paint state forwarded untouched to the underlying surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paint {
    pub color: Color,
}

impl Paint {
    pub const fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Default for Paint {
    fn default() -> Self {
        Self::new(Color::White)
    }
}

/// The drawing primitives the engine needs from a surface, all in world coordinates.
pub trait DrawTarget {
    fn draw_line(&mut self, a: WorldPoint, b: WorldPoint);

    fn draw_string(&mut self, text: &str, at: WorldPoint);

    fn set_paint(&mut self, paint: Paint);
}

/// One period's copy of a target: shifts everything by `dx` and drops
/// primitives that cannot reach the clip window.
pub struct Translated<'a, T: DrawTarget + ?Sized> {
    inner: &'a mut T,
    dx: f64,
    clip: WorldRect,
}

impl<'a, T: DrawTarget + ?Sized> Translated<'a, T> {
    pub fn new(inner: &'a mut T, dx: f64, clip: WorldRect) -> Self {
        Self { inner, dx, clip }
    }
}

impl<T: DrawTarget + ?Sized> DrawTarget for Translated<'_, T> {
    fn draw_line(&mut self, a: WorldPoint, b: WorldPoint) {
        let (a, b) = (a.translate(self.dx), b.translate(self.dx));
        if self.clip.segment_might_intersect(a, b) {
            self.inner.draw_line(a, b);
        }
    }

    fn draw_string(&mut self, text: &str, at: WorldPoint) {
        let at = at.translate(self.dx);
        if self.clip.contains(at) {
            self.inner.draw_string(text, at);
        }
    }

    fn set_paint(&mut self, paint: Paint) {
        self.inner.set_paint(paint);
    }
}

/// Target that just remembers what it was asked to draw
#[derive(Debug, Default, Clone)]
pub struct RecordingTarget {
    pub lines: Vec<(WorldPoint, WorldPoint)>,
    pub strings: Vec<(String, WorldPoint)>,
    pub paint: Paint,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DrawTarget for RecordingTarget {
    fn draw_line(&mut self, a: WorldPoint, b: WorldPoint) {
        self.lines.push((a, b));
    }

    fn draw_string(&mut self, text: &str, at: WorldPoint) {
        self.strings.push((text.to_string(), at));
    }

    fn set_paint(&mut self, paint: Paint) {
        self.paint = paint;
    }
}
