pub mod bilinear;
pub mod clip;
mod projection;
mod renderer;
pub mod spatial;
mod target;

pub use projection::{Projection, RotatedPole, Viewport};
pub use renderer::{DrawStats, GridPainter, GridRenderer, PathSegment, RenderSettings, Shape};
pub use spatial::{IndexConfig, SpatialIndex};
pub use target::{DrawTarget, Paint, RecordingTarget, Translated};
