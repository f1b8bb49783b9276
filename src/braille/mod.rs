mod canvas;
mod raster;
mod target;

pub use canvas::BrailleCanvas;
pub use target::{BrailleTarget, Label};
