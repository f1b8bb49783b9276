/// Errors from validating index or grid configuration.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    /// Longitude bin size must divide 360 evenly
    #[error("longitude bin size {0} does not evenly divide 360")]
    LonBinSize(u32),
    /// Latitude bin size must divide 180 evenly
    #[error("latitude bin size {0} does not evenly divide 180")]
    LatBinSize(u32),
    /// A grid needs at least one column and one row
    #[error("grid must have at least one column and one row (got {0}x{1})")]
    EmptyGrid(usize, usize),
    /// World extent is inverted or outside the base period / latitude range
    #[error("invalid world extent x=[{0}, {1}] y=[{2}, {3}]")]
    BadExtent(f64, f64, f64, f64),
}
