//! Great-circle line rendering onto distorted, longitude-periodic map grids.
//!
//! Geometry given in a map's world frame (or directly in lon/lat) is split
//! along the cells of a curvilinear grid on the sphere. Each piece is mapped
//! into its cell's world quad by inverse bilinear interpolation, and the
//! result is repeated across every visible copy of the world.

pub mod braille;
pub mod data;
pub mod error;
pub mod geo;
pub mod grid;
pub mod map;
pub mod sphere;

pub use error::ConfigError;
