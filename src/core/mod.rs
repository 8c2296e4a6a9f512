//! Engine-wide building blocks shared by every stroke tool.
//!
//! Nothing here knows about individual tools.

pub mod color;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod raster;
