pub mod composite;
pub mod engine;
pub mod geometry;
pub mod paint;
pub(crate) mod raster;
pub mod surface;
