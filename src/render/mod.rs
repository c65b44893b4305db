pub mod canvas;
pub mod compositor;
pub mod projection;
pub mod raster;
