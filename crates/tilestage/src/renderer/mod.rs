// Software rasters and the backend-facing surface contract.
pub mod raster;
pub mod surface;
