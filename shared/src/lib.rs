pub mod cities;
pub mod error;
pub mod fans;
pub mod geo;
pub mod heat_overlay;
pub mod heat_raster;
pub mod models;
pub mod validation;

pub use error::{ErrorCode, ErrorResponse};
pub use models::*;
pub use validation::*;
pub use geo::{to_raster_xy, to_unit_vector, Vec3};
pub use heat_overlay::{OverlayParams, OverlayParamsUpdate, SphericalHeatOverlay, SurfaceSample};
pub use heat_raster::HeatRasterBuilder;

#[cfg(test)]
mod tests;
