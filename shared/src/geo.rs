use serde::{Deserialize, Serialize};

/// Unit-sphere / world-space vector, Y-up.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn scale(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Returns the zero vector unchanged.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            self
        } else {
            self.scale(1.0 / len)
        }
    }
}

/// Latitude/longitude in degrees to a unit vector.
///
/// `(0, 0)` maps to `+X`, the north pole to `+Y` and `(0, 90)` to `+Z`.
/// Inputs are not range-checked.
pub fn to_unit_vector(lat_deg: f64, lon_deg: f64) -> Vec3 {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let cos_lat = lat.cos();

    // cos(90°) is not exactly zero in floating point; pin the poles.
    if lat_deg.abs() == 90.0 {
        return Vec3::new(0.0, lat_deg.signum(), 0.0);
    }

    Vec3::new(cos_lat * lon.cos(), lat.sin(), cos_lat * lon.sin()).normalize()
}

/// Equirectangular mapping onto a `width` x `height` raster.
pub fn to_raster_xy(lat_deg: f64, lon_deg: f64, width: u32, height: u32) -> (f64, f64) {
    let x = (lon_deg + 180.0) / 360.0 * f64::from(width);
    let y = (90.0 - lat_deg) / 180.0 * f64::from(height);
    (x, y)
}

/// Deterministic stand-in geocoder: hashes a free-form location string to
/// a point with latitude in [-85, 85] and longitude in [-180, 180].
pub fn hash_geocode(query: &str) -> (f64, f64) {
    let hash = query
        .encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)));

    let lat = f64::from(hash % 17_000) / 100.0 - 85.0;
    let lon = f64::from((hash >> 8) % 36_000) / 100.0 - 180.0;
    (lat, lon)
}
