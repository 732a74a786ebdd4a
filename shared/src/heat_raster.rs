//! Equirectangular heat texture built from additive radial splats.
//!
//! Each pixel stores accumulated energy as a fixed-point integer. Splat
//! contributions are quantized before they are added and the addition
//! saturates, so any permutation of the same splats yields a bitwise
//! identical buffer.

use std::io::Cursor;

use image::{ImageOutputFormat, ImageResult, Rgba, RgbaImage};

use crate::geo::to_raster_xy;
use crate::models::WeightedGeoPoint;

pub const DEFAULT_WIDTH: u32 = 1024;
pub const DEFAULT_HEIGHT: u32 = 512;
pub const DEFAULT_SPLAT_RADIUS_PX: f64 = 24.0;

/// Fixed-point scale: an energy of `FIXED_ONE` is full intensity.
pub const FIXED_ONE: u32 = 65_535;

/// Gradient stops as `(offset, alpha factor)`, offset 0 at the splat center.
const FALLOFF_STOPS: [(f64, f64); 3] = [(0.0, 0.75), (0.5, 0.35), (1.0, 0.0)];

fn falloff(t: f64) -> f64 {
    if t >= 1.0 {
        return 0.0;
    }
    FALLOFF_STOPS
        .windows(2)
        .find(|w| t <= w[1].0)
        .map(|w| {
            let (t0, a0) = w[0];
            let (t1, a1) = w[1];
            a0 + (a1 - a0) * (t - t0) / (t1 - t0)
        })
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatRasterBuilder {
    width: u32,
    height: u32,
    energy: Vec<u32>,
}

impl Default for HeatRasterBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl HeatRasterBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            energy: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    /// Composites one radial splat. Longitude wraps across the antimeridian;
    /// rows beyond the poles are clipped.
    pub fn add_splat(&mut self, point: WeightedGeoPoint, radius_px: f64, peak_alpha: f64) {
        let alpha = (peak_alpha * point.weight).clamp(0.0, 1.0);
        if alpha <= 0.0 || !(radius_px > 0.0) || self.energy.is_empty() {
            return;
        }

        let (cx, cy) = to_raster_xy(point.lat, point.lon, self.width, self.height);
        let y0 = ((cy - radius_px).floor() as i64).max(0);
        let y1 = ((cy + radius_px).ceil() as i64).min(i64::from(self.height) - 1);
        let width = i64::from(self.width);
        let (x0, x1) = if 2.0 * radius_px + 2.0 >= f64::from(self.width) {
            // Covers the full circumference; visit each column once.
            (0, width - 1)
        } else {
            ((cx - radius_px).floor() as i64, (cx + radius_px).ceil() as i64)
        };
        let full = f64::from(self.width);
        let half = full / 2.0;

        for py in y0..=y1 {
            let dy = py as f64 + 0.5 - cy;
            for px in x0..=x1 {
                // Shortest horizontal distance around the wrap.
                let dx = (px as f64 + 0.5 - cx + half).rem_euclid(full) - half;
                let dist = dx.hypot(dy);
                if dist >= radius_px {
                    continue;
                }
                let q = (falloff(dist / radius_px) * alpha * f64::from(FIXED_ONE)).round() as u32;
                if q == 0 {
                    continue;
                }
                let idx = (py * width + px.rem_euclid(width)) as usize;
                self.energy[idx] = self.energy[idx].saturating_add(q);
            }
        }
    }

    pub fn add_splats<'a>(
        &mut self,
        points: impl IntoIterator<Item = &'a WeightedGeoPoint>,
        radius_px: f64,
        peak_alpha: f64,
    ) {
        for point in points {
            self.add_splat(*point, radius_px, peak_alpha);
        }
    }

    /// Borrow of the live buffer, row-major, one energy value per pixel.
    /// Clone it before further splats if a frozen copy is needed.
    pub fn snapshot(&self) -> &[u32] {
        &self.energy
    }

    /// Intensity at a pixel, clamped to `[0, 1]`.
    pub fn intensity_at(&self, x: u32, y: u32) -> f64 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        let e = self.energy[(y * self.width + x) as usize];
        (f64::from(e) / f64::from(FIXED_ONE)).min(1.0)
    }

    pub fn total_energy(&self) -> u64 {
        self.energy.iter().map(|&e| u64::from(e)).sum()
    }

    /// Premultiplied red texture: `(i, 0, 0, i)` with `i` the clamped intensity.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let v = (self.intensity_at(x, y) * 255.0).round() as u8;
            Rgba([v, 0, 0, v])
        })
    }

    pub fn encode_png(&self) -> ImageResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.to_rgba_image()
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splats() -> Vec<WeightedGeoPoint> {
        vec![
            WeightedGeoPoint::new(34.0522, -118.2437, 1.0),
            WeightedGeoPoint::new(37.7749, -122.4194, 0.6),
            WeightedGeoPoint::new(40.7128, -74.006, 0.8),
            WeightedGeoPoint::new(36.0, -120.0, 0.3),
            WeightedGeoPoint::new(0.0, 179.9, 1.0),
        ]
    }

    #[test]
    fn falloff_is_monotonic() {
        assert_eq!(falloff(0.0), 0.75);
        assert!((falloff(0.5) - 0.35).abs() < 1e-12);
        assert_eq!(falloff(1.0), 0.0);
        let samples: Vec<f64> = (0..=100).map(|i| falloff(f64::from(i) / 100.0)).collect();
        assert!(samples.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn order_independent() {
        let points = splats();
        let mut forward = HeatRasterBuilder::new(256, 128);
        forward.add_splats(&points, 12.0, 1.0);

        let mut reversed = HeatRasterBuilder::new(256, 128);
        reversed.add_splats(points.iter().rev(), 12.0, 1.0);

        let mut shuffled = HeatRasterBuilder::new(256, 128);
        for i in [3, 0, 4, 2, 1] {
            shuffled.add_splat(points[i], 12.0, 1.0);
        }

        assert_eq!(forward.snapshot(), reversed.snapshot());
        assert_eq!(forward.snapshot(), shuffled.snapshot());
    }

    #[test]
    fn overlapping_splats_intensify() {
        let p = WeightedGeoPoint::new(0.0, 0.0, 0.5);
        let mut once = HeatRasterBuilder::new(360, 180);
        once.add_splat(p, 10.0, 1.0);
        let mut twice = once.clone();
        twice.add_splat(p, 10.0, 1.0);

        let (x, y) = (180, 90);
        assert!(twice.intensity_at(x, y) > once.intensity_at(x, y));
        assert_eq!(twice.total_energy(), once.total_energy() * 2);
    }

    #[test]
    fn zero_weight_is_noop() {
        let mut raster = HeatRasterBuilder::new(64, 32);
        raster.add_splat(WeightedGeoPoint::new(10.0, 10.0, 0.0), 8.0, 1.0);
        raster.add_splat(WeightedGeoPoint::new(10.0, 10.0, 1.0), 0.0, 1.0);
        assert_eq!(raster.total_energy(), 0);
    }

    #[test]
    fn wraps_across_antimeridian() {
        let mut raster = HeatRasterBuilder::new(360, 180);
        raster.add_splat(WeightedGeoPoint::new(0.0, 179.5, 1.0), 6.0, 1.0);
        assert!(raster.intensity_at(359, 90) > 0.0);
        assert!(raster.intensity_at(2, 90) > 0.0);
    }

    #[test]
    fn wide_splat_touches_each_column_once() {
        let mut raster = HeatRasterBuilder::new(16, 8);
        raster.add_splat(WeightedGeoPoint::new(0.0, 0.0, 1.0), 1e6, 1.0);

        for (x, y) in [(0, 0), (8, 4), (15, 7), (3, 5)] {
            assert!((raster.intensity_at(x, y) - 0.75).abs() < 1e-3, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn texture_matches_intensity() {
        let mut raster = HeatRasterBuilder::new(32, 16);
        raster.add_splat(WeightedGeoPoint::new(0.0, 0.0, 1.0), 4.0, 1.0);
        let img = raster.to_rgba_image();
        let px = img.get_pixel(16, 8);
        assert_eq!(px[0], px[3]);
        assert!(px[0] > 0);
        assert_eq!(img.get_pixel(0, 0)[3], 0);

        let png = raster.encode_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
