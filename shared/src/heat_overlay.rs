//! CPU evaluation of the spherical heat overlay: a sum of Gaussian bumps in
//! angular distance that both raises the surface and drives a color ramp.
//!
//! Point storage is a fixed `[_; N]` array plus an active count, so the cost
//! of one surface sample is bounded by `N` no matter what callers submit.

use std::f64::consts::PI;

use crate::geo::{to_unit_vector, Vec3};
use crate::models::WeightedGeoPoint;

pub const DEFAULT_MAX_POINTS: usize = 256;
pub const DEFAULT_SIGMA_DEGREES: f64 = 5.0;
pub const DEFAULT_HEIGHT_FACTOR: f64 = 0.03;
pub const DEFAULT_ALPHA_BAND: (f64, f64) = (0.02, 0.10);

const MIN_SIGMA_RADIANS: f64 = 1e-6;
const MIN_HEIGHT_SCALE: f64 = 1e-6;

const RAMP: [[f64; 3]; 4] = [
    [0.0, 0.2, 1.0], // blue
    [0.0, 1.0, 1.0], // cyan
    [1.0, 1.0, 0.0], // yellow
    [1.0, 0.0, 0.0], // red
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayParams {
    pub base_radius: f64,
    pub sigma_degrees: f64,
    /// World units of displacement per unit of summed weight.
    pub height_scale: f64,
    /// Lifts the whole overlay above the globe surface.
    pub offset: f64,
    /// `sum_w` range over which alpha ramps from 0 to 1.
    pub alpha_band: (f64, f64),
}

impl OverlayParams {
    pub fn for_radius(base_radius: f64) -> Self {
        Self {
            base_radius,
            sigma_degrees: DEFAULT_SIGMA_DEGREES,
            height_scale: (DEFAULT_HEIGHT_FACTOR * base_radius).max(MIN_HEIGHT_SCALE),
            offset: 0.0,
            alpha_band: DEFAULT_ALPHA_BAND,
        }
    }

    pub fn surface_radius(&self) -> f64 {
        self.base_radius + self.offset
    }
}

/// Partial parameter update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlayParamsUpdate {
    pub base_radius: Option<f64>,
    pub sigma_degrees: Option<f64>,
    pub height_scale: Option<f64>,
    pub offset: Option<f64>,
    pub alpha_band: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub normal: Vec3,
    /// Raw Gaussian sum, not clamped.
    pub intensity: f64,
    pub radius: f64,
    pub position: Vec3,
    pub color: [f64; 3],
    pub alpha: f64,
}

pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Piecewise-linear blue → cyan → yellow → red ramp over `[0, 1]`.
pub fn color_ramp(t: f64) -> [f64; 3] {
    let seg = t.clamp(0.0, 1.0) * 3.0;
    let i = (seg.floor() as usize).min(2);
    let f = seg - i as f64;
    let (a, b) = (RAMP[i], RAMP[i + 1]);
    [
        a[0] + (b[0] - a[0]) * f,
        a[1] + (b[1] - a[1]) * f,
        a[2] + (b[2] - a[2]) * f,
    ]
}

#[derive(Debug, Clone)]
pub struct SphericalHeatOverlay<const N: usize = DEFAULT_MAX_POINTS> {
    params: OverlayParams,
    sigma_rad: f64,
    centers: [Vec3; N],
    amps: [f64; N],
    count: usize,
}

impl<const N: usize> SphericalHeatOverlay<N> {
    pub fn new(params: OverlayParams) -> Self {
        Self {
            sigma_rad: sigma_radians(params.sigma_degrees),
            params,
            centers: [Vec3::ZERO; N],
            amps: [0.0; N],
            count: 0,
        }
    }

    pub fn with_radius(base_radius: f64) -> Self {
        Self::new(OverlayParams::for_radius(base_radius))
    }

    pub const fn capacity(&self) -> usize { N }
    pub fn active_count(&self) -> usize { self.count }
    pub fn params(&self) -> &OverlayParams { &self.params }

    /// Replaces the active set with the first `N` points and zeroes the
    /// remaining slots. Returns how many points were taken.
    pub fn set_points(&mut self, points: &[WeightedGeoPoint]) -> usize {
        let count = points.len().min(N);
        for (i, p) in points.iter().take(count).enumerate() {
            self.centers[i] = to_unit_vector(p.lat, p.lon);
            self.amps[i] = p.weight.clamp(0.0, 1.0);
        }
        for i in count..N {
            self.centers[i] = Vec3::ZERO;
            self.amps[i] = 0.0;
        }
        self.count = count;
        count
    }

    pub fn set_params(&mut self, update: OverlayParamsUpdate) {
        if let Some(r) = update.base_radius { self.params.base_radius = r; }
        if let Some(o) = update.offset { self.params.offset = o; }
        if let Some(h) = update.height_scale { self.params.height_scale = h; }
        if let Some(band) = update.alpha_band { self.params.alpha_band = band; }
        if let Some(s) = update.sigma_degrees {
            self.params.sigma_degrees = s;
            self.sigma_rad = sigma_radians(s);
        }
    }

    /// Summed Gaussian weight at the surface direction `normal`.
    pub fn intensity(&self, normal: Vec3) -> f64 {
        let n = normal.normalize();
        let mut sum_w = 0.0;
        for i in 0..N {
            if i >= self.count {
                break;
            }
            let theta = n.dot(self.centers[i]).clamp(-1.0, 1.0).acos();
            let ratio = theta / self.sigma_rad;
            sum_w += self.amps[i] * (-0.5 * ratio * ratio).exp();
        }
        sum_w
    }

    pub fn sample(&self, normal: Vec3) -> SurfaceSample {
        let normal = normal.normalize();
        let intensity = self.intensity(normal);
        let radius = self.params.surface_radius() + intensity * self.params.height_scale;
        let (lo, hi) = self.params.alpha_band;

        SurfaceSample {
            normal,
            intensity,
            radius,
            position: normal.scale(radius),
            color: color_ramp(intensity),
            alpha: smoothstep(lo, hi, intensity),
        }
    }

    pub fn sample_lat_lon(&self, lat: f64, lon: f64) -> SurfaceSample {
        self.sample(to_unit_vector(lat, lon))
    }

    /// Evaluates every vertex of a UV sphere with `(lat_segments + 1) *
    /// (lon_segments + 1)` vertices, rows running from the north pole down.
    pub fn sample_sphere(&self, lat_segments: u32, lon_segments: u32) -> Vec<SurfaceSample> {
        let lat_segments = lat_segments.max(2);
        let lon_segments = lon_segments.max(3);
        let mut samples = Vec::with_capacity(((lat_segments + 1) * (lon_segments + 1)) as usize);

        for iy in 0..=lat_segments {
            let v = f64::from(iy) / f64::from(lat_segments);
            let (sin_v, cos_v) = (v * PI).sin_cos();
            for ix in 0..=lon_segments {
                let u = f64::from(ix) / f64::from(lon_segments);
                let (sin_u, cos_u) = (u * 2.0 * PI).sin_cos();
                samples.push(self.sample(Vec3::new(-cos_u * sin_v, cos_v, sin_u * sin_v)));
            }
        }
        samples
    }
}

fn sigma_radians(sigma_degrees: f64) -> f64 {
    sigma_degrees.to_radians().max(MIN_SIGMA_RADIANS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_overlay_is_flat_and_transparent() {
        let mut overlay = SphericalHeatOverlay::<DEFAULT_MAX_POINTS>::with_radius(1.0);
        overlay.set_points(&[]);
        for s in overlay.sample_sphere(16, 32) {
            assert_eq!(s.intensity, 0.0);
            assert_eq!(s.radius, 1.0);
            assert_eq!(s.alpha, 0.0);
        }
    }

    #[test]
    fn peak_at_point_center() {
        let mut overlay = SphericalHeatOverlay::<8>::with_radius(2.0);
        overlay.set_points(&[WeightedGeoPoint::new(40.0, -74.0, 0.8)]);

        let s = overlay.sample_lat_lon(40.0, -74.0);
        assert!(close(s.intensity, 0.8));
        assert!(close(s.radius, 2.0 + 0.8 * 0.06));
        assert_eq!(s.alpha, 1.0);

        let one_sigma = overlay.sample_lat_lon(45.0, -74.0);
        assert!((one_sigma.intensity - 0.8 * (-0.5f64).exp()).abs() < 1e-6);

        let far = overlay.sample_lat_lon(-40.0, 106.0);
        assert!(far.intensity < 1e-12);
        assert_eq!(far.alpha, 0.0);
    }

    #[test]
    fn stale_slots_are_cleared() {
        let mut overlay = SphericalHeatOverlay::<4>::with_radius(1.0);
        overlay.set_points(&[
            WeightedGeoPoint::new(0.0, 0.0, 1.0),
            WeightedGeoPoint::new(10.0, 10.0, 1.0),
            WeightedGeoPoint::new(-30.0, 60.0, 1.0),
        ]);
        overlay.set_points(&[WeightedGeoPoint::new(0.0, 0.0, 1.0)]);

        assert_eq!(overlay.active_count(), 1);
        assert!(overlay.sample_lat_lon(-30.0, 60.0).intensity < 1e-12);
    }

    #[test]
    fn capacity_bounds_points() {
        let points: Vec<_> = (0..10)
            .map(|i| WeightedGeoPoint::new(0.0, f64::from(i) * 30.0, 1.0))
            .collect();
        let mut overlay = SphericalHeatOverlay::<4>::with_radius(1.0);
        assert_eq!(overlay.set_points(&points), 4);
        assert_eq!(overlay.capacity(), 4);
        assert!(overlay.sample_lat_lon(0.0, 150.0).intensity < 1e-12);
    }

    #[test]
    fn weights_are_clamped() {
        let mut overlay = SphericalHeatOverlay::<2>::with_radius(1.0);
        overlay.set_points(&[
            WeightedGeoPoint::new(0.0, 0.0, 4.0),
            WeightedGeoPoint::new(0.0, 90.0, -1.0),
        ]);
        assert!(close(overlay.sample_lat_lon(0.0, 0.0).intensity, 1.0));
        assert!(overlay.sample_lat_lon(0.0, 90.0).intensity.abs() < 1e-12);
    }

    #[test]
    fn params_update_live() {
        let mut overlay = SphericalHeatOverlay::<2>::with_radius(1.0);
        overlay.set_points(&[WeightedGeoPoint::new(0.0, 0.0, 1.0)]);
        let narrow = overlay.sample_lat_lon(0.0, 8.0).intensity;

        overlay.set_params(OverlayParamsUpdate {
            sigma_degrees: Some(20.0),
            height_scale: Some(0.5),
            base_radius: Some(3.0),
            ..Default::default()
        });
        let wide = overlay.sample_lat_lon(0.0, 8.0);
        assert!(wide.intensity > narrow);
        assert!(close(overlay.sample_lat_lon(0.0, 0.0).radius, 3.5));
        assert_eq!(overlay.active_count(), 1);
    }

    #[test]
    fn ramp_stops() {
        assert_eq!(color_ramp(0.0), RAMP[0]);
        assert_eq!(color_ramp(1.0 / 3.0), RAMP[1]);
        assert_eq!(color_ramp(1.0), RAMP[3]);
        assert_eq!(color_ramp(7.0), RAMP[3]);
        assert_eq!(color_ramp(-1.0), RAMP[0]);
    }

    #[test]
    fn smoothstep_band() {
        assert_eq!(smoothstep(0.02, 0.10, 0.0), 0.0);
        assert_eq!(smoothstep(0.02, 0.10, 0.5), 1.0);
        assert!(close(smoothstep(0.0, 1.0, 0.5), 0.5));
    }

    #[test]
    fn sphere_grid_shape() {
        let overlay = SphericalHeatOverlay::<1>::with_radius(1.0);
        let samples = overlay.sample_sphere(4, 8);
        assert_eq!(samples.len(), 5 * 9);
        assert!(close(samples[0].normal.y, 1.0));
        assert!(close(samples[samples.len() - 1].normal.y, -1.0));
    }
}
