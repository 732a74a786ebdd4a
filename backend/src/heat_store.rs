use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use shared::geo::hash_geocode;
use shared::heat_raster::HeatRasterBuilder;
use shared::models::{HeatPoint, HeatPointRequest};
use shared::validation::{validate_heat_point_request, HeatPointSource, ValidationError};
use tracing::{debug, error};

/// Peak alpha of a full-weight point in the rendered texture.
pub const TEXTURE_PEAK_ALPHA: f64 = 1.0;

pub const DEFAULT_MAX_HEAT_POINTS: usize = 1_000;

/// Free-standing heat points submitted through the heatmap endpoints.
/// Holds at most `max_points`; the oldest point is evicted first.
pub struct HeatPointStore {
    points: Mutex<VecDeque<HeatPoint>>,
    max_points: usize,
}

impl Default for HeatPointStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEAT_POINTS)
    }
}

impl HeatPointStore {
    pub fn new(max_points: usize) -> Self {
        let max_points = max_points.max(1);
        Self {
            points: Mutex::new(VecDeque::with_capacity(max_points.min(DEFAULT_MAX_HEAT_POINTS))),
            max_points,
        }
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<HeatPoint>> {
        self.points.lock().unwrap_or_else(|poisoned| {
            error!("Heat point lock poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// Validates and stores one point. Location strings are geocoded
    /// deterministically and carry no intensity.
    pub fn add(&self, request: &HeatPointRequest) -> Result<HeatPoint, ValidationError> {
        let point = match validate_heat_point_request(request)? {
            HeatPointSource::Coordinates { lat, lng, intensity } => HeatPoint { lat, lng, intensity },
            HeatPointSource::Location(location) => {
                let (lat, lng) = hash_geocode(&location);
                debug!("Geocoded {:?} to ({:.2}, {:.2})", location, lat, lng);
                HeatPoint { lat, lng, intensity: None }
            }
        };

        let mut points = self.lock();
        if points.len() >= self.max_points {
            points.pop_front();
        }
        points.push_back(point);
        Ok(point)
    }

    /// Oldest first.
    pub fn points(&self) -> Vec<HeatPoint> {
        self.lock().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn render_texture(&self, width: u32, height: u32, radius_px: f64) -> HeatRasterBuilder {
        let weighted: Vec<_> = self.lock().iter().map(|p| p.to_weighted()).collect();
        let mut builder = HeatRasterBuilder::new(width, height);
        builder.add_splats(&weighted, radius_px, TEXTURE_PEAK_ALPHA);
        builder
    }
}
