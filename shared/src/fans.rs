use serde::{Serialize, Deserialize};
use std::collections::HashMap;

use crate::models::WeightedGeoPoint;

/// Perceptual compression applied to fan counts before they become weights.
pub const FAN_WEIGHT_GAMMA: f64 = 0.7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CityFan {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub fans: f64,
}

impl CityFan {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64, fans: f64) -> Self {
        Self { name: name.into(), lat, lon, fans }
    }
}

pub fn demo_fans() -> Vec<CityFan> {
    vec![
        CityFan::new("Los Angeles", 34.0522, -118.2437, 12_450.0),
        CityFan::new("New York", 40.7128, -74.006, 16_800.0),
        CityFan::new("Mexico City", 19.4326, -99.1332, 9_400.0),
        CityFan::new("San Francisco", 37.7749, -122.4194, 8_100.0),
    ]
}

/// `weight = (fans / max_fans) ^ 0.7`, negatives treated as zero.
pub fn fans_to_points(fans: &[CityFan]) -> Vec<WeightedGeoPoint> {
    let max_fans = fans.iter().map(|f| f.fans).fold(0.0, f64::max);
    let max_fans = if max_fans > 0.0 { max_fans } else { 1.0 };

    fans.iter()
        .map(|f| WeightedGeoPoint::new(f.lat, f.lon, (f.fans.max(0.0) / max_fans).powf(FAN_WEIGHT_GAMMA)))
        .collect()
}

/// Sums fan counts of entries whose coordinates agree to 4 decimal places.
/// The first entry seen at a location keeps its name and position.
pub fn merge_fans(input: &[CityFan]) -> Vec<CityFan> {
    let mut merged: Vec<CityFan> = Vec::with_capacity(input.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for f in input {
        let key = format!("{:.4},{:.4}", f.lat, f.lon);
        match index.get(&key).copied() {
            Some(i) => merged[i].fans += f.fans,
            None => {
                index.insert(key, merged.len());
                merged.push(f.clone());
            }
        }
    }
    merged
}
