use serde::{Serialize, Deserialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub name: String,
    pub votes: u64,
}

impl City {
    pub fn new(name: impl Into<String>, votes: u64) -> Self {
        Self { name: name.into(), votes }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    Vote,
    NewCity,
}

/// One change notification fanned out to stream listeners.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteUpdate {
    pub kind: UpdateKind,
    pub city: String,
    pub votes: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl VoteUpdate {
    pub fn now(kind: UpdateKind, city: &City) -> Self {
        Self {
            kind,
            city: city.name.clone(),
            votes: city.votes,
            timestamp: unix_millis(OffsetDateTime::now_utc()),
        }
    }
}

pub fn unix_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightedGeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub weight: f64,
}

impl WeightedGeoPoint {
    pub const fn new(lat: f64, lon: f64, weight: f64) -> Self {
        Self { lat, lon, weight }
    }
}

/// A free-standing heat contribution submitted through the heatmap API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
}

impl HeatPoint {
    /// Missing intensity counts as full weight.
    pub fn to_weighted(self) -> WeightedGeoPoint {
        WeightedGeoPoint::new(self.lat, self.lng, self.intensity.unwrap_or(1.0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub city: String,
    pub email: String,
    #[serde(default)]
    pub consent: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(default)]
    pub consent: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatPointRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub intensity: Option<f64>,
    pub location_string: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitiesResponse {
    pub cities: Vec<City>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub ok: bool,
    pub duplicate: bool,
    pub cities: Vec<City>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCityResponse {
    pub ok: bool,
    pub is_new_city: bool,
    pub duplicate: bool,
    pub cities: Vec<City>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatPointsResponse {
    pub points: Vec<HeatPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedPointsResponse {
    pub points: Vec<WeightedGeoPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySearchResponse {
    pub cities: Vec<String>,
}
