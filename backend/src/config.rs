use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use shared::heat_raster::{DEFAULT_HEIGHT, DEFAULT_SPLAT_RADIUS_PX, DEFAULT_WIDTH};
use shared::models::City;
use tracing::warn;

use crate::heat_store::DEFAULT_MAX_HEAT_POINTS;
use crate::hub::{DEFAULT_HISTORY_CAPACITY, DEFAULT_REPLAY_LEN, MAX_HISTORY_CAPACITY, MIN_HISTORY_CAPACITY};
use crate::rate_limiter::{DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_MINUTES};

pub const DEFAULT_KEEPALIVE_SECONDS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub vote_rate_limit_max: u32,
    pub vote_rate_limit_window_minutes: i64,
    pub history_capacity: usize,
    pub replay_len: usize,
    pub keepalive: Duration,
    pub seed_demo_cities: bool,
    pub city_snapshot: Option<Vec<City>>,
    pub heat_texture_width: u32,
    pub heat_texture_height: u32,
    pub heat_splat_radius_px: f64,
    pub heat_max_points: usize,
    pub allowed_origin_prefix: String,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vote_rate_limit_max: DEFAULT_MAX_ATTEMPTS,
            vote_rate_limit_window_minutes: DEFAULT_WINDOW_MINUTES,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            replay_len: DEFAULT_REPLAY_LEN,
            keepalive: Duration::from_secs(DEFAULT_KEEPALIVE_SECONDS),
            seed_demo_cities: true,
            city_snapshot: None,
            heat_texture_width: DEFAULT_WIDTH,
            heat_texture_height: DEFAULT_HEIGHT,
            heat_splat_radius_px: DEFAULT_SPLAT_RADIUS_PX,
            heat_max_points: DEFAULT_MAX_HEAT_POINTS,
            allowed_origin_prefix: "http://localhost".into(),
            log_filter: "info".into(),
        }
    }
}

impl AppConfig {
    /// Builds a config from a key lookup (secret store, environment, ...).
    /// Missing keys keep their default; unparseable ones are logged and
    /// also keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();

        let history_capacity = parse_or(&lookup, "UPDATE_HISTORY_CAPACITY", d.history_capacity)
            .clamp(MIN_HISTORY_CAPACITY, MAX_HISTORY_CAPACITY);
        let replay_len = parse_or(&lookup, "UPDATE_REPLAY_LEN", d.replay_len).clamp(1, history_capacity);

        let city_snapshot = lookup("CITY_SNAPSHOT").and_then(|raw| {
            serde_json::from_str::<Vec<City>>(&raw)
                .map_err(|e| warn!("Ignoring CITY_SNAPSHOT: {}", e))
                .ok()
        });

        Self {
            vote_rate_limit_max: parse_or(&lookup, "VOTE_RATE_LIMIT_MAX", d.vote_rate_limit_max),
            vote_rate_limit_window_minutes: parse_or(&lookup, "VOTE_RATE_LIMIT_WINDOW_MINUTES", d.vote_rate_limit_window_minutes).max(1),
            history_capacity,
            replay_len,
            keepalive: Duration::from_secs(parse_or(&lookup, "KEEPALIVE_SECONDS", DEFAULT_KEEPALIVE_SECONDS).max(1)),
            seed_demo_cities: parse_or(&lookup, "SEED_DEMO_CITIES", d.seed_demo_cities),
            city_snapshot,
            heat_texture_width: parse_or(&lookup, "HEAT_TEXTURE_WIDTH", d.heat_texture_width).max(1),
            heat_texture_height: parse_or(&lookup, "HEAT_TEXTURE_HEIGHT", d.heat_texture_height).max(1),
            heat_splat_radius_px: parse_or(&lookup, "HEAT_SPLAT_RADIUS_PX", d.heat_splat_radius_px),
            heat_max_points: parse_or(&lookup, "HEAT_MAX_POINTS", d.heat_max_points).max(1),
            allowed_origin_prefix: lookup("ALLOWED_ORIGIN_PREFIX").unwrap_or(d.allowed_origin_prefix),
            log_filter: lookup("LOG_FILTER").unwrap_or(d.log_filter),
        }
    }

    /// Values in the secret store win; keys missing there are read from
    /// the process environment.
    pub fn from_secrets(secrets: impl Fn(&str) -> Option<String>) -> Self {
        Self::from_lookup(|key| secrets(key).or_else(|| std::env::var(key).ok()))
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid value for {}: {} ({})", key, raw, e);
            default
        }),
    }
}
