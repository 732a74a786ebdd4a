use std::sync::Arc;

use rocket::http::{ContentType, Status};
use rocket::response::stream::{Event, EventStream};
use rocket::serde::json::Json;
use rocket::tokio::select;
use rocket::{get, patch, post, put, Shutdown, State};
use shared::cities::{search_cities as search_major_cities, DEFAULT_SEARCH_LIMIT};
use shared::fans::{demo_fans, fans_to_points, merge_fans};
use shared::models::*;
use shared::validation::validate_vote_request;
use tracing::{debug, info, instrument, warn};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::heat_store::HeatPointStore;
use crate::hub::{BroadcastHub, HubMessage};
use crate::ledger::{VoteLedger, VoteOutcome};
use crate::rate_limiter::{RateLimitDecision, RateLimiter};
use crate::utils::WithRateLimit;

pub const MAX_SEARCH_LIMIT: usize = 50;

pub struct AppState {
    pub ledger: VoteLedger,
    pub hub: Arc<BroadcastHub>,
    pub vote_limiter: Arc<RateLimiter>,
    pub heat_points: HeatPointStore,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let hub = Arc::new(BroadcastHub::new(config.history_capacity, config.replay_len));
        let seed = if config.seed_demo_cities { crate::ledger::demo_cities() } else { Vec::new() };
        let ledger = VoteLedger::with_cities(seed, hub.clone());

        if let Some(snapshot) = &config.city_snapshot {
            ledger.reconcile(snapshot.clone());
        }

        Self {
            ledger,
            hub,
            vote_limiter: Arc::new(RateLimiter::new(
                config.vote_rate_limit_max,
                config.vote_rate_limit_window_minutes,
            )),
            heat_points: HeatPointStore::new(config.heat_max_points),
            config,
        }
    }

    /// Validation runs before the limiter so malformed requests never use
    /// up an attempt; duplicates do.
    pub fn cast_vote(&self, request: &VoteRequest) -> Result<(VoteOutcome, RateLimitDecision), ApiError> {
        let (_, email) = validate_vote_request(request)?;

        let decision = self.vote_limiter.check(&format!("vote:{}", email));
        if !decision.allowed {
            warn!("Vote rate limit hit");
            return Err(ApiError::RateLimited(decision));
        }

        let outcome = self.ledger.cast_vote(&request.city, &email, request.consent)?;
        Ok((outcome, decision))
    }
}

#[get("/votes")]
pub fn list_cities(state: &State<AppState>) -> Json<CitiesResponse> {
    Json(CitiesResponse { cities: state.ledger.list_cities() })
}

#[instrument(skip(state, request))]
#[post("/votes", format = "json", data = "<request>")]
pub fn cast_vote(
    state: &State<AppState>,
    request: Json<VoteRequest>,
) -> Result<WithRateLimit<Json<VoteResponse>>, ApiError> {
    let (outcome, decision) = state.cast_vote(&request)?;
    debug!("Vote for {} handled (duplicate: {})", outcome.city.name, outcome.duplicate);

    Ok(WithRateLimit {
        inner: Json(VoteResponse {
            ok: true,
            duplicate: outcome.duplicate,
            cities: state.ledger.list_cities(),
        }),
        decision,
    })
}

#[instrument(skip(state, request))]
#[put("/votes", format = "json", data = "<request>")]
pub fn request_city(
    state: &State<AppState>,
    request: Json<VoteRequest>,
) -> Result<Json<RequestCityResponse>, ApiError> {
    let outcome = state.ledger.request_city(&request.city, &request.email, request.consent)?;

    Ok(Json(RequestCityResponse {
        ok: true,
        is_new_city: outcome.is_new_city,
        duplicate: outcome.duplicate,
        cities: state.ledger.list_cities(),
    }))
}

#[instrument(skip(state, request))]
#[patch("/votes", format = "json", data = "<request>")]
pub fn subscribe(
    state: &State<AppState>,
    request: Json<SubscribeRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let subscribed = state.ledger.subscribe(&request)?;
    debug!("Subscription set to {}", subscribed);
    Ok(Json(OkResponse { ok: true }))
}

/// Replays recent updates, then streams live ones until the client goes
/// away or the server shuts down. The listener unregisters when the stream
/// is dropped.
#[get("/votes/stream")]
pub fn vote_stream(state: &State<AppState>, mut shutdown: Shutdown) -> EventStream![] {
    let mut listener = state.hub.subscribe_listener();
    info!("📡 Stream listener {} connected", listener.id());

    EventStream! {
        loop {
            let message = select! {
                message = listener.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
                _ = &mut shutdown => break,
            };

            let event = match message {
                HubMessage::Update(update) => Event::json(&update),
                HubMessage::KeepAlive => Event::comment("keepalive"),
            };
            yield event;
        }
    }
}

#[get("/heatmap")]
pub fn list_heat_points(state: &State<AppState>) -> Json<HeatPointsResponse> {
    Json(HeatPointsResponse { points: state.heat_points.points() })
}

#[instrument(skip(state, request))]
#[post("/heatmap", format = "json", data = "<request>")]
pub fn add_heat_point(
    state: &State<AppState>,
    request: Json<HeatPointRequest>,
) -> Result<Json<HeatPointsResponse>, ApiError> {
    let point = state.heat_points.add(&request)?;
    debug!("Heat point added at ({:.2}, {:.2})", point.lat, point.lng);
    Ok(Json(HeatPointsResponse { points: state.heat_points.points() }))
}

#[instrument(skip(state))]
#[get("/heatmap/texture.png")]
pub fn heat_texture(state: &State<AppState>) -> Result<(ContentType, Vec<u8>), ApiError> {
    let config = &state.config;
    let raster = state.heat_points.render_texture(
        config.heat_texture_width,
        config.heat_texture_height,
        config.heat_splat_radius_px,
    );
    let png = raster
        .encode_png()
        .map_err(|e| ApiError::Internal(format!("Failed to encode heat texture: {}", e)))?;
    Ok((ContentType::PNG, png))
}

#[get("/fans")]
pub fn fan_points() -> Json<WeightedPointsResponse> {
    Json(WeightedPointsResponse { points: fans_to_points(&merge_fans(&demo_fans())) })
}

#[get("/cities/search?<q>&<limit>")]
pub fn search_cities(q: Option<&str>, limit: Option<usize>) -> Json<CitySearchResponse> {
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT);
    let cities = search_major_cities(q.unwrap_or_default(), limit)
        .into_iter()
        .map(String::from)
        .collect();
    Json(CitySearchResponse { cities })
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> Status {
    Status::Ok
}
