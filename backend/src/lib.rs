pub mod catchers;
pub mod config;
pub mod cors;
pub mod error;
pub mod heat_store;
pub mod hub;
pub mod ledger;
pub mod rate_limiter;
pub mod routes;
pub mod tasks;
pub mod utils;
pub use shared::{models::*, error::*};

use rocket::{catchers, routes, Build, Rocket};

use crate::catchers::{bad_request, internal_error, not_found, too_many_requests, unprocessable_entity};
use crate::cors::CORS;
use crate::routes::*;

/// Assembles the Rocket instance around an already-built state.
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    let cors = CORS::new(state.config.allowed_origin_prefix.clone());

    rocket::build()
        .attach(cors)
        .manage(state)
        .mount(
            "/api",
            routes![
                list_cities,
                cast_vote,
                request_city,
                subscribe,
                vote_stream,
                list_heat_points,
                add_heat_point,
                heat_texture,
                fan_points,
                search_cities,
                all_options
            ],
        )
        .register(
            "/",
            catchers![
                bad_request,
                not_found,
                unprocessable_entity,
                too_many_requests,
                internal_error
            ],
        )
}
