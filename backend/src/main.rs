use backend::{
    build_rocket,
    config::AppConfig,
    routes::AppState,
    tasks::{run_keepalive_task, run_rate_limit_janitor},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    // The runtime may already have installed a subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    let config = AppConfig::from_secrets(|key| secret_store.get(key));
    init_tracing(&config);

    info!("🚀 Starting geo-vote server");

    let app_state = AppState::new(config);
    info!("📋 Ledger ready with {} cities", app_state.ledger.list_cities().len());
    info!("🔥 Heat store keeps up to {} points", app_state.heat_points.max_points());

    tokio::spawn(run_keepalive_task(app_state.hub.clone(), app_state.config.keepalive));
    tokio::spawn(run_rate_limit_janitor(app_state.vote_limiter.clone()));

    Ok(build_rocket(app_state).into())
}
