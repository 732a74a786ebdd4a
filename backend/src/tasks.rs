use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::hub::BroadcastHub;
use crate::rate_limiter::RateLimiter;

pub const JANITOR_INTERVAL: Duration = Duration::from_secs(60);

pub async fn run_keepalive_task(hub: Arc<BroadcastHub>, every: Duration) {
    let mut interval = interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!("💓 Keep-alive service started ({}s)", every.as_secs());

    // First tick completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        let pruned = hub.send_keepalive();
        if pruned > 0 {
            info!("💓 Keep-alive pruned {} listener(s)", pruned);
        } else {
            debug!("Keep-alive sent to {} listener(s)", hub.listener_count());
        }
    }
}

pub async fn run_rate_limit_janitor(limiter: Arc<RateLimiter>) {
    let mut interval = interval(JANITOR_INTERVAL);
    info!("🧹 Rate limit janitor started");

    interval.tick().await;
    loop {
        interval.tick().await;
        let removed = limiter.prune_expired(OffsetDateTime::now_utc());
        if removed > 0 {
            info!("🗑️ Removed {} expired rate limit window(s)", removed);
        }
    }
}
