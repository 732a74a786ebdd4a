use rocket::http::Header;
use rocket::response::Responder;
use shared::models::unix_millis;

use crate::rate_limiter::RateLimitDecision;

pub const RATE_LIMIT_REMAINING_HEADER: &str = "X-RateLimit-Remaining";
pub const RATE_LIMIT_RESET_HEADER: &str = "X-RateLimit-Reset";

/// Reset time in whole epoch seconds, rounded up.
pub fn reset_epoch_seconds(decision: &RateLimitDecision) -> i64 {
    let millis = unix_millis(decision.reset_at);
    millis.div_euclid(1000) + i64::from(millis.rem_euclid(1000) > 0)
}

pub fn rate_limit_headers(decision: &RateLimitDecision) -> [Header<'static>; 2] {
    [
        Header::new(RATE_LIMIT_REMAINING_HEADER, decision.remaining.to_string()),
        Header::new(RATE_LIMIT_RESET_HEADER, reset_epoch_seconds(decision).to_string()),
    ]
}

/// Wraps a successful response with the caller's rate-limit headers.
pub struct WithRateLimit<R> {
    pub inner: R,
    pub decision: RateLimitDecision,
}

impl<'r, 'o: 'r, R: Responder<'r, 'o>> Responder<'r, 'o> for WithRateLimit<R> {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let mut response = self.inner.respond_to(req)?;
        for header in rate_limit_headers(&self.decision) {
            response.set_header(header);
        }
        Ok(response)
    }
}
