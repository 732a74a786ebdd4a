use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Request, Response};
use rocket::http::Header;

use crate::utils::{RATE_LIMIT_REMAINING_HEADER, RATE_LIMIT_RESET_HEADER};

/// Reflects the request origin back when it starts with the configured
/// prefix. Other origins get no CORS headers at all.
pub struct CORS {
    allowed_origin_prefix: String,
}

impl CORS {
    pub fn new(allowed_origin_prefix: impl Into<String>) -> Self {
        Self { allowed_origin_prefix: allowed_origin_prefix.into() }
    }

    pub fn allows(&self, origin: &str) -> bool {
        origin.starts_with(&self.allowed_origin_prefix)
    }
}

impl Default for CORS {
    fn default() -> Self {
        Self::new("http://localhost")
    }
}

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let Some(origin) = req.headers().get_one("Origin") else { return };

        if self.allows(origin) {
            res.set_header(Header::new("Access-Control-Allow-Origin", origin.to_string()));
            res.set_header(Header::new("Access-Control-Allow-Methods", "GET, POST, PUT, PATCH, OPTIONS"));
            res.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type, Cache-Control"));
            res.set_header(Header::new(
                "Access-Control-Expose-Headers",
                format!("{}, {}", RATE_LIMIT_REMAINING_HEADER, RATE_LIMIT_RESET_HEADER),
            ));
            res.set_header(Header::new("Access-Control-Max-Age", "86400"));
        }
    }
}
