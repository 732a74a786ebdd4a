use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use shared::error::{ErrorCode, ErrorResponse};
use shared::validation::ValidationError;
use thiserror::Error;

use crate::rate_limiter::RateLimitDecision;
use crate::utils::rate_limit_headers;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited(RateLimitDecision),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation(_) => Status::BadRequest,
            ApiError::RateLimited(_) => Status::TooManyRequests,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::Validation(_) => ErrorCode::ValidationFailed,
            ApiError::RateLimited(_) => ErrorCode::RateLimited,
            ApiError::Internal(_) => ErrorCode::SystemError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let body = ErrorResponse::new(self.code(), self.to_string());
        let mut response = rocket::Response::build_from(Json(body).respond_to(req)?);
        response.status(self.status());

        if let ApiError::RateLimited(decision) = &self {
            for header in rate_limit_headers(decision) {
                response.header(header);
            }
        }
        response.ok()
    }
}
