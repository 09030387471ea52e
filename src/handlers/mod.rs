pub mod attempt_handler;
pub mod quiz_handler;

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "X-User-Id";

/// Caller identity, taken from the `X-User-Id` header the upstream gateway
/// sets after authenticating the request.
#[derive(Debug, Clone)]
pub struct RequestUser(pub String);

impl FromRequest for RequestUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user_id = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        ready(match user_id {
            Some(user_id) => Ok(RequestUser(user_id)),
            None => Err(AppError::Unauthorized(format!(
                "Missing {} header",
                USER_ID_HEADER
            ))),
        })
    }
}
