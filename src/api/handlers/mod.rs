//! API handlers and shared utilities.
//!
//! This module organizes the route handlers and provides the common pieces
//! they share: the JSON error body and bearer-token parsing.

pub mod auth;
pub mod health;
pub mod users;

use axum::{
    Json,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Prefix of every issued access token: `bearer_token_<user-id>`.
///
/// Kept stable for client compatibility. The token carries no secret; it is
/// fully derived from the user id.
pub const TOKEN_PREFIX: &str = "bearer_token_";

/// Error body returned by every failing endpoint.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Extract the user id from an `Authorization: Bearer bearer_token_<id>`
/// header. Returns `None` for a missing or malformed header.
pub(crate) fn bearer_user_id(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;

    let (scheme, token) = value.split_once(' ')?;
    if scheme != "Bearer" || token.contains(' ') {
        return None;
    }

    token.strip_prefix(TOKEN_PREFIX)
}
