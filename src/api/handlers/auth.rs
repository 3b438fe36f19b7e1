//! Authentication endpoints: login and one-time code verification.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::{ErrorResponse, TOKEN_PREFIX, bearer_user_id, error_response};
use crate::api::store::{User, UserStore};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyTokenRequest {
    pub id_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyTokenResponse {
    pub uid: String,
    pub email: String,
    pub is_valid: bool,
}

/// Exchange email/password for an access token.
///
/// Every successful login also generates a fresh six-digit verification code
/// for the email, written to the server log. Delivering it out of band is
/// outside this service.
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing email or password", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn login(
    store: Extension<UserStore>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing payload");
    };

    if request.email.is_empty() || request.password.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Missing email or password");
    }

    let Some((user, code)) = store.login(&request.email, &request.password).await else {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid email or password");
    };

    info!(
        email = %request.email,
        code = %code,
        "Verification code generated"
    );

    (
        StatusCode::OK,
        Json(LoginResponse {
            access_token: format!("{TOKEN_PREFIX}{}", user.id),
            token_type: "bearer".to_string(),
            user,
        }),
    )
        .into_response()
}

/// Check a one-time verification code against the bearer token's user.
///
/// A well-authorized mismatch still answers 200 with `is_valid: false`; the
/// pending code stays in place so the client can retry. Only a matching code
/// is consumed.
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify-token",
    request_body = VerifyTokenRequest,
    responses(
        (status = 200, description = "Code checked", body = VerifyTokenResponse),
        (status = 400, description = "Missing id_token", body = ErrorResponse),
        (status = 401, description = "Missing or malformed Authorization header", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn verify_token(
    headers: HeaderMap,
    store: Extension<UserStore>,
    payload: Option<Json<VerifyTokenRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing payload");
    };

    if request.id_token.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Missing id_token");
    }

    let user = match bearer_user_id(&headers) {
        Some(id) => store.lookup_user(id).await,
        None => None,
    };

    let Some(user) = user else {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid authorization header");
    };

    let is_valid = store
        .consume_verification_code(&user.email, &request.id_token)
        .await;

    (
        StatusCode::OK,
        Json(VerifyTokenResponse {
            uid: user.id,
            email: user.email,
            is_valid,
        }),
    )
        .into_response()
}
