//! User CRUD endpoints.

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ErrorResponse, error_response};
use crate::api::store::{CreateOutcome, User, UserStore};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub role: Option<String>,
    pub password: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = 200, description = "All user records", body = [User]),
    ),
    tag = "users"
)]
pub async fn list_users(store: Extension<UserStore>) -> impl IntoResponse {
    Json(store.list_users().await)
}

/// Create a user record plus its credential entry.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse),
    ),
    tag = "users"
)]
pub async fn create_user(
    store: Extension<UserStore>,
    payload: Option<Json<CreateUserRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing payload");
    };

    if request.email.is_empty() || request.display_name.is_empty() || request.password.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Missing required fields");
    }

    match store
        .create_user(
            &request.email,
            &request.display_name,
            request.role.as_deref(),
            &request.password,
        )
        .await
    {
        CreateOutcome::Created(user) => (StatusCode::CREATED, Json(user)).into_response(),
        CreateOutcome::DuplicateEmail => {
            error_response(StatusCode::CONFLICT, "Email already exists")
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User record", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "users"
)]
pub async fn get_user(Path(id): Path<String>, store: Extension<UserStore>) -> impl IntoResponse {
    match store.lookup_user(&id).await {
        Some(user) => (StatusCode::OK, Json(user)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "User not found"),
    }
}

/// Update a user from an untyped JSON object.
///
/// Only a string-typed `display_name` is applied; other fields are silently
/// ignored.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Updated record", body = User),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "users"
)]
pub async fn update_user(
    Path(id): Path<String>,
    store: Extension<UserStore>,
    payload: Option<Json<serde_json::Value>>,
) -> impl IntoResponse {
    // Existence is checked before the body, so an unknown id answers 404
    // even when the payload is garbage.
    if store.lookup_user(&id).await.is_none() {
        return error_response(StatusCode::NOT_FOUND, "User not found");
    }

    let patch = match payload {
        Some(Json(serde_json::Value::Object(patch))) => patch,
        _ => return error_response(StatusCode::BAD_REQUEST, "Invalid request body"),
    };

    match store.update_user(&id, &patch).await {
        Some(user) => (StatusCode::OK, Json(user)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "User not found"),
    }
}

/// Delete a user record. The credential and any pending verification code
/// for the email are left behind.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(
        ("id" = String, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "users"
)]
pub async fn delete_user(Path(id): Path<String>, store: Extension<UserStore>) -> impl IntoResponse {
    if store.delete_user(&id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, "User not found")
    }
}
