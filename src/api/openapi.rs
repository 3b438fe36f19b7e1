use utoipa::OpenApi;

use super::handlers::{ErrorResponse, auth, health, users};
use crate::api::store::User;

/// Add new endpoints here so they are both served and documented; the
/// router in `api::mod` registers the same handlers.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::login,
        auth::verify_token,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
    ),
    components(schemas(
        User,
        ErrorResponse,
        auth::LoginRequest,
        auth::LoginResponse,
        auth::VerifyTokenRequest,
        auth::VerifyTokenResponse,
        users::CreateUserRequest,
    )),
    tags(
        (name = "auth", description = "Login and one-time code verification"),
        (name = "users", description = "In-memory user records"),
        (name = "health", description = "Liveness"),
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_info_from_cargo() {
        let spec = openapi();
        assert_eq!(spec.info.title, env!("CARGO_PKG_NAME"));
        assert_eq!(spec.info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn openapi_documents_all_routes() {
        let spec = openapi();
        let paths = &spec.paths.paths;

        for path in [
            "/healthz",
            "/api/v1/auth/token",
            "/api/v1/auth/verify-token",
            "/api/v1/users",
            "/api/v1/users/{id}",
        ] {
            assert!(paths.contains_key(path), "missing path: {path}");
        }
    }
}
