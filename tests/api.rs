//! End-to-end tests driving the real router against a fresh store per test.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use trailo::api::{app, store::UserStore};

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_user(app: &Router, email: &str, display_name: &str, password: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            json!({"email": email, "display_name": display_name, "password": password}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await
}

#[tokio::test]
async fn healthz_answers_ok_with_cors_headers() {
    let app = app(UserStore::new());

    let response = app.oneshot(get_request("/healthz")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn create_user_defaults_role_and_is_retrievable() {
    let app = app(UserStore::new());

    let created = create_user(&app, "a@b.com", "A", "p").await;
    assert_eq!(created["email"], "a@b.com");
    assert_eq!(created["display_name"], "A");
    assert_eq!(created["role"], "client");

    let id = created["id"].as_str().unwrap();
    assert!(id.starts_with("user_"));

    let response = app
        .oneshot(get_request(&format!("/api/v1/users/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, created);
}

#[tokio::test]
async fn create_user_keeps_explicit_role() {
    let app = app(UserStore::new());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            json!({"email": "a@b.com", "display_name": "A", "role": "staff", "password": "p"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(read_json(response).await["role"], "staff");
}

#[tokio::test]
async fn create_user_with_missing_fields_is_rejected() {
    let app = app(UserStore::new());

    // Field absent entirely
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            json!({"email": "a@b.com", "display_name": "A"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Field present but empty
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            json!({"email": "a@b.com", "display_name": "", "password": "p"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_conflicts_and_keeps_first_record() {
    let app = app(UserStore::new());

    create_user(&app, "a@b.com", "First", "p1").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            json!({"email": "a@b.com", "display_name": "Second", "password": "p2"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["error"], "Email already exists");

    let response = app.oneshot(get_request("/api/v1/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = read_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["display_name"], "First");
}

#[tokio::test]
async fn login_and_verify_code_exactly_once() {
    let store = UserStore::new();
    let app = app(store.clone());

    let created = create_user(&app, "a@b.com", "A", "p").await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/token",
            json!({"email": "a@b.com", "password": "p"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let login = read_json(response).await;
    let token = format!("bearer_token_{id}");
    assert_eq!(login["access_token"], token.as_str());
    assert_eq!(login["token_type"], "bearer");
    assert_eq!(login["user"]["email"], "a@b.com");

    // The code is only emitted server-side; read it through the store handle.
    let code = store
        .pending_verification_code("a@b.com")
        .await
        .expect("login must leave a pending code");
    assert_eq!(code.len(), 6);

    let verify = |code: String| {
        let app = app.clone();
        let token = token.clone();
        async move {
            let response = app
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/v1/auth/verify-token")
                        .header(header::CONTENT_TYPE, "application/json")
                        .header(header::AUTHORIZATION, format!("Bearer {token}"))
                        .body(Body::from(json!({"id_token": code}).to_string()))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            read_json(response).await
        }
    };

    let first = verify(code.clone()).await;
    assert_eq!(first["is_valid"], true);
    assert_eq!(first["uid"], id);
    assert_eq!(first["email"], "a@b.com");

    // The code was consumed; the same code no longer verifies.
    let second = verify(code).await;
    assert_eq!(second["is_valid"], false);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized_and_keeps_code() {
    let store = UserStore::new();
    store.seed_test_user().await;
    let app = app(store.clone());

    // Set a pending code via a successful login first.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/token",
            json!({"email": "test@example.com", "password": "password123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let code = store
        .pending_verification_code("test@example.com")
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/token",
            json!({"email": "test@example.com", "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        read_json(response).await["error"],
        "Invalid email or password"
    );

    assert_eq!(
        store.pending_verification_code("test@example.com").await,
        Some(code)
    );
}

#[tokio::test]
async fn login_with_missing_fields_is_rejected() {
    let app = app(UserStore::new());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/token",
            json!({"email": "a@b.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/token",
            json!({"email": "", "password": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_token_rejects_bad_authorization() {
    let store = UserStore::new();
    store.seed_test_user().await;
    let app = app(store);

    let cases: &[Option<&str>] = &[
        None,
        Some("bearer_token_test123"),          // no scheme
        Some("Basic bearer_token_test123"),    // wrong scheme
        Some("Bearer test123"),                // missing token prefix
        Some("Bearer bearer_token_no_such_id") // unknown user
    ];

    for auth in cases {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/verify-token")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, *value);
        }

        let response = app
            .clone()
            .oneshot(
                builder
                    .body(Body::from(json!({"id_token": "123456"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "auth header {auth:?} should be rejected"
        );
    }
}

#[tokio::test]
async fn update_applies_only_display_name() {
    let app = app(UserStore::new());

    let created = create_user(&app, "a@b.com", "Before", "p").await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/v1/users/{id}");

    // Unrecognized fields change nothing.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &uri,
            json!({"email": "evil@b.com", "role": "admin"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["display_name"], "Before");
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["role"], "client");

    let response = app
        .oneshot(json_request("PUT", &uri, json!({"display_name": "After"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["display_name"], "After");
    assert_eq!(body["email"], "a@b.com");
}

#[tokio::test]
async fn update_rejects_non_object_body_and_unknown_id() {
    let app = app(UserStore::new());

    let created = create_user(&app, "a@b.com", "A", "p").await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/users/{id}"),
            json!(["not", "an", "object"]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/v1/users/no_such_id",
            json!({"display_name": "X"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = app(UserStore::new());

    let created = create_user(&app, "a@b.com", "A", "p").await;
    let id = created["id"].as_str().unwrap();
    let uri = format!("/api/v1/users/{id}");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(get_request(&uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
