use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use chirpy_api::metrics::Metrics;
use chirpy_api::{AppStateInner, TokenService, router};
use chirpy_crypto::Credentials;
use chirpy_db::Store;

const SECRET: &str = "integration-secret";
const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

struct TestApp {
    _dir: TempDir,
    app: Router,
    tokens: TokenService,
}

fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let public = dir.path().join("public");
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(public.join("index.html"), "<h1>Welcome to Chirpy</h1>").unwrap();

    let store = Store::open_with(
        &dir.path().join("db").join("database.json"),
        Credentials::with_cost(8, 1).unwrap(),
    )
    .unwrap();

    let state = Arc::new(AppStateInner {
        store,
        tokens: TokenService::with_secret(SECRET),
        polka_key: POLKA_KEY.to_string(),
        metrics: Metrics::default(),
        request_timeout: Duration::from_secs(10),
    });

    TestApp {
        app: router(state, &public),
        tokens: TokenService::with_secret(SECRET),
        _dir: dir,
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn signup_and_login(app: &Router, email: &str, password: &str) -> (u64, String, String) {
    let (status, user) = send(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, login) = send(
        app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (
        user["id"].as_u64().unwrap(),
        login["token"].as_str().unwrap().to_string(),
        login["refresh_token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn user_lifecycle_end_to_end() {
    let t = test_app();

    let (status, created) = send(
        &t.app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "email": "a@b.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], "a@b.com");
    assert!(created.get("password").is_none());
    assert!(created.get("password_hash").is_none());
    let user_id = created["id"].as_u64().unwrap();

    let (status, login) = send(
        &t.app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "a@b.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(login.get("password_hash").is_none());
    let token = login["token"].as_str().unwrap();
    assert_eq!(t.tokens.validate(token).unwrap(), user_id);

    let (status, updated) = send(
        &t.app,
        "PUT",
        "/api/users",
        Some(&format!("Bearer {token}")),
        Some(json!({ "email": "new@b.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["email"], "new@b.com");

    // The password did not change, so the old one still logs in.
    let (status, _) = send(
        &t.app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "NEW@b.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &t.app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "new@b.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_and_invalid_signups() {
    let t = test_app();
    signup_and_login(&t.app, "a@b.com", "pw").await;

    let (status, _) = send(
        &t.app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "email": "A@B.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, problems) = send(
        &t.app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "email": "", "password": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problems.get("email").is_some());
    assert!(problems.get("password").is_some());
}

#[tokio::test]
async fn chirps_require_a_valid_token() {
    let t = test_app();

    let (status, _) = send(&t.app, "POST", "/api/chirps", None, Some(json!({ "body": "hi" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = TokenService::with_secret("other").issue(1, 3600).unwrap();
    let (status, _) = send(
        &t.app,
        "POST",
        "/api/chirps",
        Some(&format!("Bearer {forged}")),
        Some(json!({ "body": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn chirp_create_list_and_owned_delete() {
    let t = test_app();
    let (alice, alice_token, _) = signup_and_login(&t.app, "alice@x.com", "pw").await;
    let (bob, bob_token, _) = signup_and_login(&t.app, "bob@x.com", "pw").await;
    let alice_auth = format!("Bearer {alice_token}");
    let bob_auth = format!("Bearer {bob_token}");

    let (status, chirp) = send(
        &t.app,
        "POST",
        "/api/chirps",
        Some(&alice_auth),
        Some(json!({ "body": "What a kerfuffle" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(chirp["body"], "What a ****");
    assert_eq!(chirp["author_id"].as_u64().unwrap(), alice);
    let alice_chirp = chirp["id"].as_u64().unwrap();

    let (status, _) = send(
        &t.app,
        "POST",
        "/api/chirps",
        Some(&bob_auth),
        Some(json!({ "body": "bob here" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &t.app,
        "POST",
        "/api/chirps",
        Some(&bob_auth),
        Some(json!({ "body": "x".repeat(141) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, all) = send(&t.app, "GET", "/api/chirps?sort=desc", None, None).await;
    let ids: Vec<u64> = all.as_array().unwrap().iter().map(|c| c["id"].as_u64().unwrap()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids[0] > ids[1]);

    let (_, mine) = send(&t.app, "GET", &format!("/api/chirps?author_id={bob}"), None, None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (_, unfiltered) = send(&t.app, "GET", "/api/chirps?author_id=nope", None, None).await;
    assert_eq!(unfiltered.as_array().unwrap().len(), 2);

    let (_, nobody) = send(&t.app, "GET", "/api/chirps?author_id=9999", None, None).await;
    assert_eq!(nobody, json!([]));

    let uri = format!("/api/chirps/{alice_chirp}");
    let (status, _) = send(&t.app, "DELETE", &uri, Some(&bob_auth), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&t.app, "DELETE", &uri, Some(&alice_auth), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&t.app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&t.app, "DELETE", &uri, Some(&alice_auth), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn validate_chirp_masks_profanity() {
    let t = test_app();
    let (status, body) = send(
        &t.app,
        "POST",
        "/api/validate_chirp",
        None,
        Some(json!({ "body": "Sharbert! and FORNAX" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleaned_body"], "****! and ****");
}

#[tokio::test]
async fn refresh_and_revoke() {
    let t = test_app();
    let (user_id, _, refresh) = signup_and_login(&t.app, "a@b.com", "pw").await;
    let auth = format!("Bearer {refresh}");

    let (status, body) = send(&t.app, "POST", "/api/refresh", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();
    assert_eq!(t.tokens.validate(token).unwrap(), user_id);

    let (status, _) = send(&t.app, "POST", "/api/revoke", Some(&auth), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&t.app, "POST", "/api/refresh", Some(&auth), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn polka_webhook_upgrades_users() {
    let t = test_app();
    let (user_id, _, _) = signup_and_login(&t.app, "a@b.com", "pw").await;
    let event = json!({ "event": "user.upgraded", "data": { "user_id": user_id } });

    let (status, _) = send(&t.app, "POST", "/api/polka/webhooks", None, Some(event.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &t.app,
        "POST",
        "/api/polka/webhooks",
        Some("ApiKey wrong"),
        Some(event.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let key = format!("ApiKey {}", POLKA_KEY.to_uppercase());
    let (status, _) = send(
        &t.app,
        "POST",
        "/api/polka/webhooks",
        Some(&key),
        Some(json!({ "event": "user.payment_failed", "data": { "user_id": user_id } })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, user) = send(&t.app, "GET", &format!("/api/users/{user_id}"), None, None).await;
    assert_eq!(user["is_upgraded"], false);

    let (status, _) = send(&t.app, "POST", "/api/polka/webhooks", Some(&key), Some(event)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, user) = send(&t.app, "GET", &format!("/api/users/{user_id}"), None, None).await;
    assert_eq!(user["is_upgraded"], true);

    let (status, _) = send(
        &t.app,
        "POST",
        "/api/polka/webhooks",
        Some(&key),
        Some(json!({ "event": "user.upgraded", "data": { "user_id": 4242 } })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn static_hits_are_counted_and_reset() {
    let t = test_app();

    let (status, _) = send(&t.app, "GET", "/api/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);

    for _ in 0..3 {
        let (status, body) = send(&t.app, "GET", "/app/index.html", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_str().unwrap().contains("Welcome to Chirpy"));
    }

    let (_, page) = send(&t.app, "GET", "/admin/metrics", None, None).await;
    assert!(page.as_str().unwrap().contains("visited 3 times"));

    send(&t.app, "GET", "/api/reset", None, None).await;
    let (_, page) = send(&t.app, "GET", "/admin/metrics", None, None).await;
    assert!(page.as_str().unwrap().contains("visited 0 times"));
}
