//! HTTP surface, driven through the router without a socket.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use signpost::broadcast::{Hub, HubConfig};
use signpost::store::SqliteStore;
use signpost::{Registry, RegistryConfig};
use signpost_server::{app, ServerConfig, AUTH_USER_HEADER, TOKEN_HEADER};
use signpost_testkit::TestFixture;

fn router(fixture: &TestFixture) -> Router {
    let registry = Registry::new(
        fixture.secret(),
        SqliteStore::open_memory().unwrap(),
        Hub::new(HubConfig { capacity: 16 }),
        RegistryConfig::default(),
    );
    app(registry, &ServerConfig::default())
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(TOKEN_HEADER, token);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let fixture = TestFixture::new();
    let router = router(&fixture);

    let (status, body) = send(&router, request(Method::GET, "/locations", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["err"]["code"], "missing_token");

    let forged = TestFixture::new().token("corp\\alice", &["admin"]);
    let (status, body) = send(
        &router,
        request(Method::GET, "/locations", Some(forged.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["err"]["code"], "invalid_token");
}

#[tokio::test]
async fn test_create_then_duplicate() {
    let fixture = TestFixture::new();
    let router = router(&fixture);
    let token = fixture.token("corp\\alice", &["user"]);

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/locations",
            Some(token.as_str()),
            Some(json!({ "name": "lobby", "views": ["loop"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Location successfully created!");
    assert_eq!(body["data"]["name"], "lobby");

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/locations",
            Some(token.as_str()),
            Some(json!({ "name": "lobby", "views": ["other"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["err"], "Location already exists!");
    assert_eq!(body["data"]["views"], json!(["loop"]));

    let (_, body) = send(
        &router,
        request(Method::GET, "/locations/lobby", Some(token.as_str()), None),
    )
    .await;
    assert_eq!(body["views"], json!(["loop"]));

    let (status, body) = send(
        &router,
        request(Method::GET, "/locations/nowhere", Some(token.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_rules_map_to_forbidden() {
    let fixture = TestFixture::new();
    let router = router(&fixture);
    let nobody = fixture.token("corp\\eve", &[]);
    let user = fixture.token("corp\\alice", &["user"]);

    let (status, body) = send(
        &router,
        request(Method::GET, "/views", Some(nobody.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["err"]["code"], "forbidden");

    let (status, _) = send(
        &router,
        request(Method::DELETE, "/views/loop", Some(user.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_body_is_bad_request() {
    let fixture = TestFixture::new();
    let router = router(&fixture);
    let token = fixture.token("corp\\alice", &["user"]);

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/views",
            Some(token.as_str()),
            Some(json!({ "name": "loop", "urls": ["a", "b"], "timings": [5] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["err"]["code"], "invalid");
}

#[tokio::test]
async fn test_malformed_body_gets_error_descriptor() {
    let fixture = TestFixture::new();
    let router = router(&fixture);
    let token = fixture.token("corp\\alice", &["user"]);

    let (status, body) = send(
        &router,
        request(
            Method::POST,
            "/locations",
            Some(token.as_str()),
            Some(json!({ "name": 5 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["err"]["code"], "invalid");
    assert!(body["err"]["message"].as_str().unwrap().contains("name"));

    let unparsable = Request::builder()
        .method(Method::POST)
        .uri("/views")
        .header(TOKEN_HEADER, token.as_str())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&router, unparsable).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["err"]["code"], "invalid");
}

#[tokio::test]
async fn test_rules_checked_before_body() {
    let fixture = TestFixture::new();
    let router = router(&fixture);
    let alice = fixture.token("corp\\alice", &["user"]);

    let (status, body) = send(
        &router,
        request(
            Method::PATCH,
            "/users/corp/root",
            Some(alice.as_str()),
            Some(json!({ "enabled": "yes" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["err"]["code"], "forbidden");
}

#[tokio::test]
async fn test_location_read_resolves_views() {
    let fixture = TestFixture::new();
    let router = router(&fixture);
    let token = fixture.token("corp\\alice", &["user"]);

    send(
        &router,
        request(
            Method::POST,
            "/views",
            Some(token.as_str()),
            Some(json!({ "name": "loop", "urls": ["https://status.example"], "timings": [30] })),
        ),
    )
    .await;
    send(
        &router,
        request(
            Method::POST,
            "/locations",
            Some(token.as_str()),
            Some(json!({ "name": "lobby", "views": ["loop"] })),
        ),
    )
    .await;

    let (status, body) = send(
        &router,
        request(Method::GET, "/locations/lobby", Some(token.as_str()), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["views"][0]["name"], "loop");
    assert_eq!(body["views"][0]["urls"], json!(["https://status.example"]));
    assert_eq!(body["views"][0]["timings"], json!([30]));

    let (_, body) = send(
        &router,
        request(
            Method::PATCH,
            "/locations/lobby",
            Some(token.as_str()),
            Some(json!({ "monitors": ["m1"] })),
        ),
    )
    .await;
    assert_eq!(body["data"]["views"][0]["name"], "loop");
    assert_eq!(body["changes"], json!({ "monitors": ["m1"] }));
}

#[tokio::test]
async fn test_response_headers() {
    let fixture = TestFixture::new();
    let router = router(&fixture);
    let token = fixture.token("corp\\alice", &["user"]);

    let response = router
        .clone()
        .oneshot(request(Method::GET, "/", Some(token.as_str()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/locations")
        .header(header::ORIGIN, "https://board.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, TOKEN_HEADER)
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(preflight).await.unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let allowed = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .to_string();
    assert!(allowed.contains("PATCH"));
}

#[tokio::test]
async fn test_admin_bootstrap_and_token_exchange() {
    let fixture = TestFixture::new();
    let router = router(&fixture);

    let admin_request = || {
        Request::builder()
            .uri("/admin?name=Root&email=root%40corp.example")
            .header(AUTH_USER_HEADER, "corp\\root")
            .body(Body::empty())
            .unwrap()
    };

    let (status, body) = send(&router, admin_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Admin successfully added!");
    assert_eq!(body["user"]["email"], "root@corp.example");

    let (_, body) = send(&router, admin_request()).await;
    assert_eq!(body["msg"], "Admin already created");

    let auth = Request::builder()
        .uri("/auth")
        .header(AUTH_USER_HEADER, "corp\\root")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, auth).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (_, body) = send(&router, request(Method::GET, "/", Some(&token), None)).await;
    assert_eq!(body["auth-user"], "corp\\root");

    let (status, body) = send(
        &router,
        request(Method::DELETE, "/users/corp/root", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "User successfully deleted!");
}

#[tokio::test]
async fn test_auth_requires_identity_header() {
    let fixture = TestFixture::new();
    let router = router(&fixture);

    let (status, body) = send(&router, request(Method::GET, "/auth", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["err"]["code"], "missing_header");
}

#[tokio::test]
async fn test_user_edits_own_record() {
    let fixture = TestFixture::new();
    let router = router(&fixture);
    let admin = fixture.token("corp\\root", &["admin", "user"]);
    let alice = fixture.token("corp\\alice", &["user"]);

    let (_, body) = send(
        &router,
        request(
            Method::POST,
            "/users",
            Some(admin.as_str()),
            Some(json!({ "eid": "corp\\alice", "name": "", "email": "" })),
        ),
    )
    .await;
    assert_eq!(body["msg"], "User successfully added!");

    let (status, body) = send(
        &router,
        request(
            Method::PATCH,
            "/users/corp/alice",
            Some(alice.as_str()),
            Some(json!({ "name": "Alice" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alice");

    let (status, _) = send(
        &router,
        request(
            Method::PATCH,
            "/users/corp/root",
            Some(alice.as_str()),
            Some(json!({ "name": "Mallory" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_event_feed_streams_mutations() {
    let fixture = TestFixture::new();
    let router = router(&fixture);
    let token = fixture.token("corp\\alice", &["user"]);

    let response = router
        .clone()
        .oneshot(request(Method::GET, "/events", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let mut feed = response.into_body();

    send(
        &router,
        request(
            Method::POST,
            "/locations",
            Some(token.as_str()),
            Some(json!({ "name": "lobby" })),
        ),
    )
    .await;

    let frame = tokio::time::timeout(Duration::from_secs(5), feed.frame())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let data = frame.into_data().unwrap();
    let text = String::from_utf8_lossy(&data);
    assert!(text.contains("event: location:create"));
    assert!(text.contains("\"name\":\"lobby\""));
}
