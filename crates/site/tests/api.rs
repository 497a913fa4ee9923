//! End-to-end tests for the news and admin API.
//!
//! Every test builds the real router over a temporary data directory and
//! drives it with `tower::ServiceExt::oneshot`. VK is replaced by a local
//! axum server where a test needs the wall mirror.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::HashMap;

use axum::{
    Json, Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
    routing::get,
};
use otechestvo_core::NewsItem;
use otechestvo_site::{build_router, config::SiteConfig, state::AppState, store::NewsStore};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

const PASSWORD: &str = "k7#Qp2!vLm9z";

struct TestApp {
    router: Router,
    store: NewsStore,
    dir: TempDir,
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

async fn spawn_app(vk: Option<String>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut vars: HashMap<&str, String> = HashMap::from([
        ("DATA_DIR", dir.path().join("data").display().to_string()),
        ("STATIC_DIR", dir.path().join("public").display().to_string()),
        ("ADMIN_PASSWORD", PASSWORD.to_string()),
        (
            "SESSION_SECRET",
            "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%".to_string(),
        ),
    ]);
    if let Some(api_base) = vk {
        vars.insert("VK_ACCESS_TOKEN", "test-token".to_string());
        vars.insert("VK_API_BASE", api_base);
    }

    let config = SiteConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
    let store = NewsStore::open(&config.data_dir).await.unwrap();
    let state = AppState::new(config, store.clone()).unwrap();

    TestApp {
        router: build_router(state, MemoryStore::default()),
        store,
        dir,
    }
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Reply {
            status,
            headers,
            body,
        }
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Reply {
        self.send(Method::GET, uri, cookie, None).await
    }

    /// Log in and return the `Cookie` header value for the new session.
    async fn login(&self) -> String {
        let reply = self
            .send(
                Method::POST,
                "/api/admin/login",
                None,
                Some(json!({ "password": PASSWORD })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, json!({ "ok": true }));
        session_cookie(&reply.headers)
    }

    async fn news(&self) -> Vec<NewsItem> {
        let reply = self.get("/api/news", None).await;
        assert_eq!(reply.status, StatusCode::OK);
        serde_json::from_value(reply.body).unwrap()
    }
}

fn session_cookie(headers: &HeaderMap) -> String {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("otechestvo_session="))
        .and_then(|v| v.split(';').next())
        .unwrap()
        .to_string()
}

/// Serve `body` as the VK `wall.get` response and return the API base URL.
async fn spawn_fake_vk(body: Value) -> String {
    let app = Router::new().route(
        "/method/wall.get",
        get(move || async move { Json(body) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/method")
}

fn wall(count: i64) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": 100 - i,
                "date": 1_704_067_200 - i * 86_400,
                "text": format!("VK post {i}\nsecond line"),
            })
        })
        .collect();
    json!({ "response": { "count": count, "items": items } })
}

// ============================================================================
// Full CRUD lifecycle
// ============================================================================

#[tokio::test]
async fn test_crud_lifecycle() {
    let app = spawn_app(None).await;
    assert!(app.news().await.is_empty());

    let cookie = app.login().await;

    let created = app
        .send(
            Method::POST,
            "/api/news",
            Some(&cookie),
            Some(json!({ "date": "01.01.2024", "content": "Hello" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    let id = created.body["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(created.body["date"], "01.01.2024");
    assert_eq!(created.body["content"], "Hello");
    assert!(created.body.get("link").is_none());

    let news = app.news().await;
    assert_eq!(news.len(), 1);
    assert_eq!(news[0].id.as_str(), id);
    assert_eq!(news[0].content, "Hello");

    let updated = app
        .send(
            Method::PUT,
            &format!("/api/news/{id}"),
            Some(&cookie),
            Some(json!({ "content": "Bye" })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["content"], "Bye");

    let news = app.news().await;
    assert_eq!(news[0].date, "01.01.2024");
    assert_eq!(news[0].content, "Bye");

    let deleted = app
        .send(Method::DELETE, &format!("/api/news/{id}"), Some(&cookie), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body, json!({ "ok": true }));

    assert!(app.news().await.is_empty());
}

#[tokio::test]
async fn test_successive_creates_have_distinct_ids_newest_first() {
    let app = spawn_app(None).await;
    let cookie = app.login().await;

    let mut ids = Vec::new();
    for content in ["first", "second"] {
        let reply = app
            .send(
                Method::POST,
                "/api/news",
                Some(&cookie),
                Some(json!({ "date": "10.03.2024", "content": content })),
            )
            .await;
        ids.push(reply.body["id"].as_str().unwrap().to_string());
    }
    assert_ne!(ids[0], ids[1]);

    let news = app.news().await;
    assert_eq!(news[0].content, "second");
    assert_eq!(news[1].content, "first");
}

#[tokio::test]
async fn test_news_sorted_by_display_date() {
    let app = spawn_app(None).await;
    let cookie = app.login().await;

    for (date, content) in [("05.05.2024", "may"), ("01.01.2024", "jan"), ("20.12.2024", "dec")] {
        app.send(
            Method::POST,
            "/api/news",
            Some(&cookie),
            Some(json!({ "date": date, "content": content })),
        )
        .await;
    }

    let order: Vec<String> = app.news().await.into_iter().map(|n| n.content).collect();
    assert_eq!(order, ["dec", "may", "jan"]);
}

// ============================================================================
// Validation and not-found
// ============================================================================

#[tokio::test]
async fn test_create_rejects_blank_content() {
    let app = spawn_app(None).await;
    let cookie = app.login().await;

    for body in [
        json!({ "date": "01.01.2024", "content": "   " }),
        json!({ "date": "", "content": "text" }),
        json!({ "content": "text" }),
        json!({}),
    ] {
        let reply = app
            .send(Method::POST, "/api/news", Some(&cookie), Some(body))
            .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.body["error"], "Укажите дату и текст");
    }

    assert!(app.news().await.is_empty());
}

#[tokio::test]
async fn test_create_with_malformed_body() {
    let app = spawn_app(None).await;
    let cookie = app.login().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/news")
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"date\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_unknown_id() {
    let app = spawn_app(None).await;
    let cookie = app.login().await;
    app.send(
        Method::POST,
        "/api/news",
        Some(&cookie),
        Some(json!({ "date": "01.01.2024", "content": "Hello" })),
    )
    .await;
    let before = app.news().await;

    let reply = app
        .send(
            Method::PUT,
            "/api/news/does-not-exist",
            Some(&cookie),
            Some(json!({ "content": "Changed" })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["error"], "Новость не найдена");
    assert_eq!(app.news().await, before);
}

#[tokio::test]
async fn test_update_blank_content_rejected() {
    let app = spawn_app(None).await;
    let cookie = app.login().await;
    let created = app
        .send(
            Method::POST,
            "/api/news",
            Some(&cookie),
            Some(json!({ "date": "01.01.2024", "content": "Hello" })),
        )
        .await;
    let id = created.body["id"].as_str().unwrap();

    let reply = app
        .send(
            Method::PUT,
            &format!("/api/news/{id}"),
            Some(&cookie),
            Some(json!({ "content": "  " })),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.news().await[0].content, "Hello");
}

#[tokio::test]
async fn test_update_without_body() {
    let app = spawn_app(None).await;
    let cookie = app.login().await;
    let created = app
        .send(
            Method::POST,
            "/api/news",
            Some(&cookie),
            Some(json!({ "date": "01.01.2024", "content": "Hello" })),
        )
        .await;
    let id = created.body["id"].as_str().unwrap();

    let unknown = app
        .send(Method::PUT, "/api/news/unknown", Some(&cookie), None)
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.body["error"], "Новость не найдена");

    let known = app
        .send(Method::PUT, &format!("/api/news/{id}"), Some(&cookie), None)
        .await;
    assert_eq!(known.status, StatusCode::OK);
    assert_eq!(known.body["date"], "01.01.2024");
    assert_eq!(known.body["content"], "Hello");
}

#[tokio::test]
async fn test_delete_unknown_id_is_noop() {
    let app = spawn_app(None).await;
    let cookie = app.login().await;
    app.send(
        Method::POST,
        "/api/news",
        Some(&cookie),
        Some(json!({ "date": "01.01.2024", "content": "Hello" })),
    )
    .await;

    let reply = app
        .send(Method::DELETE, "/api/news/nope", Some(&cookie), None)
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({ "ok": true }));
    assert_eq!(app.news().await.len(), 1);
}

#[tokio::test]
async fn test_malformed_news_file_serves_empty_list() {
    let app = spawn_app(None).await;
    tokio::fs::write(app.store.path(), b"not json at all").await.unwrap();

    let reply = app.get("/api/news", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!([]));
}

// ============================================================================
// Admin gate
// ============================================================================

#[tokio::test]
async fn test_anonymous_mutations_rejected() {
    let app = spawn_app(None).await;
    let cookie = app.login().await;
    let created = app
        .send(
            Method::POST,
            "/api/news",
            Some(&cookie),
            Some(json!({ "date": "01.01.2024", "content": "Keep me" })),
        )
        .await;
    let id = created.body["id"].as_str().unwrap().to_string();
    let before = app.news().await;

    let attempts = [
        (
            Method::POST,
            "/api/news".to_string(),
            Some(json!({ "date": "02.01.2024", "content": "Sneaky" })),
        ),
        (
            Method::PUT,
            format!("/api/news/{id}"),
            Some(json!({ "content": "Sneaky" })),
        ),
        (Method::DELETE, format!("/api/news/{id}"), None),
    ];
    for (method, uri, body) in attempts {
        let reply = app.send(method, &uri, None, body).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.body["error"], "Требуется авторизация");
    }

    assert_eq!(app.news().await, before);
}

#[tokio::test]
async fn test_wrong_password() {
    let app = spawn_app(None).await;

    for body in [json!({ "password": "admin123" }), json!({})] {
        let reply = app
            .send(Method::POST, "/api/admin/login", None, Some(body))
            .await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.body["error"], "Неверный пароль");
    }

    let check = app.get("/api/admin/check", None).await;
    assert_eq!(check.body, json!({ "admin": false }));
}

#[tokio::test]
async fn test_form_login() {
    let app = spawn_app(None).await;

    let post_form = |body: String| {
        Request::builder()
            .method(Method::POST)
            .uri("/api/admin/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    };

    let rejected = app
        .router
        .clone()
        .oneshot(post_form("password=wrong".to_string()))
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);

    // k7#Qp2!vLm9z, form-encoded
    let accepted = app
        .router
        .clone()
        .oneshot(post_form("password=k7%23Qp2%21vLm9z".to_string()))
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::OK);

    let cookie = session_cookie(accepted.headers());
    let check = app.get("/api/admin/check", Some(&cookie)).await;
    assert_eq!(check.body, json!({ "admin": true }));
}

#[tokio::test]
async fn test_login_check_logout() {
    let app = spawn_app(None).await;

    let check = app.get("/api/admin/check", None).await;
    assert_eq!(check.status, StatusCode::OK);
    assert_eq!(check.body, json!({ "admin": false }));

    let cookie = app.login().await;
    let check = app.get("/api/admin/check", Some(&cookie)).await;
    assert_eq!(check.body, json!({ "admin": true }));

    let logout = app
        .send(Method::POST, "/api/admin/logout", Some(&cookie), None)
        .await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body, json!({ "ok": true }));

    // The old token no longer grants anything.
    let check = app.get("/api/admin/check", Some(&cookie)).await;
    assert_eq!(check.body, json!({ "admin": false }));
    let create = app
        .send(
            Method::POST,
            "/api/news",
            Some(&cookie),
            Some(json!({ "date": "01.01.2024", "content": "late" })),
        )
        .await;
    assert_eq!(create.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session() {
    let app = spawn_app(None).await;
    let reply = app.send(Method::POST, "/api/admin/logout", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn test_forged_cookie_is_anonymous() {
    let app = spawn_app(None).await;
    let check = app
        .get("/api/admin/check", Some("otechestvo_session=forged-value"))
        .await;
    assert_eq!(check.body, json!({ "admin": false }));
}

// ============================================================================
// External feed
// ============================================================================

#[tokio::test]
async fn test_vk_news_without_token_is_empty() {
    let app = spawn_app(None).await;
    let reply = app.get("/api/vk-news", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!([]));
}

#[tokio::test]
async fn test_vk_news_window_and_mapping() {
    let api_base = spawn_fake_vk(wall(6)).await;
    let app = spawn_app(Some(api_base)).await;

    let reply = app.get("/api/vk-news", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let items: Vec<NewsItem> = serde_json::from_value(reply.body).unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["97", "96", "95"]);
    assert_eq!(items[0].content, "VK post 3 second line");
    assert_eq!(
        items[0].link.as_deref(),
        Some("https://vk.com/wall-224887019_97")
    );
    // 2024-01-01 00:00 UTC minus three days
    assert_eq!(items[0].date, "29.12.2023");
}

#[tokio::test]
async fn test_vk_error_degrades_to_empty() {
    let api_base = spawn_fake_vk(json!({
        "error": { "error_code": 5, "error_msg": "User authorization failed" }
    }))
    .await;
    let app = spawn_app(Some(api_base)).await;

    let reply = app.get("/api/vk-news", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!([]));
}

#[tokio::test]
async fn test_vk_unreachable_degrades_to_empty() {
    // Bind and drop a listener to get a port nobody serves.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let app = spawn_app(Some(format!("http://{addr}/method"))).await;
    let reply = app.get("/api/feed", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!([]));
}

#[tokio::test]
async fn test_feed_prefers_full_vk_set() {
    let api_base = spawn_fake_vk(wall(6)).await;
    let app = spawn_app(Some(api_base)).await;
    let cookie = app.login().await;
    app.send(
        Method::POST,
        "/api/news",
        Some(&cookie),
        Some(json!({ "date": "01.01.2024", "content": "local" })),
    )
    .await;

    let feed: Vec<NewsItem> =
        serde_json::from_value(app.get("/api/feed", None).await.body).unwrap();
    assert_eq!(feed.len(), 3);
    assert!(feed.iter().all(|item| item.link.is_some()));

    // The local list is still served on its own endpoint.
    let local = app.news().await;
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].content, "local");
}

#[tokio::test]
async fn test_feed_falls_back_to_local() {
    // Four raw posts leave a single mirrored item.
    let api_base = spawn_fake_vk(wall(4)).await;
    let app = spawn_app(Some(api_base)).await;
    let cookie = app.login().await;
    app.send(
        Method::POST,
        "/api/news",
        Some(&cookie),
        Some(json!({ "date": "01.01.2024", "content": "local" })),
    )
    .await;

    assert_eq!(
        app.get("/api/vk-news", None).await.body.as_array().unwrap().len(),
        1
    );

    let feed: Vec<NewsItem> =
        serde_json::from_value(app.get("/api/feed", None).await.body).unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].content, "local");
    assert!(feed[0].link.is_none());
}

// ============================================================================
// Ambient behaviour
// ============================================================================

#[tokio::test]
async fn test_health_and_headers() {
    let app = spawn_app(None).await;

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");

    let reply = app.get("/api/news", None).await;
    assert_eq!(reply.headers[header::CACHE_CONTROL], "no-store, max-age=0");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = spawn_app(None).await;
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_static_files_served() {
    let app = spawn_app(None).await;
    let public = app.dir.path().join("public");
    tokio::fs::create_dir_all(&public).await.unwrap();
    tokio::fs::write(public.join("index.html"), "<h1>Отечество</h1>")
        .await
        .unwrap();

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(std::str::from_utf8(&bytes).unwrap(), "<h1>Отечество</h1>");

    let missing = app.get("/nope.html", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
