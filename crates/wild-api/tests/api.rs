//! Router-level tests: requests go through `build_router` exactly as the
//! server would see them, against a fresh in-memory database per test.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wild_api::{AppState, build_router};
use wild_common::config::{
    self, AppConfig, AuthConfig, DatabaseConfig, PaginationConfig, ServerConfig, StorageConfig,
};
use wild_db::{Database, storage::MediaStore};

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            min_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".into(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 7200,
        },
        storage: StorageConfig {
            data_dir: std::env::temp_dir().display().to_string(),
            max_upload_bytes: 1024 * 1024,
        },
        pagination: PaginationConfig { page_size: 20 },
    }
}

async fn app() -> Router {
    config::init_with(test_config());
    let db = Database::in_memory().await.unwrap();
    let media = std::env::temp_dir().join(format!("wild-api-test-{}", uuid::Uuid::new_v4()));
    build_router(AppState {
        db,
        storage: MediaStore::at(media),
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/v1/auth/register",
            None,
            json!({"username": username, "password": "testuserpassword"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["access_token"].as_str().unwrap().to_string()
}

async fn add_animal(app: &Router, token: &str, name: &str) -> Value {
    let (status, body) = send(
        app,
        post_json("/api/v1/animals", Some(token), json!({"name": name, "description": "wild"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, get("/api/v1/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_register_login_refresh() {
    let app = app().await;
    register(&app, "testuser").await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/auth/register",
            None,
            json!({"username": "TestUser", "password": "testuserpassword"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ALREADY_EXISTS");

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/auth/login",
            None,
            json!({"username": "testuser", "password": "wrongpassword"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/auth/login",
            None,
            json!({"username": "testuser", "password": "testuserpassword"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["username"], "testuser");

    let refresh = body["refresh_token"].as_str().unwrap();
    let (status, body) = send(
        &app,
        post_json("/api/v1/auth/refresh", None, json!({"refresh_token": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());

    // a refresh token is not an access token
    let (status, _) = send(
        &app,
        post_json("/api/v1/animals", Some(refresh), json!({"name": "Lion"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_animal_and_view_it() {
    let app = app().await;

    let (status, _) = send(&app, post_json("/api/v1/animals", None, json!({"name": "Lion"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = register(&app, "testuser").await;
    let lion = add_animal(&app, &token, "Lion").await;
    assert_eq!(lion["slug"], "lion");
    assert_eq!(lion["author_username"], "testuser");

    let (status, body) = send(
        &app,
        post_json("/api/v1/animals", Some(&token), json!({"name": "lion!"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "An animal with this name already exists.");

    let (status, body) = send(
        &app,
        post_json("/api/v1/animals", Some(&token), json!({"name": "???"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = send(&app, get("/api/v1/animals/lion?sort_by=name", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["animal"]["name"], "Lion");
    assert_eq!(body["sort_by"], "title");
    assert_eq!(body["discussions"], json!([]));

    let (status, _) = send(&app, get("/api/v1/animals/unicorn", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_animal_list_pagination() {
    let app = app().await;
    let token = register(&app, "testuser").await;
    for i in 0..21 {
        add_animal(&app, &token, &format!("Beetle {i:02}")).await;
    }

    let (_, body) = send(&app, get("/api/v1/animals?sort_by=name", None)).await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["num_pages"], 2);
    assert_eq!(body["total"], 21);
    assert_eq!(body["has_next"], true);
    assert_eq!(body["items"].as_array().unwrap().len(), 20);
    assert_eq!(body["items"][0]["name"], "Beetle 00");

    let (_, body) = send(&app, get("/api/v1/animals?sort_by=name&page=99", None)).await;
    assert_eq!(body["page"], 2);
    assert_eq!(body["has_previous"], true);
    assert_eq!(body["items"][0]["name"], "Beetle 20");

    let (_, body) = send(&app, get("/api/v1/animals?page=abc&sort_by=bogus", None)).await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["sort_by"], "newest");
}

#[tokio::test]
async fn test_discussion_and_comments() {
    let app = app().await;
    let token = register(&app, "testuser").await;
    let lion = add_animal(&app, &token, "Lion").await;

    let (status, body) = send(&app, get("/api/v1/add_discussion?selected=lion", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["animal_id"], lion["id"]);

    let (status, discussion) = send(
        &app,
        post_json(
            "/api/v1/discussions",
            Some(&token),
            json!({"title": "Why do you like Lion?", "animal_id": lion["id"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{discussion}");
    assert_eq!(discussion["slug"], "why-do-you-like-lion");

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/discussions",
            Some(&token),
            json!({"title": "Why do you like Lion", "animal_id": lion["id"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "A discussion with this title already exists.");

    let (status, _) = send(
        &app,
        post_json(
            "/api/v1/discussions/why-do-you-like-lion/comments",
            Some(&token),
            json!({"content": "The mane!"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, get("/api/v1/discussions/why-do-you-like-lion?sort_by=title", None)).await;
    assert_eq!(body["sort_by"], "newest");
    assert_eq!(body["comments"][0]["content"], "The mane!");

    let (_, body) = send(&app, get("/api/v1/animals/lion", None)).await;
    assert_eq!(body["discussions"][0]["title"], "Why do you like Lion?");
}

#[tokio::test]
async fn test_discussion_titled_new_is_reachable() {
    let app = app().await;
    let token = register(&app, "testuser").await;
    let lion = add_animal(&app, &token, "Lion").await;

    let (status, discussion) = send(
        &app,
        post_json("/api/v1/discussions", Some(&token), json!({"title": "New", "animal_id": lion["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{discussion}");
    assert_eq!(discussion["slug"], "new");

    let (status, body) = send(&app, get("/api/v1/discussions/new", None)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["discussion"]["title"], "New");

    let (status, _) = send(&app, get("/api/v1/add_discussion", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_detail_pages_show_viewer_vote() {
    let app = app().await;
    let token = register(&app, "testuser").await;
    let other = register(&app, "otheruser").await;
    let lion = add_animal(&app, &token, "Lion").await;
    let lion_id = lion["id"].as_i64().unwrap();

    let (_, body) = send(&app, get("/api/v1/animals/lion", Some(&token))).await;
    assert_eq!(body["my_vote"], "none");

    send(&app, get(&format!("/api/v1/vote?category=animals&id={lion_id}&status=upvote"), Some(&token))).await;
    let (_, body) = send(&app, get("/api/v1/animals/lion", Some(&token))).await;
    assert_eq!(body["my_vote"], "up");
    let (_, body) = send(&app, get("/api/v1/animals/lion", Some(&other))).await;
    assert_eq!(body["my_vote"], "none");
    let (_, body) = send(&app, get("/api/v1/animals/lion", None)).await;
    assert_eq!(body["my_vote"], "none");

    let (_, discussion) = send(
        &app,
        post_json("/api/v1/discussions", Some(&token), json!({"title": "Manes", "animal_id": lion_id})),
    )
    .await;
    let (_, comment) = send(
        &app,
        post_json("/api/v1/discussions/manes/comments", Some(&token), json!({"content": "Fluffy"})),
    )
    .await;
    let comment_id = comment["id"].as_i64().unwrap();
    let discussion_id = discussion["id"].as_i64().unwrap();

    send(&app, get(&format!("/api/v1/vote?category=comments&id={comment_id}&status=downvote"), Some(&other))).await;
    send(&app, get(&format!("/api/v1/vote?category=discussions&id={discussion_id}&status=upvote"), Some(&other))).await;

    let (_, body) = send(&app, get("/api/v1/discussions/manes", Some(&other))).await;
    assert_eq!(body["my_vote"], "up");
    assert_eq!(body["comments"][0]["content"], "Fluffy");
    assert_eq!(body["comments"][0]["my_vote"], "down");

    let (_, body) = send(&app, get("/api/v1/discussions/manes", Some(&token))).await;
    assert_eq!(body["my_vote"], "none");
    assert_eq!(body["comments"][0]["my_vote"], "none");

    let (_, list) = send(
        &app,
        post_json("/api/v1/lists", Some(&token), json!({"title": "Cats", "animal_ids": [lion_id]})),
    )
    .await;
    let list_id = list["id"].as_i64().unwrap();
    send(&app, get(&format!("/api/v1/vote?category=lists&id={list_id}&status=downvote"), Some(&token))).await;

    let (_, body) = send(&app, get("/api/v1/lists/cats", Some(&token))).await;
    assert_eq!(body["my_vote"], "down");
}

#[tokio::test]
async fn test_voting() {
    let app = app().await;

    let (_, body) = send(&app, get("/api/v1/vote?category=animals&id=1&status=upvote", None)).await;
    assert_eq!(body, json!({"status": "login", "login_url": "/api/v1/auth/login"}));

    let token = register(&app, "testuser").await;
    let lion = add_animal(&app, &token, "Lion").await;
    let id = lion["id"].as_i64().unwrap();

    let uri = |status: &str| format!("/api/v1/vote?category=animals&id={id}&status={status}");

    let (_, body) = send(&app, get(&uri("upvote"), Some(&token))).await;
    assert_eq!(body, json!({"status": "success", "count": 1}));

    let (_, body) = send(&app, get(&uri("downvote"), Some(&token))).await;
    assert_eq!(body["count"], -1);

    let (_, body) = send(&app, get(&uri("downvoted"), Some(&token))).await;
    assert_eq!(body["count"], 0);

    let (_, body) = send(&app, get(&uri("sideways"), Some(&token))).await;
    assert_eq!(body, json!({"status": "success", "count": 0}));

    let (_, body) = send(&app, get("/api/v1/vote?category=petitions&id=1&status=upvote", Some(&token))).await;
    assert_eq!(body, json!({"status": "error"}));

    let (_, body) = send(&app, get("/api/v1/vote?category=birds&id=1&status=upvote", Some(&token))).await;
    assert_eq!(body, json!({"status": "error"}));

    let (_, body) = send(&app, get("/api/v1/vote?category=animals&id=999&status=upvote", Some(&token))).await;
    assert_eq!(body, json!({"status": "error"}));
}

#[tokio::test]
async fn test_petition_signing() {
    let app = app().await;
    let token = register(&app, "testuser").await;
    let lion = add_animal(&app, &token, "Lion").await;

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/petitions",
            Some(&token),
            json!({"title": "Save the gorgeous Lion", "goal": 5, "animal_ids": [lion["id"]]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, petition) = send(
        &app,
        post_json(
            "/api/v1/petitions",
            Some(&token),
            json!({"title": "Save the gorgeous Lion", "animal_ids": [lion["id"]]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{petition}");
    assert_eq!(petition["goal"], 10);
    let id = petition["id"].as_i64().unwrap();

    let (_, body) = send(&app, get(&format!("/api/v1/sign?petition_id={id}"), None)).await;
    assert_eq!(body["status"], "login");

    let (_, body) = send(&app, get(&format!("/api/v1/sign?petition_id={id}"), Some(&token))).await;
    assert_eq!(body, json!({"status": "success"}));

    let (_, body) = send(&app, get(&format!("/api/v1/sign?petition_id={id}"), Some(&token))).await;
    assert_eq!(body, json!({"status": "already_signed"}));

    let (_, body) = send(&app, get("/api/v1/sign?petition_id=999", Some(&token))).await;
    assert_eq!(body, json!({"status": "error"}));

    let (_, body) = send(&app, get("/api/v1/petitions/save-the-gorgeous-lion", Some(&token))).await;
    assert_eq!(body["has_signed"], true);
    assert_eq!(body["progress_width"], 10);
    assert_eq!(body["animals"][0]["name"], "Lion");

    let (_, body) = send(&app, get("/api/v1/petitions/save-the-gorgeous-lion", None)).await;
    assert_eq!(body["has_signed"], false);

    let (_, body) = send(&app, get("/api/v1/petitions?sort_by=most_signed", None)).await;
    assert_eq!(body["sort_label"], "most signed");
    assert_eq!(body["items"][0]["signatures"], 1);
}

#[tokio::test]
async fn test_user_lists() {
    let app = app().await;
    let token = register(&app, "testuser").await;
    let lion = add_animal(&app, &token, "Lion").await;
    let owl = add_animal(&app, &token, "Owl").await;

    let (status, _) = send(
        &app,
        post_json("/api/v1/lists", Some(&token), json!({"title": "Empty", "animal_ids": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_json("/api/v1/lists", Some(&token), json!({"title": "Ghosts", "animal_ids": [999]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, list) = send(
        &app,
        post_json(
            "/api/v1/lists",
            Some(&token),
            json!({"title": "testuser's favourite animals", "animal_ids": [owl["id"], lion["id"]]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{list}");

    let (_, body) = send(&app, get("/api/v1/lists/testusers-favourite-animals?sort_by=title", None)).await;
    assert_eq!(body["user_list"]["title"], "testuser's favourite animals");
    assert_eq!(body["animals"]["sort_by"], "name");
    assert_eq!(body["animals"]["items"][0]["name"], "Lion");
    assert_eq!(body["animals"]["total"], 2);
}

#[tokio::test]
async fn test_search() {
    let app = app().await;
    let token = register(&app, "testuser").await;
    add_animal(&app, &token, "Lion").await;
    add_animal(&app, &token, "Sea Lion").await;

    let (_, body) = send(&app, get("/api/v1/search?searched=%20%20&category=Animals", None)).await;
    assert_eq!(body["searched"], "");
    assert_eq!(body["results"], Value::Null);

    let (_, body) = send(&app, get("/api/v1/search?searched=Lion&category=Animals", None)).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    let (_, body) = send(&app, get("/api/v1/search?searched=test&category=Profiles", None)).await;
    assert_eq!(body["results"][0]["username"], "testuser");
    assert!(body["results"][0].get("password_hash").is_none());

    let (_, body) = send(&app, get("/api/v1/search?searched=Lion&category=Birds", None)).await;
    assert_eq!(body["results"], Value::Null);
}

#[tokio::test]
async fn test_theme_cookie() {
    let app = app().await;

    let response = app.clone().oneshot(get("/api/v1/theme?theme=dark", None)).await.unwrap();
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("theme=dark"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Theme set to: dark");

    let response = app.clone().oneshot(get("/api/v1/theme?theme=blue", None)).await.unwrap();
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"-1");
}

#[tokio::test]
async fn test_profile_tabs() {
    let app = app().await;
    let token = register(&app, "testuser").await;
    add_animal(&app, &token, "Lion").await;

    let (status, body) = send(&app, get("/api/v1/profiles/testuser?tab=nonsense", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tab"], "animals");
    assert_eq!(body["loguser"], Value::Null);
    assert_eq!(body["results"][0]["name"], "Lion");

    let (_, body) = send(&app, get("/api/v1/profiles/testuser?tab=petitions", Some(&token))).await;
    assert_eq!(body["tab"], "petitions");
    assert_eq!(body["loguser"], "testuser");
    assert_eq!(body["results"], json!([]));

    let request = Request::patch("/api/v1/profiles/@me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"description": "I like lions"}).to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "I like lions");

    let (_, body) = send(&app, get("/api/v1/profiles?sort_by=name", None)).await;
    assert_eq!(body["items"][0]["description"], "I like lions");
}

fn multipart(uri: &str, token: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let boundary = "wildboundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"pic\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_picture_upload_is_author_only() {
    let app = app().await;
    let author = register(&app, "testuser").await;
    let stranger = register(&app, "stranger").await;
    add_animal(&app, &author, "Lion").await;

    let (status, _) = send(
        &app,
        multipart("/api/v1/animals/lion/picture", &stranger, "image/png", b"png"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        multipart("/api/v1/animals/lion/picture", &author, "application/pdf", b"pdf"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        multipart("/api/v1/animals/lion/picture", &author, "image/png", b"png"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let url = body["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/media/animal_images/"));

    let response = app.clone().oneshot(get(&url, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, body) = send(&app, get("/api/v1/animals/lion", None)).await;
    assert_eq!(body["animal"]["picture"], url.trim_start_matches("/media/"));
}
