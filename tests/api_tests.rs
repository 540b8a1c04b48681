use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use church_api::{
    AppConfig, AppState, Env, MemoryRepository, MockUploadStore,
    auth::{Claims, hash_password},
    create_router, repository::{Repository, RepositoryState}, storage::UploadStoreState,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

/// Spawns the full router on an ephemeral port with the in-memory
/// repository and mock upload store, seeded with one admin account.
async fn spawn_app_with_config(config: AppConfig) -> TestApp {
    let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
    let password_hash = hash_password("password123").expect("hash failed");
    repo.create_user("admin", &password_hash, "admin")
        .await
        .expect("seed admin failed");

    let uploads = Arc::new(MockUploadStore::new()) as UploadStoreState;
    let state = AppState::new(repo, uploads, config);
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{port}"),
    }
}

async fn spawn_app() -> TestApp {
    spawn_app_with_config(AppConfig::default()).await
}

async fn admin_token(app: &TestApp) -> String {
    let response = reqwest::Client::new()
        .post(format!("{}/auth/login", app.address))
        .json(&json!({ "username": "admin", "password": "password123" }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    body["token"].as_str().expect("token missing").to_string()
}

fn sermon_json(title: &str) -> Value {
    json!({
        "title": title,
        "speaker": "John Owen",
        "date": "2024-03-01T10:00:00Z",
        "category": "Expository",
        "description": "A sermon long enough to pass validation bounds."
    })
}

fn ministry_json(name: &str, active: bool) -> Value {
    json!({
        "name": name,
        "description": "Weekly gathering for the whole congregation.",
        "purpose": "Fellowship and discipleship",
        "meetingTime": "Fridays 7pm",
        "meetingLocation": "Fellowship hall",
        "contactPerson": "Jane Doe",
        "contactEmail": "jane@example.com",
        "isActive": active
    })
}

// --- Health & routing ---

#[tokio::test]
async fn health_check_reports_ok() {
    let app = spawn_app().await;
    let response = reqwest::get(format!("{}/health", app.address))
        .await
        .expect("req fail");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = spawn_app().await;
    let response = reqwest::get(format!("{}/definitely-not-a-route", app.address))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Endpoint not found");
}

// --- Auth ---

#[tokio::test]
async fn login_succeeds_with_valid_credentials() {
    let app = spawn_app().await;
    let response = reqwest::Client::new()
        .post(format!("{}/auth/login", app.address))
        .json(&json!({ "username": "admin", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Login successful");
    assert!(body["token"].as_str().unwrap().len() > 20);
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["role"], "admin");
    // The hash must never leak.
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_failures_are_undifferentiated() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    for payload in [
        json!({ "username": "admin", "password": "wrong-password" }),
        json!({ "username": "nobody", "password": "password123" }),
    ] {
        let response = client
            .post(format!("{}/auth/login", app.address))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "Invalid credentials");
    }
}

#[tokio::test]
async fn admin_login_alias_works() {
    let app = spawn_app().await;
    let response = reqwest::Client::new()
        .post(format!("{}/admin/login", app.address))
        .json(&json!({ "username": "admin", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn create_admin_conflicts_on_existing_username() {
    let app = spawn_app().await;
    let response = reqwest::Client::new()
        .post(format!("{}/auth/create-admin", app.address))
        .json(&json!({ "username": "admin", "password": "another-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Admin user already exists");
}

#[tokio::test]
async fn create_admin_disabled_in_production() {
    let config = AppConfig {
        env: Env::Production,
        ..AppConfig::default()
    };
    let app = spawn_app_with_config(config).await;

    let response = reqwest::Client::new()
        .post(format!("{}/auth/create-admin", app.address))
        .json(&json!({ "username": "newadmin", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Not allowed in production");
}

#[tokio::test]
async fn create_admin_succeeds_in_development() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/auth/create-admin", app.address))
        .json(&json!({ "username": "second", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let login = client
        .post(format!("{}/auth/login", app.address))
        .json(&json!({ "username": "second", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), 200);
}

#[tokio::test]
async fn admin_routes_reject_missing_and_bad_tokens() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/admin/sermons", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = client
        .get(format!("{}/admin/sermons", app.address))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Tokens signed with a different secret are rejected too.
    let foreign = church_api::auth::issue_token(
        Uuid::new_v4(),
        "admin",
        &AppConfig {
            jwt_secret: "some-other-secret".to_string(),
            ..AppConfig::default()
        },
    )
    .unwrap();
    let response = client
        .get(format!("{}/admin/sermons", app.address))
        .bearer_auth(foreign)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = spawn_app().await;
    let config = AppConfig::default();

    // Correctly signed, but expired an hour ago.
    let now = Utc::now();
    let claims = Claims {
        sub: Uuid::new_v4(),
        role: "admin".to_string(),
        iat: (now - Duration::hours(25)).timestamp() as usize,
        exp: (now - Duration::hours(1)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .unwrap();

    let response = reqwest::Client::new()
        .get(format!("{}/admin/stats", app.address))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

// --- Sermons ---

#[tokio::test]
async fn sermon_lifecycle_roundtrip() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/admin/sermons", app.address))
        .bearer_auth(&token)
        .json(&sermon_json("On Grace"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    // camelCase on the wire.
    assert!(created.get("createdAt").is_some());
    assert!(created.get("created_at").is_none());

    let response = reqwest::get(format!("{}/sermons", app.address)).await.unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["sermons"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["pagination"]["current"], 1);

    let response = reqwest::get(format!("{}/sermons/{id}", app.address)).await.unwrap();
    assert_eq!(response.status(), 200);

    let mut updated = sermon_json("On Grace, Revised");
    updated["duration"] = json!(45);
    let response = client
        .put(format!("{}/admin/sermons/{id}", app.address))
        .bearer_auth(&token)
        .json(&updated)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "On Grace, Revised");
    assert_eq!(body["duration"], 45);
    assert_eq!(body["createdAt"], created["createdAt"]);

    let response = client
        .delete(format!("{}/admin/sermons/{id}", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Sermon deleted successfully");

    let response = reqwest::get(format!("{}/sermons/{id}", app.address)).await.unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Sermon not found");
}

#[tokio::test]
async fn sermon_validation_names_every_bad_field() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/admin/sermons", app.address))
        .bearer_auth(&token)
        .json(&json!({ "title": "Only a title" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Validation failed");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    for expected in ["speaker", "date", "category", "description"] {
        assert!(fields.contains(&expected), "missing {expected}: {fields:?}");
    }

    // Nothing was persisted.
    let response = reqwest::get(format!("{}/sermons", app.address)).await.unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn sermon_rejects_unknown_category() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let mut payload = sermon_json("On Grace");
    payload["category"] = json!("Fireside Chat");
    let response = reqwest::Client::new()
        .post(format!("{}/admin/sermons", app.address))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"category"));
}

#[tokio::test]
async fn sermon_filters_and_pagination() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let client = reqwest::Client::new();

    for (title, category) in [
        ("On Grace", "Expository"),
        ("Romans Overview", "Book Study"),
        ("On Prayer", "Expository"),
    ] {
        let mut payload = sermon_json(title);
        payload["category"] = json!(category);
        let response = client
            .post(format!("{}/admin/sermons", app.address))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    let response = reqwest::get(format!(
        "{}/sermons?category=Expository",
        app.address
    ))
    .await
    .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 2);

    // "All" disables the filter.
    let response = reqwest::get(format!("{}/sermons?category=All", app.address))
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 3);

    let response = reqwest::get(format!("{}/sermons?search=romans", app.address))
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 1);

    let response = reqwest::get(format!("{}/sermons?page=2&limit=2", app.address))
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["sermons"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["pages"], 2);
    assert_eq!(body["pagination"]["current"], 2);
}

#[tokio::test]
async fn absurd_page_number_returns_empty_page() {
    let app = spawn_app().await;

    let response = reqwest::get(format!(
        "{}/sermons?page={}&limit=100",
        app.address,
        i64::MAX
    ))
    .await
    .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["sermons"].as_array().unwrap().len(), 0);
}

// --- Articles ---

fn article_json(title: &str, published: bool) -> Value {
    json!({
        "title": title,
        "author": "Jane Doe",
        "content": "Body text comfortably above the minimum length.",
        "excerpt": "A short excerpt above ten characters.",
        "category": "Teaching",
        "isPublished": published
    })
}

#[tokio::test]
async fn drafts_are_invisible_on_public_routes() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/admin/articles", app.address))
        .bearer_auth(&token)
        .json(&article_json("Draft", false))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_str().unwrap();
    assert!(created["publishDate"].is_null());

    // Public list and detail hide the draft.
    let response = reqwest::get(format!("{}/sermons/articles", app.address))
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 0);

    let response = reqwest::get(format!("{}/sermons/articles/{id}", app.address))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Admin list still shows it.
    let response = client
        .get(format!("{}/admin/articles", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admin_article_list_is_unpaged() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let client = reqwest::Client::new();

    for i in 0..12 {
        let response = client
            .post(format!("{}/admin/articles", app.address))
            .bearer_auth(&token)
            .json(&article_json(&format!("Article {i}"), i % 2 == 0))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    // The dashboard gets every article in one response, drafts included.
    let response = client
        .get(format!("{}/admin/articles", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn first_publication_backfills_publish_date_once() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/admin/articles", app.address))
        .bearer_auth(&token)
        .json(&article_json("On Hope", false))
        .send()
        .await
        .unwrap();
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let response = client
        .put(format!("{}/admin/articles/{id}", app.address))
        .bearer_auth(&token)
        .json(&article_json("On Hope", true))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let published: Value = response.json().await.unwrap();
    let first_date = published["publishDate"].as_str().unwrap().to_string();

    // A second publish keeps the original date.
    let response = client
        .put(format!("{}/admin/articles/{id}", app.address))
        .bearer_auth(&token)
        .json(&article_json("On Hope", true))
        .send()
        .await
        .unwrap();
    let republished: Value = response.json().await.unwrap();
    assert_eq!(republished["publishDate"].as_str().unwrap(), first_date);

    // Now public.
    let response = reqwest::get(format!("{}/sermons/articles/{id}", app.address))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

// --- Missions ---

fn mission_json(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Medical and construction outreach trip.",
        "purpose": "Serve the village clinic and school.",
        "startDate": "2024-06-01T00:00:00Z",
        "status": "Active",
        "locations": [{
            "name": "San Pedro",
            "address": "Main road, San Pedro",
            "description": "Village clinic construction site."
        }]
    })
}

#[tokio::test]
async fn mission_lifecycle_and_not_found_message() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/admin/missions", app.address))
        .bearer_auth(&token)
        .json(&mission_json("Guatemala 2024"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["locations"][0]["name"], "San Pedro");

    // Public listing is a bare array.
    let response = reqwest::get(format!("{}/missions", app.address)).await.unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = reqwest::get(format!("{}/missions/{id}", app.address))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = reqwest::get(format!("{}/missions/{}", app.address, Uuid::new_v4()))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Mission not found");
}

#[tokio::test]
async fn mission_filters_by_status_and_location() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let client = reqwest::Client::new();

    let mut kenya = mission_json("Kenya 2023");
    kenya["status"] = json!("Completed");
    kenya["locations"] = json!([{
        "name": "Nairobi",
        "address": "Eastlands, Nairobi",
        "description": "School construction site."
    }]);

    for payload in [mission_json("Guatemala 2024"), kenya] {
        let response = client
            .post(format!("{}/admin/missions", app.address))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    fn names(body: &Value) -> Vec<&str> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect()
    }

    let response = reqwest::get(format!("{}/missions?status=Completed", app.address))
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(names(&body), vec!["Kenya 2023"]);

    // "All" disables the status filter.
    let response = reqwest::get(format!("{}/missions?status=All", app.address))
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Location is a case-insensitive substring match on location names.
    let response = reqwest::get(format!("{}/missions?location=nairo", app.address))
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(names(&body), vec!["Kenya 2023"]);
}

#[tokio::test]
async fn mission_rejects_invalid_status_and_bad_location() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let client = reqwest::Client::new();

    let mut payload = mission_json("Guatemala 2024");
    payload["status"] = json!("Paused");
    let response = client
        .post(format!("{}/admin/missions", app.address))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let mut payload = mission_json("Guatemala 2024");
    payload["locations"] = json!([{ "name": "", "address": "", "description": "" }]);
    let response = client
        .post(format!("{}/admin/missions", app.address))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(
        fields.iter().any(|f| f.starts_with("locations[0]")),
        "expected a nested location path in {fields:?}"
    );
}

// --- Ministries ---

#[tokio::test]
async fn inactive_ministries_hidden_from_public() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let client = reqwest::Client::new();

    for (name, active) in [("Youth", true), ("Archived Choir", false)] {
        let response = client
            .post(format!("{}/admin/ministries", app.address))
            .bearer_auth(&token)
            .json(&ministry_json(name, active))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    let response = reqwest::get(format!("{}/ministries", app.address)).await.unwrap();
    let body: Value = response.json().await.unwrap();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Youth"]);

    let response = client
        .get(format!("{}/admin/ministries", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn ministry_filters_by_age_group_and_search() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let client = reqwest::Client::new();

    let mut youth = ministry_json("Youth Group", true);
    youth["ageGroup"] = json!("Youth");
    let mut choir = ministry_json("Chancel Choir", true);
    choir["ageGroup"] = json!("Adults");

    for payload in [youth, choir] {
        let response = client
            .post(format!("{}/admin/ministries", app.address))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    fn names(body: &Value) -> Vec<&str> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|m| m["name"].as_str().unwrap())
            .collect()
    }

    let response = reqwest::get(format!("{}/ministries?ageGroup=Youth", app.address))
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(names(&body), vec!["Youth Group"]);

    // "All" disables the age-group filter.
    let response = reqwest::get(format!("{}/ministries?ageGroup=All", app.address))
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Search is a case-insensitive substring match on name/description.
    let response = reqwest::get(format!("{}/ministries?search=choir", app.address))
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(names(&body), vec!["Chancel Choir"]);
}

// --- Contact & stats ---

#[tokio::test]
async fn contact_flow_feeds_admin_inbox_and_stats() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let client = reqwest::Client::new();

    // Invalid submission reports fields and stores nothing.
    let response = client
        .post(format!("{}/contact", app.address))
        .json(&json!({ "name": "J", "email": "bad", "message": "short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = client
        .post(format!("{}/contact", app.address))
        .json(&json!({
            "name": "Visitor",
            "email": "visitor@example.com",
            "message": "I would like to know your service times."
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Thank you for your message. We will get back to you soon."
    );
    let submitted_id = body["id"].as_str().expect("submission id missing").to_string();

    let response = client
        .get(format!("{}/admin/stats", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let stats: Value = response.json().await.unwrap();
    assert_eq!(stats["unreadMessages"], 1);

    let response = client
        .get(format!("{}/admin/contact-messages", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let inbox: Value = response.json().await.unwrap();
    assert_eq!(inbox["pagination"]["total"], 1);
    let id = inbox["messages"][0]["id"].as_str().unwrap().to_string();
    // The inbox entry is the record the submitter was handed an id for.
    assert_eq!(id, submitted_id);
    assert_eq!(inbox["messages"][0]["isRead"], false);

    let response = client
        .patch(format!("{}/admin/contact-messages/{id}/read", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let read: Value = response.json().await.unwrap();
    assert_eq!(read["isRead"], true);

    let response = client
        .get(format!("{}/admin/stats", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let stats: Value = response.json().await.unwrap();
    assert_eq!(stats["unreadMessages"], 0);

    let response = client
        .delete(format!("{}/admin/contact-messages/{id}", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Contact message deleted successfully");

    // Unread filter on an empty inbox.
    let response = client
        .get(format!("{}/admin/contact-messages?isRead=false", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let inbox: Value = response.json().await.unwrap();
    assert_eq!(inbox["pagination"]["total"], 0);
}

// --- Uploads ---

#[tokio::test]
async fn upload_accepts_png_and_returns_public_url() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let form = reqwest::multipart::Form::new().part(
        "image",
        reqwest::multipart::Part::bytes(vec![0u8; 1024])
            .file_name("Sunday Cover.png")
            .mime_str("image/png")
            .unwrap(),
    );
    let response = reqwest::Client::new()
        .post(format!("{}/admin/uploads", app.address))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    let url = body["url"].as_str().unwrap();
    assert!(url.contains("/uploads/Sunday_Cover-"));
    assert!(url.ends_with(".png"));
}

#[tokio::test]
async fn upload_rejects_wrong_type_and_oversize() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().part(
        "image",
        reqwest::multipart::Part::bytes(vec![0u8; 64])
            .file_name("anim.gif")
            .mime_str("image/gif")
            .unwrap(),
    );
    let response = client
        .post(format!("{}/admin/uploads", app.address))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 415);

    let form = reqwest::multipart::Form::new().part(
        "image",
        reqwest::multipart::Part::bytes(vec![0u8; 6 * 1024 * 1024])
            .file_name("huge.png")
            .mime_str("image/png")
            .unwrap(),
    );
    let response = client
        .post(format!("{}/admin/uploads", app.address))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 413);
}

#[tokio::test]
async fn upload_accepts_audio_with_higher_ceiling() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    // 6 MiB would be rejected as an image but passes as audio.
    let form = reqwest::multipart::Form::new().part(
        "audio",
        reqwest::multipart::Part::bytes(vec![0u8; 6 * 1024 * 1024])
            .file_name("sermon.mp3")
            .mime_str("audio/mpeg")
            .unwrap(),
    );
    let response = reqwest::Client::new()
        .post(format!("{}/admin/uploads", app.address))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert!(body["url"].as_str().unwrap().ends_with(".mp3"));
}

// --- Rate limiting ---

#[tokio::test]
async fn requests_over_quota_get_429_with_retry_after() {
    let config = AppConfig {
        rate_limit_window_secs: 900,
        rate_limit_max_requests: 2,
        ..AppConfig::default()
    };
    let app = spawn_app_with_config(config).await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let response = client
            .get(format!("{}/health", app.address))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 429);
    assert!(response.headers().contains_key("retry-after"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["message"],
        "Too many requests from this IP, please try again later."
    );
}
