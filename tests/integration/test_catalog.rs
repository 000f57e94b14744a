//! End-to-end tests for the catalog HTTP API.
//!
//! Each test spawns a real server on a free port and talks to it with
//! `reqwest`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use academy_api::{create_router, AppState, Config, Store};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

/// Finds an available port for testing.
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

/// Spawns the test server and returns its base URL.
async fn spawn_test_server(state: AppState) -> (String, tokio::task::JoinHandle<()>) {
    let port = find_available_port();
    let addr = format!("127.0.0.1:{port}");

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://{addr}/api"), handle)
}

async fn post(client: &Client, url: &str, body: Value) -> (StatusCode, Value) {
    let response = client.post(url).json(&body).send().await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

async fn get(client: &Client, url: &str) -> (StatusCode, Value) {
    let response = client.get(url).send().await.unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

fn id_of(body: &Value) -> String {
    body["data"]["id"].as_str().unwrap().to_string()
}

/// Tests the authoring flow from user to lesson, then the populated reads.
#[tokio::test]
async fn test_full_authoring_flow() {
    let (base, server) = spawn_test_server(AppState::new(Config::default())).await;
    let client = Client::new();

    let (status, user) = post(
        &client,
        &format!("{base}/users"),
        json!({"firstName": "Layla", "lastName": "Haddad", "email": "Layla@Example.com"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["data"]["email"], "layla@example.com");

    let (status, instructor) = post(
        &client,
        &format!("{base}/instructors"),
        json!({"user": id_of(&user), "headline": {"en": "Chemist"}}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, topic) = post(
        &client,
        &format!("{base}/topics"),
        json!({"name": {"en": "Organic", "ar": "عضوية"}}),
    )
    .await;
    let (status, category) = post(
        &client,
        &format!("{base}/category"),
        json!({"name": {"en": "Chemistry", "ar": "كيمياء"}, "topics": [id_of(&topic)]}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, course) = post(
        &client,
        &format!("{base}/courses"),
        json!({
            "title": {"en": "Carbon Compounds", "ar": "مركبات الكربون"},
            "category": id_of(&category),
            "instructor": id_of(&instructor),
            "price": 49.5,
            "isPublished": true
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(course["data"]["slug"]
        .as_str()
        .unwrap()
        .starts_with("carbon-compounds-"));
    let course_id = id_of(&course);

    let (status, module) = post(
        &client,
        &format!("{base}/modules"),
        json!({"course": course_id, "title": {"en": "Alkanes", "ar": "الألكانات"}}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let module_id = id_of(&module);

    for (title_en, title_ar) in [("Methane", "الميثان"), ("Ethane", "الإيثان")] {
        let (status, _) = post(
            &client,
            &format!("{base}/lessons"),
            json!({
                "module": module_id,
                "title": {"en": title_en, "ar": title_ar},
                "content": {"type": "video", "url": format!("https://cdn.example.com/{title_en}.mp4")},
                "durationMinutes": 12
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // Category read populates courses, their instructors and users, and topics
    let (status, listed) = get(&client, &format!("{base}/category/{}", id_of(&category))).await;
    assert_eq!(status, StatusCode::OK);
    let courses = listed["data"]["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["instructor"]["user"]["firstName"], "Layla");
    assert_eq!(listed["data"]["topics"][0]["name"]["ar"], "عضوية");

    let (_, fetched) = get(&client, &format!("{base}/courses/{course_id}")).await;
    assert_eq!(fetched["data"]["modules"].as_array().unwrap().len(), 1);
    assert_eq!(fetched["data"]["price"], 49.5);

    let (_, lessons) = get(&client, &format!("{base}/modules/{module_id}/lessons")).await;
    let orders: Vec<u64> = lessons["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["order"].as_u64().unwrap())
        .collect();
    assert_eq!(orders, vec![1, 2]);

    server.abort();
}

/// Tests that concurrent retries of one submission create exactly one course.
#[tokio::test]
async fn test_concurrent_retries_create_one_course() {
    let (base, server) = spawn_test_server(AppState::new(Config::default())).await;
    let client = Client::new();

    let (_, category) = post(
        &client,
        &format!("{base}/category"),
        json!({"name": {"en": "Music"}}),
    )
    .await;
    let category_id = id_of(&category);

    let payload = json!({
        "submissionId": Uuid::new_v4(),
        "title": {"en": "Maqam Basics", "ar": "أساسيات المقام"},
        "category": category_id
    });

    let url = format!("{base}/courses");
    let requests = (0..8).map(|_| post(&client, &url, payload.clone()));
    let responses = futures::future::join_all(requests).await;

    let created = responses
        .iter()
        .filter(|(status, _)| *status == StatusCode::CREATED)
        .count();
    assert_eq!(created, 1);
    assert!(responses
        .iter()
        .all(|(status, _)| status.is_success()));

    let first_id = id_of(&responses[0].1);
    assert!(responses.iter().all(|(_, body)| id_of(body) == first_id));

    let (_, courses) = get(&client, &format!("{base}/courses")).await;
    assert_eq!(courses["data"].as_array().unwrap().len(), 1);

    let (_, listed) = get(&client, &format!("{base}/category/{category_id}")).await;
    assert_eq!(listed["data"]["courses"].as_array().unwrap().len(), 1);

    server.abort();
}

/// Tests that a rejected course leaves no trace in courses or categories.
#[tokio::test]
async fn test_rejected_course_writes_nothing() {
    let (base, server) = spawn_test_server(AppState::new(Config::default())).await;
    let client = Client::new();

    let (_, category) = post(
        &client,
        &format!("{base}/category"),
        json!({"name": {"en": "History"}}),
    )
    .await;
    let category_id = id_of(&category);

    let (status, body) = post(
        &client,
        &format!("{base}/courses"),
        json!({
            "title": {"en": "Ghost"},
            "category": category_id,
            "instructor": Uuid::new_v4()
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, courses) = get(&client, &format!("{base}/courses")).await;
    assert!(courses["data"].as_array().unwrap().is_empty());
    let (_, listed) = get(&client, &format!("{base}/category/{category_id}")).await;
    assert!(listed["data"]["courses"].as_array().unwrap().is_empty());

    server.abort();
}

/// Tests that the catalog survives a restart when backed by a snapshot file.
#[tokio::test]
async fn test_catalog_persists_across_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    let client = Client::new();

    let course_id = {
        let store = Arc::new(Store::open(&path).await.unwrap());
        let (base, server) =
            spawn_test_server(AppState::with_store(Config::default(), store)).await;

        let (status, course) = post(
            &client,
            &format!("{base}/courses"),
            json!({"title": {"en": "Durable"}}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        server.abort();
        id_of(&course)
    };

    let store = Arc::new(Store::open(&path).await.unwrap());
    let (base, server) = spawn_test_server(AppState::with_store(Config::default(), store)).await;

    let (status, course) = get(&client, &format!("{base}/courses/{course_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(course["data"]["title"]["en"], "Durable");

    server.abort();
}

/// Tests bearer-token enforcement on a live server.
#[tokio::test]
async fn test_auth_token_guards_writes() {
    let config = Config {
        auth_token: Some("integration-token".to_string()),
        ..Config::default()
    };
    let (base, server) = spawn_test_server(AppState::new(config)).await;
    let client = Client::new();

    let (status, _) = post(
        &client,
        &format!("{base}/category"),
        json!({"name": {"en": "Locked"}}),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = client
        .post(format!("{base}/category"))
        .bearer_auth("integration-token")
        .json(&json!({"name": {"en": "Open"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let (status, categories) = get(&client, &format!("{base}/category")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(categories["data"].as_array().unwrap().len(), 1);

    server.abort();
}
