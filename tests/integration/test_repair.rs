//! Integration tests for the course category repair job.
//!
//! Drift is introduced by editing the store directly, the way a crash
//! between two writes in an older deployment would have left it.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use academy_api::{
    create_router, AppState, Catalog, CategoryInput, Config, CourseInput, LocalizedText,
    RepairReport, Store,
};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use uuid::Uuid;

fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

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

    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://{addr}/api"), handle)
}

/// Seeds two categories with three courses, then unlists every course.
///
/// Returns the catalog plus the category ids.
async fn seed_drifted_catalog(store: Arc<Store>) -> (Catalog, Uuid, Uuid) {
    let catalog = Catalog::new(Arc::clone(&store), Config::default().required_languages);

    let science = catalog
        .create_category(CategoryInput {
            name: LocalizedText::new().with("en", "Science"),
            ..CategoryInput::default()
        })
        .await
        .unwrap()
        .id;
    let art = catalog
        .create_category(CategoryInput {
            name: LocalizedText::new().with("en", "Art"),
            ..CategoryInput::default()
        })
        .await
        .unwrap()
        .id;

    for (title, category) in [("Physics", science), ("Biology", science), ("Painting", art)] {
        catalog
            .create_course(CourseInput {
                title: LocalizedText::new().with("en", title),
                category: Some(category),
                ..CourseInput::default()
            })
            .await
            .unwrap();
    }

    store
        .write(|data| {
            for category in data.categories.values_mut() {
                category.courses.clear();
            }
            Ok(())
        })
        .await
        .unwrap();

    (catalog, science, art)
}

async fn listed_courses(client: &Client, base: &str, category: Uuid) -> usize {
    let body: Value = client
        .get(format!("{base}/category/{category}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["data"]["courses"].as_array().unwrap().len()
}

/// Tests that the endpoint restores every listing and reports what it did.
#[tokio::test]
async fn test_repair_endpoint_restores_listings() {
    let store = Arc::new(Store::in_memory());
    let (_, science, art) = seed_drifted_catalog(Arc::clone(&store)).await;
    let (base, server) = spawn_test_server(AppState::with_store(Config::default(), store)).await;
    let client = Client::new();

    assert_eq!(listed_courses(&client, &base, science).await, 0);

    let response = client
        .post(format!("{base}/courses/update-categories"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let report: RepairReport = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(report.courses_scanned, 3);
    assert_eq!(report.courses_appended, 3);
    assert_eq!(report.categories_updated, 2);
    assert!(report.dangling_category_refs.is_empty());

    assert_eq!(listed_courses(&client, &base, science).await, 2);
    assert_eq!(listed_courses(&client, &base, art).await, 1);

    server.abort();
}

/// Tests that concurrent repair runs append each course exactly once.
#[tokio::test]
async fn test_concurrent_repairs_do_not_duplicate() {
    let store = Arc::new(Store::in_memory());
    let (_, science, art) = seed_drifted_catalog(Arc::clone(&store)).await;
    let (base, server) = spawn_test_server(AppState::with_store(Config::default(), store)).await;
    let client = Client::new();

    let runs = (0..6).map(|_| {
        let client = client.clone();
        let url = format!("{base}/courses/update-categories");
        async move {
            let body: Value = client.post(url).send().await.unwrap().json().await.unwrap();
            serde_json::from_value::<RepairReport>(body["data"].clone()).unwrap()
        }
    });
    let reports = futures::future::join_all(runs).await;

    let appended: usize = reports.iter().map(|r| r.courses_appended).sum();
    assert_eq!(appended, 3);

    assert_eq!(listed_courses(&client, &base, science).await, 2);
    assert_eq!(listed_courses(&client, &base, art).await, 1);

    server.abort();
}

/// Tests that a course pointing at a deleted category is reported, not fatal.
#[tokio::test]
async fn test_repair_reports_dangling_category() {
    let store = Arc::new(Store::in_memory());
    let (catalog, _, art) = seed_drifted_catalog(Arc::clone(&store)).await;

    store
        .write(|data| {
            data.categories.remove(&art);
            Ok(())
        })
        .await
        .unwrap();

    let report = catalog.repair_course_categories().await.unwrap();
    assert_eq!(report.courses_scanned, 3);
    assert_eq!(report.courses_appended, 2);
    assert_eq!(report.dangling_category_refs.len(), 1);

    let again = catalog.repair_course_categories().await.unwrap();
    assert_eq!(again.courses_appended, 0);
    assert_eq!(again.dangling_category_refs, report.dangling_category_refs);
}

/// Tests that a repair against a snapshot file is persisted.
#[tokio::test]
async fn test_repair_persists_to_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");

    let science = {
        let store = Arc::new(Store::open(&path).await.unwrap());
        let (catalog, science, _) = seed_drifted_catalog(store).await;
        let report = catalog.repair_course_categories().await.unwrap();
        assert_eq!(report.courses_appended, 3);
        science
    };

    let reopened = Store::open(&path).await.unwrap();
    let listed = reopened
        .read(|data| data.categories.get(&science).map(|c| c.courses.len()))
        .await;
    assert_eq!(listed, Some(2));
}
