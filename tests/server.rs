mod common;

use common::{CURRENT_USER, MockBackend, TOKEN, serve};
use keep_dashboard::{
    analytics::{AnalyticsProvider, PAGEVIEW, Tracker},
    config::Config,
    feed::AlertFeed,
    http::{AppState, create_router},
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

#[derive(Default)]
struct RecordingTracker {
    pageviews: Mutex<Vec<(String, String)>>,
}

impl Tracker for RecordingTracker {
    fn identify(&self, _distinct_id: &str) {}

    fn capture(&self, distinct_id: &str, event: &str, properties: Value) {
        if event == PAGEVIEW {
            self.pageviews.lock().unwrap().push((
                distinct_id.to_string(),
                properties["$current_url"].as_str().unwrap_or_default().to_string(),
            ));
        }
    }
}

struct Dashboard {
    url: String,
    backend: MockBackend,
    tracker: Arc<RecordingTracker>,
    http: reqwest::Client,
}

impl Dashboard {
    async fn start(auth_type: &str) -> Self {
        let backend = MockBackend::start(auth_type).await;

        let config = Config::from_yaml(&format!(
            r#"
keep:
  url: {backend}
  token: {token}
ui:
  url: {backend}
auth:
  type: {auth_type}
session:
  email: {email}
http:
  host: 127.0.0.1
  port: 0
"#,
            backend = backend.url(),
            token = TOKEN,
            auth_type = auth_type,
            email = CURRENT_USER,
        ))
        .unwrap();

        let client = backend.client();
        let feed = AlertFeed::new(client.clone(), Duration::ZERO);
        feed.refresh().await.unwrap();

        let tracker = Arc::new(RecordingTracker::default());
        let analytics = AnalyticsProvider::new(tracker.clone(), true);

        let state = AppState::new(config, client, feed.subscribe(), analytics);
        let addr = serve(create_router(state)).await;

        Self {
            url: format!("http://{}", addr),
            backend,
            tracker,
            http: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> (StatusCode, String) {
        let response = self
            .http
            .get(format!("{}{}", self.url, path))
            .send()
            .await
            .unwrap();
        (response.status(), response.text().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, String) {
        let response = self
            .http
            .post(format!("{}{}", self.url, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        (response.status(), response.text().await.unwrap())
    }
}

#[tokio::test]
async fn alive_responds() {
    let dashboard = Dashboard::start("NO_AUTH").await;

    let (status, _) = dashboard.get("/alive").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn runtime_config_reports_auth_type() {
    let dashboard = Dashboard::start("SINGLE_TENANT").await;

    let (status, body) = dashboard.get("/api/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({"AUTH_TYPE": "SINGLE_TENANT"})
    );
}

#[tokio::test]
async fn mixed_case_preset_renders_feed() {
    let dashboard = Dashboard::start("NO_AUTH").await;

    let (status, body) = dashboard.get("/alerts/Feed").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("[feed] | dismissed | groups | Critical"));
    assert!(body.contains("fp-cpu"));
    assert!(body.contains("History: feed"));
}

#[tokio::test]
async fn unknown_preset_renders_an_empty_page() {
    let dashboard = Dashboard::start("NO_AUTH").await;

    let (status, body) = dashboard.get("/alerts/unknown-xyz").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn dialogs_open_confirm_and_close_over_http() {
    let dashboard = Dashboard::start("NO_AUTH").await;

    let (status, body) = dashboard
        .post("/alerts/feed/modals/note/fp-cpu", json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Add note: High CPU"));

    let (status, body) = dashboard
        .post("/alerts/feed/modals/note/confirm", json!({"note": "on it"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("Add note"));
    assert_eq!(dashboard.backend.mutations().len(), 1);

    let (status, _) = dashboard
        .post("/alerts/feed/modals/view/fp-missing", json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = dashboard
        .post("/alerts/feed/modals/bogus/fp-cpu", json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let response = dashboard
        .http
        .delete(format!("{}/alerts/feed/modals/view", dashboard.url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_key_page_shows_key() {
    let dashboard = Dashboard::start("NO_AUTH").await;

    let (status, body) = dashboard.get("/settings/api-key").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("secret-key"));
}

#[tokio::test]
async fn adding_user_in_no_auth_mode_is_refused() {
    let dashboard = Dashboard::start("NO_AUTH").await;

    let (status, body) = dashboard
        .post("/settings/users", json!({"email": "new@example.com"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("NO_AUTH"));
    assert!(dashboard.backend.mutations().is_empty());
}

#[tokio::test]
async fn adding_user_in_single_tenant_mode_creates_it() {
    let dashboard = Dashboard::start("SINGLE_TENANT").await;

    let (status, body) = dashboard
        .post(
            "/settings/users",
            json!({"email": "bob", "password": "hunter2"}),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains("bob"));
    assert_eq!(dashboard.backend.mutations()[0].path, "/settings/users/bob");
}

#[tokio::test]
async fn page_views_are_tracked_for_pages_only() {
    let dashboard = Dashboard::start("NO_AUTH").await;

    dashboard.get("/alive").await;
    dashboard.get("/alerts/feed?sort=asc").await;

    let pageviews = dashboard.tracker.pageviews.lock().unwrap().clone();
    assert_eq!(pageviews.len(), 1);
    assert_eq!(pageviews[0].0, CURRENT_USER);
    assert_eq!(
        pageviews[0].1,
        format!("{}/alerts/feed?sort=asc", dashboard.backend.url())
    );
}
