#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use keep_dashboard::{
    auth::Session,
    config::Keep,
    keep::KeepClient,
    screens::users::Prompter,
};
use serde_json::{Value, json};
use std::{
    collections::VecDeque,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

pub const TOKEN: &str = "test-token";
pub const CURRENT_USER: &str = "admin@example.com";

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub body: Value,
}

#[derive(Default)]
pub struct MockState {
    pub requests: Vec<Recorded>,
    pub users: Vec<Value>,
    pub auth_type: String,
    pub fail_api_key: bool,
}

/// In-process stand-in for the alerting backend
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<Mutex<MockState>>,
}

type Shared = Arc<Mutex<MockState>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {}", TOKEN))
}

fn record(state: &Shared, method: &str, path: String, body: Value) {
    state.lock().unwrap().requests.push(Recorded {
        method: method.to_string(),
        path,
        body,
    });
}

pub fn alerts() -> Value {
    json!([
        {
            "id": "1",
            "name": "High CPU",
            "status": "firing",
            "lastReceived": "2024-03-01T10:00:00.000Z",
            "severity": "critical",
            "source": ["prometheus"],
            "fingerprint": "fp-cpu"
        },
        {
            "id": "2",
            "name": "Disk full",
            "status": "firing",
            "lastReceived": "2024-03-01T09:00:00.000Z",
            "severity": "warning",
            "source": ["datadog"],
            "fingerprint": "fp-disk"
        },
        {
            "id": "3",
            "name": "Old outage",
            "status": "resolved",
            "lastReceived": "2024-02-01T09:00:00.000Z",
            "dismissed": true,
            "fingerprint": "fp-old"
        }
    ])
}

impl MockBackend {
    pub async fn start(auth_type: &str) -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState {
            auth_type: auth_type.to_string(),
            users: vec![
                json!({
                    "name": "Admin",
                    "email": CURRENT_USER,
                    "created_at": "2024-01-01",
                    "last_login": "2024-03-01"
                }),
                json!({
                    "name": "Jane",
                    "email": "jane@example.com",
                    "created_at": "2024-02-01"
                }),
            ],
            ..Default::default()
        }));

        let router = Router::new()
            .route("/alerts", get(|| async { Json(alerts()) }))
            .route(
                "/preset",
                get(|| async {
                    Json(json!([{
                        "id": "p-critical",
                        "name": "Critical",
                        "options": [
                            {"label": "severity", "value": "critical"},
                            {"label": "CEL", "value": "severity == 'critical'"}
                        ]
                    }]))
                }),
            )
            .route(
                "/providers",
                get(|| async {
                    Json(json!({"installed_providers": [
                        {"id": "jira-1", "type": "jira", "display_name": "Jira", "tags": ["ticketing"]},
                        {"id": "slack-1", "type": "slack", "display_name": "Slack", "tags": ["messaging"]}
                    ]}))
                }),
            )
            .route(
                "/workflows",
                get(|| async { Json(json!([{"id": "wf-1", "name": "Restart service"}])) }),
            )
            .route(
                "/alerts/enrich",
                post(|State(state): State<Shared>, Json(body): Json<Value>| async move {
                    record(&state, "POST", "/alerts/enrich".into(), body);
                    StatusCode::OK
                }),
            )
            .route(
                "/alerts/batch_enrich",
                post(|State(state): State<Shared>, Json(body): Json<Value>| async move {
                    record(&state, "POST", "/alerts/batch_enrich".into(), body);
                    StatusCode::OK
                }),
            )
            .route(
                "/workflows/{id}/run",
                post(
                    |State(state): State<Shared>, Path(id): Path<String>, Json(body): Json<Value>| async move {
                        record(&state, "POST", format!("/workflows/{}/run", id), body);
                        StatusCode::OK
                    },
                ),
            )
            .route(
                "/settings/apikey",
                get(|State(state): State<Shared>, headers: HeaderMap| async move {
                    record(&state, "GET", "/settings/apikey".into(), Value::Null);
                    if !authorized(&headers) {
                        return Err(StatusCode::UNAUTHORIZED);
                    }
                    if state.lock().unwrap().fail_api_key {
                        return Err(StatusCode::INTERNAL_SERVER_ERROR);
                    }
                    Ok(Json(json!({"apiKey": "secret-key"})))
                }),
            )
            .route(
                "/settings/users",
                get(|State(state): State<Shared>| async move {
                    record(&state, "GET", "/settings/users".into(), Value::Null);
                    let users = state.lock().unwrap().users.clone();
                    Json(Value::Array(users))
                }),
            )
            .route(
                "/settings/users/{email}",
                post(
                    |State(state): State<Shared>,
                     Path(email): Path<String>,
                     headers: HeaderMap,
                     Json(body): Json<Value>| async move {
                        if !authorized(&headers) {
                            return StatusCode::UNAUTHORIZED;
                        }
                        record(&state, "POST", format!("/settings/users/{}", email), body);
                        state.lock().unwrap().users.push(json!({
                            "name": email,
                            "email": email,
                            "created_at": "2024-03-02"
                        }));
                        StatusCode::OK
                    },
                ),
            )
            .route(
                "/api/config",
                get(|State(state): State<Shared>| async move {
                    let auth_type = state.lock().unwrap().auth_type.clone();
                    Json(json!({"AUTH_TYPE": auth_type}))
                }),
            )
            .with_state(state.clone());

        let addr = serve(router).await;

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> KeepClient {
        KeepClient::new(
            Keep::new(self.url(), Some(TOKEN.to_string()), None, false).unwrap(),
            self.url(),
            Session::new(TOKEN).with_email(CURRENT_USER),
        )
        .unwrap()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Recorded mutations (everything but GETs)
    pub fn mutations(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|request| request.method != "GET")
            .collect()
    }
}

/// Serve a router on an ephemeral local port
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

/// Answers prompts from a script and records what it was asked
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Option<String>>>,
    pub prompts: Mutex<Vec<String>>,
    pub alerts: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn answering(answers: &[Option<&str>]) -> Self {
        Self {
            answers: Mutex::new(
                answers
                    .iter()
                    .map(|answer| answer.map(str::to_string))
                    .collect(),
            ),
            ..Default::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    async fn prompt(&self, message: &str) -> Option<String> {
        self.prompts.lock().unwrap().push(message.to_string());
        self.answers.lock().unwrap().pop_front().flatten()
    }

    async fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}
