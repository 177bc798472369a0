use crate::{
    analytics::AnalyticsProvider,
    config::Config,
    dialogs::DialogAction,
    feed::AlertSnapshot,
    keep::{KeepClient, settings::RuntimeConfig},
    modal::ModalKind,
    presets::percent_decode,
    screens::{
        alerts::AlertsScreen,
        api_key::{self, ApiKeyScreen},
        users::{self, AddUserOutcome, Prompter, UsersScreen},
    },
};
use axum::{
    Json, Router,
    extract::{RawPathParams, Request, State},
    http::Method,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use hyper::StatusCode;
use serde::Deserialize;
use std::{
    collections::{HashMap, VecDeque},
    net::SocketAddr,
    sync::{Arc, Mutex, PoisonError},
};
use tokio::sync::{Mutex as AsyncMutex, watch};

type ScreenHandle = Arc<AsyncMutex<AlertsScreen>>;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    client: KeepClient,
    alerts: watch::Receiver<AlertSnapshot>,
    analytics: AnalyticsProvider,
    screens: Arc<AsyncMutex<HashMap<String, ScreenHandle>>>,
}

impl AppState {
    pub fn new(
        config: Config,
        client: KeepClient,
        alerts: watch::Receiver<AlertSnapshot>,
        analytics: AnalyticsProvider,
    ) -> Self {
        Self {
            config: Arc::new(config),
            client,
            alerts,
            analytics,
            screens: Arc::new(AsyncMutex::new(HashMap::new())),
        }
    }

    /// The refreshed alerts screen of a preset. Only screens of existing presets are kept,
    /// so dialog state lives as long as the server without growing on unknown names.
    async fn screen(&self, preset: &str) -> ScreenHandle {
        let key = percent_decode(preset).to_lowercase();

        let cached = self.screens.lock().await.get(&key).cloned();
        if let Some(screen) = cached {
            screen.lock().await.refresh().await;
            return screen;
        }

        let screen = AlertsScreen::new(self.client.clone(), preset, self.alerts.clone());
        screen.refresh().await;

        if screen.selected_preset().is_none() {
            return Arc::new(AsyncMutex::new(screen));
        }

        self.screens
            .lock()
            .await
            .entry(key)
            .or_insert_with(|| Arc::new(AsyncMutex::new(screen)))
            .clone()
    }
}

/// Creates an Axum Web Server
pub async fn create_server(state: AppState) -> anyhow::Result<()> {
    tracing::info!("Starting the web server");

    let addr: SocketAddr = format!("{}:{}", state.config.http.host, state.config.http.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Unable to parse address: {}", e))?;

    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    axum_server::bind(addr)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await?;

    Ok(())
}

/// Create the router for the application
pub fn create_router(state: AppState) -> Router {
    let pages = Router::new()
        .route("/alerts/{preset}", get(alerts_page))
        .route("/alerts/{preset}/modals/{kind}/confirm", post(confirm_modal))
        .route("/alerts/{preset}/modals/{kind}/{fingerprint}", post(open_modal))
        .route("/alerts/{preset}/modals/{kind}", delete(close_modal))
        .route("/settings/api-key", get(api_key_page))
        .route("/settings/users", get(users_page).post(add_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            track_navigation,
        ));

    Router::new()
        .route("/alive", get(alive))
        .route("/metrics", get(metrics))
        .route("/api/config", get(runtime_config))
        .merge(pages)
        .with_state(state)
}

/// Record a page view for every page that is fetched
async fn track_navigation(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.method() == Method::GET {
        let uri = request.uri();
        state.analytics.on_navigation(
            &state.config.ui_url(),
            uri.path(),
            uri.query(),
            state.client.session(),
        );
    }

    next.run(request).await
}

/// Look up a path parameter, still percent-encoded
fn raw_param(params: &RawPathParams, name: &str) -> String {
    params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}

fn modal_kind(params: &RawPathParams) -> Result<ModalKind, (StatusCode, String)> {
    raw_param(params, "kind")
        .parse()
        .map_err(|e: anyhow::Error| (StatusCode::NOT_FOUND, e.to_string()))
}

/// This is the handler for the /alive path
async fn alive() -> StatusCode {
    crate::metrics::http::record_http_request("/alive");
    let _timer = crate::metrics::http::http_request_timer("/alive");

    StatusCode::OK
}

/// This is the handler for the /metrics path
#[tracing::instrument]
async fn metrics() -> impl IntoResponse {
    crate::metrics::http::record_http_request("/metrics");
    let _timer = crate::metrics::http::http_request_timer("/metrics");

    match crate::metrics::render() {
        Some(rendered) => (StatusCode::OK, rendered),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to get the metrics handle".to_string(),
        ),
    }
}

/// This is the handler for the /api/config path
async fn runtime_config(State(state): State<AppState>) -> Json<RuntimeConfig> {
    crate::metrics::http::record_http_request("/api/config");

    Json(RuntimeConfig {
        auth_type: state.config.auth.auth_type.clone(),
    })
}

/// This is the handler for the /alerts/{preset} path
async fn alerts_page(State(state): State<AppState>, params: RawPathParams) -> (StatusCode, String) {
    crate::metrics::http::record_http_request("/alerts");
    let _timer = crate::metrics::http::http_request_timer("/alerts");

    let screen = state.screen(&raw_param(&params, "preset")).await;
    let screen = screen.lock().await;

    // An unknown preset renders an empty page
    (StatusCode::OK, screen.render().unwrap_or_default())
}

async fn open_modal(State(state): State<AppState>, params: RawPathParams) -> (StatusCode, String) {
    crate::metrics::http::record_http_request("/alerts/modals/open");

    let kind = match modal_kind(&params) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let fingerprints: Vec<String> = percent_decode(&raw_param(&params, "fingerprint"))
        .split(',')
        .map(str::to_string)
        .collect();

    let screen = state.screen(&raw_param(&params, "preset")).await;
    let mut screen = screen.lock().await;

    match screen.open(kind, &fingerprints).await {
        Ok(()) => (StatusCode::OK, screen.render().unwrap_or_default()),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()),
    }
}

async fn close_modal(State(state): State<AppState>, params: RawPathParams) -> (StatusCode, String) {
    crate::metrics::http::record_http_request("/alerts/modals/close");

    let kind = match modal_kind(&params) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    let screen = state.screen(&raw_param(&params, "preset")).await;
    let mut screen = screen.lock().await;
    screen.close(kind);

    (StatusCode::OK, screen.render().unwrap_or_default())
}

async fn confirm_modal(
    State(state): State<AppState>,
    params: RawPathParams,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, String) {
    crate::metrics::http::record_http_request("/alerts/modals/confirm");

    let kind = match modal_kind(&params) {
        Ok(kind) => kind,
        Err(response) => return response,
    };
    let action = match DialogAction::from_json(kind, body) {
        Ok(action) => action,
        Err(e) => return (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
    };

    let screen = state.screen(&raw_param(&params, "preset")).await;
    let mut screen = screen.lock().await;

    match screen.confirm(action).await {
        Ok(()) => (StatusCode::OK, screen.render().unwrap_or_default()),
        Err(e) => {
            tracing::error!("Failed to confirm {} dialog: {}", kind, e);
            (StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

/// This is the handler for the /settings/api-key path
async fn api_key_page(State(state): State<AppState>) -> (StatusCode, String) {
    crate::metrics::http::record_http_request("/settings/api-key");
    let _timer = crate::metrics::http::http_request_timer("/settings/api-key");

    let screen = ApiKeyScreen::new(state.client.clone(), api_key::TAB);
    screen.load().await;

    (StatusCode::OK, screen.render())
}

/// This is the handler for the /settings/users path
async fn users_page(State(state): State<AppState>) -> (StatusCode, String) {
    crate::metrics::http::record_http_request("/settings/users");
    let _timer = crate::metrics::http::http_request_timer("/settings/users");

    let screen = UsersScreen::new(state.client.clone(), users::TAB);
    screen.load().await;

    (StatusCode::OK, screen.render())
}

#[derive(Debug, Deserialize, Default)]
struct AddUserForm {
    email: Option<String>,
    password: Option<String>,
}

/// Answers the add-user prompts from a submitted form, in order
struct FormPrompter {
    answers: Mutex<VecDeque<Option<String>>>,
    alerts: Mutex<Vec<String>>,
}

impl FormPrompter {
    fn new(form: AddUserForm) -> Self {
        Self {
            answers: Mutex::new(VecDeque::from([form.email, form.password])),
            alerts: Mutex::new(Vec::new()),
        }
    }

    fn alerts(&self) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Prompter for FormPrompter {
    async fn prompt(&self, message: &str) -> Option<String> {
        tracing::debug!("Answering prompt '{}' from form", message);

        self.answers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .flatten()
    }

    async fn alert(&self, message: &str) {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}

/// This is the handler for POST /settings/users
async fn add_user(State(state): State<AppState>, Json(form): Json<AddUserForm>) -> (StatusCode, String) {
    crate::metrics::http::record_http_request("/settings/users/add");

    let screen = UsersScreen::new(state.client.clone(), users::TAB);
    screen.load().await;

    let prompter = FormPrompter::new(form);

    match screen.add_user(&prompter).await {
        AddUserOutcome::Created { .. } => (StatusCode::CREATED, screen.render()),
        AddUserOutcome::Cancelled => (StatusCode::NO_CONTENT, String::new()),
        AddUserOutcome::Unsupported => (StatusCode::BAD_REQUEST, prompter.alerts().join("\n")),
        AddUserOutcome::Failed { error } => (StatusCode::BAD_GATEWAY, error),
    }
}
