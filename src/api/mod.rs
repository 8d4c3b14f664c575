//! HTTP API handlers
//!
//! JSON mirror of the backend operations under `/api/`, used by page scripts
//! and external tools, plus the `/status` health check and the `/events`
//! SSE stream. Every successful mutation is published on the bus.

pub mod catalog;
pub mod orders;
pub mod users;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::warn;

use crate::actions::{ActionRegistry, SharedActions};
use crate::activity::{ActivityTracker, TrackedBackend};
use crate::backend::{Backend, BackendError, SharedBackend};
use crate::bus::{EventFilter, SharedBus};
use crate::domain::Role;
use crate::format::DisplayFormat;
use crate::session::Viewer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: SharedBackend,
    pub bus: SharedBus,
    pub activity: ActivityTracker,
    pub actions: SharedActions,
    pub display: Arc<DisplayFormat>,
    /// Serving generated demo data
    pub demo: bool,
    /// Seeded accounts listed on the login page in demo mode
    pub demo_accounts: Arc<Vec<(String, Role)>>,
    pub started_at: Instant,
}

impl AppState {
    /// Wraps `backend` so every call is counted as activity
    pub fn new<B: Backend + 'static>(
        backend: B,
        bus: SharedBus,
        display: DisplayFormat,
        demo: bool,
    ) -> Self {
        let activity = ActivityTracker::new(bus.clone());
        let backend: SharedBackend = Arc::new(TrackedBackend::new(backend, activity.clone()));
        Self {
            backend,
            bus,
            activity,
            actions: Arc::new(ActionRegistry::new()),
            display: Arc::new(display),
            demo,
            demo_accounts: Arc::new(Vec::new()),
            started_at: Instant::now(),
        }
    }

    pub fn with_demo_accounts(mut self, accounts: Vec<(String, Role)>) -> Self {
        self.demo_accounts = Arc::new(accounts);
        self
    }
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Backend error rendered as `{"error": ...}` with the mapped status
#[derive(Debug)]
pub struct ApiError(pub BackendError);

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!("API request failed: {}", self.0);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Response for requests replaced by a newer one from the same user
pub(crate) fn superseded_response() -> Response {
    (
        StatusCode::CONFLICT,
        Json(ErrorResponse {
            error: "Superseded by a newer request".to_string(),
        }),
    )
        .into_response()
}

/// General status response
#[derive(Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub git_sha: &'static str,
    pub uptime_secs: u64,
    pub demo: bool,
    pub requests_in_flight: usize,
    pub bus_subscribers: usize,
}

/// GET /status - Service health check
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: "catering-dashboard",
        version: env!("CATERING_VERSION"),
        git_sha: env!("CATERING_GIT_SHA"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        demo: state.demo,
        requests_in_flight: state.activity.in_flight(),
        bus_subscribers: state.bus.subscriber_count(),
    })
}

// =============================================================================
// SSE Events
// =============================================================================

/// Event filter for `viewer`; distributors follow their current clients
async fn event_filter(state: &AppState, viewer: &Viewer) -> EventFilter {
    if viewer.role() != Role::Distributor {
        return EventFilter::new(&viewer.user, []);
    }
    let clients = match state
        .backend
        .list_users(&viewer.token, Some(Role::Client))
        .await
    {
        Ok(users) => users.into_iter().map(|u| u.id).collect(),
        Err(e) => {
            warn!("Could not load clients of {} for event stream: {}", viewer.user.id, e);
            Vec::new()
        }
    };
    EventFilter::new(&viewer.user, clients)
}

/// GET /events - Server-Sent Events stream, scoped to the signed-in viewer
pub async fn events_handler(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let filter = event_filter(&state, &viewer).await;
    let rx = state.bus.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        match result {
            Ok(event) if filter.allows(&event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().data(json))),
                Err(_) => None,
            },
            Ok(_) => None,
            Err(_) => None, // Skip lagged messages
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
