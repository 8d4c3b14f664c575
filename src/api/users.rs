//! Auth, user management and analytics endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::catalog::ActiveRequest;
use super::{superseded_response, ApiError, ApiResult, AppState};
use crate::actions::{ActionOutcome, ANALYTICS};
use crate::bus::{BusEvent, SharedBus};
use crate::domain::{AnalyticsQuery, NewUser, Role, User};
use crate::session::{clear_session_cookie, session_cookie, Viewer};

pub(crate) fn announce_user(bus: &SharedBus, user: &User) {
    bus.publish(BusEvent::UserChanged {
        user_id: user.id.clone(),
    });
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/login - Returns the session and sets the token cookie
pub async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Response {
    match state.backend.login(&req.email, &req.password).await {
        Ok(session) => {
            info!("{} signed in as {}", session.user.email, session.user.role);
            (
                [(header::SET_COOKIE, session_cookie(&session.token))],
                Json(session),
            )
                .into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}

/// POST /api/auth/logout
pub async fn logout_handler() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie())],
    )
}

/// GET /api/me
pub async fn me_handler(viewer: Viewer) -> Json<User> {
    Json(viewer.user)
}

#[derive(Deserialize)]
pub struct UsersQuery {
    pub role: Option<Role>,
}

/// GET /api/users?role=CLIENT
pub async fn users_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<UsersQuery>,
) -> ApiResult<Vec<User>> {
    Ok(Json(
        state.backend.list_users(&viewer.token, query.role).await?,
    ))
}

/// POST /api/users
pub async fn create_user_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(new_user): Json<NewUser>,
) -> ApiResult<User> {
    let user = state.backend.create_user(&viewer.token, &new_user).await?;
    announce_user(&state.bus, &user);
    Ok(Json(user))
}

/// PATCH /api/users/{user_id} - Activate or deactivate
pub async fn user_update_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(user_id): Path<String>,
    Json(req): Json<ActiveRequest>,
) -> ApiResult<User> {
    let user = state
        .backend
        .set_user_active(&viewer.token, &user_id, req.active)
        .await?;
    announce_user(&state.bus, &user);
    Ok(Json(user))
}

/// GET /api/analytics?from=2026-03-01&to=2026-03-31
///
/// A newer request from the same user supersedes one still running.
pub async fn analytics_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(query): Query<AnalyticsQuery>,
) -> Response {
    let backend = state.backend.clone();
    let outcome = state
        .actions
        .run(&viewer.user.id, ANALYTICS, async {
            backend.analytics(&viewer.token, &query).await
        })
        .await;
    match outcome {
        ActionOutcome::Completed(Ok(report)) => Json(report).into_response(),
        ActionOutcome::Completed(Err(e)) => ApiError(e).into_response(),
        ActionOutcome::Superseded => superseded_response(),
    }
}
