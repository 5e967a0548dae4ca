use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::auth::{self, Lecturer, Principal};
use crate::error::{AppError, AppResult};
use crate::models::LoginReq;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> AppResult<impl IntoResponse> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Please enter username and password."));
    }

    let principal = match state.auth.authenticate(req.username.trim(), &req.password) {
        Some(p) => p,
        None => {
            tracing::warn!(target: "auth", username = %req.username, "login rejected");
            return Err(AppError::InvalidCredentials);
        }
    };

    let token = state.sessions.create(principal.clone());
    tracing::info!(target: "auth", username = %principal.username, "login successful");
    Ok((
        [(SET_COOKIE, auth::session_cookie(&token))],
        Json(json!({ "message": "Login successful.", "principal": principal })),
    ))
}

pub async fn logout(lecturer: Lecturer, State(state): State<AppState>) -> impl IntoResponse {
    state.sessions.remove(&lecturer.token);
    tracing::info!(target: "auth", username = %lecturer.principal.username, "logged out");
    (
        [(SET_COOKIE, auth::expired_session_cookie())],
        Json(json!({ "message": "You have been logged out." })),
    )
}

pub async fn me(lecturer: Lecturer) -> Json<Principal> {
    Json(lecturer.principal)
}
