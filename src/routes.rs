use axum::extract::{DefaultBodyLimit, Multipart};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::AppResult;
use crate::state::AppState;

mod account;
mod assignments;
mod course_info;
mod dashboard;
mod mapping;
mod rubric;

pub fn router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.files.root().to_path_buf());
    Router::new()
        // session
        .route("/api/account/login", post(account::login))
        .route("/api/account/logout", post(account::logout))
        .route("/api/account/me", get(account::me))
        .route("/api/dashboard", get(dashboard::index))
        // course information
        .route(
            "/api/courses/:code/outline",
            get(course_info::outline).post(course_info::upload_outline),
        )
        .route(
            "/api/courses/:code/outcomes",
            get(course_info::learning_outcomes).put(course_info::save_learning_outcomes),
        )
        // assignments
        .route("/api/assignments/context", get(assignments::context))
        .route("/api/assignments/information", get(assignments::information))
        .route("/api/assignments/upload", post(assignments::upload))
        // rubrics
        .route("/api/assignments/:id/rubric", get(rubric::index))
        .route("/api/assignments/:id/rubric/import", post(rubric::import))
        .route("/api/rubrics/:id", get(rubric::preview).put(rubric::edit))
        // lo mapping
        .route(
            "/api/assignments/:id/mappings",
            get(mapping::index).put(mapping::save),
        )
        // uploaded files
        .nest_service("/uploads", uploads)
        .with_state(state)
}

/// Full application: API router plus health check and the HTTP layers.
pub fn app(state: AppState) -> Router {
    let max_upload = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(router(state))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}

// --- helpers ---

pub(crate) struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The `file` part of a multipart form, if one with content was sent.
pub(crate) async fn read_upload(mp: &mut Multipart) -> AppResult<Option<Upload>> {
    let mut upload = None;
    while let Some(field) = mp.next_field().await? {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("").to_string();
            let bytes = field.bytes().await?.to_vec();
            if !bytes.is_empty() {
                upload = Some(Upload { file_name, bytes });
            }
        }
    }
    Ok(upload)
}
