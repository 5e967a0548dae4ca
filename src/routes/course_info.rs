use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::Lecturer;
use crate::error::{AppError, AppResult};
use crate::models::{LearningOutcome, SaveOutcomesReq};
use crate::outline;
use crate::routes::read_upload;
use crate::state::AppState;
use crate::storage::{self, OUTLINES};
use crate::store::outcomes;

#[derive(Deserialize, Debug)]
pub struct TermQuery {
    pub year: i64,
    pub trimester: i64,
}

#[derive(Serialize, Debug)]
pub struct OutlineStatus {
    pub course_code: String,
    pub course_title: String,
    pub year: i64,
    pub trimester: i64,
    pub outline_url: Option<String>,
    pub can_reupload: bool,
}

#[derive(Serialize, Debug)]
pub struct OutlineUploaded {
    pub outline_url: String,
    pub extracted: Vec<String>,
    pub outcomes_replaced: bool,
    pub learning_outcomes: Vec<LearningOutcome>,
}

#[derive(Serialize, Debug)]
pub struct CourseOutcomes {
    pub course_code: String,
    pub can_edit: bool,
    pub learning_outcomes: Vec<LearningOutcome>,
}

pub async fn outline(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(q): Query<TermQuery>,
) -> Json<OutlineStatus> {
    let name = storage::outline_file_name(&code, q.year, q.trimester);
    let outline_url = state.files.url_if_exists(OUTLINES, &name).await;
    Json(OutlineStatus {
        course_title: state
            .catalog
            .course_title(q.year, q.trimester, &code)
            .unwrap_or_default(),
        course_code: code,
        year: q.year,
        trimester: q.trimester,
        outline_url,
        can_reupload: true,
    })
}

/// Stores the outline and, when the PDF yields any outcomes, re-syncs the
/// course's learning outcomes from it. Extraction never fails the upload.
pub async fn upload_outline(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(q): Query<TermQuery>,
    mut mp: Multipart,
) -> AppResult<Json<OutlineUploaded>> {
    let upload = read_upload(&mut mp)
        .await?
        .ok_or_else(|| AppError::validation("Please choose a PDF file."))?;
    if !storage::has_extension(&upload.file_name, "pdf") {
        return Err(AppError::validation("Only PDF files are supported."));
    }

    let name = storage::outline_file_name(&code, q.year, q.trimester);
    let stored = state.files.save(OUTLINES, &name, &upload.bytes).await?;
    tracing::info!(course_code = %code, url = %stored.url, "course outline stored");

    let extracted = outline::extract_outcomes_from_pdf(upload.bytes).await;
    let (outcomes_replaced, learning_outcomes) = if extracted.is_empty() {
        (false, outcomes::list_for_course(&state.db, &code).await?)
    } else {
        (true, outcomes::replace_for_course(&state.db, &code, &extracted).await?)
    };

    Ok(Json(OutlineUploaded {
        outline_url: stored.url,
        extracted,
        outcomes_replaced,
        learning_outcomes,
    }))
}

pub async fn learning_outcomes(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<CourseOutcomes>> {
    let learning_outcomes = outcomes::list_for_course(&state.db, &code).await?;
    Ok(Json(CourseOutcomes {
        course_code: code,
        can_edit: true,
        learning_outcomes,
    }))
}

pub async fn save_learning_outcomes(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<SaveOutcomesReq>,
) -> AppResult<Json<CourseOutcomes>> {
    let learning_outcomes = outcomes::replace_for_course(&state.db, &code, &req.outcomes).await?;
    Ok(Json(CourseOutcomes {
        course_code: code,
        can_edit: true,
        learning_outcomes,
    }))
}
