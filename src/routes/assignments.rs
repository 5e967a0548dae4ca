use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::auth::Lecturer;
use crate::calendar;
use crate::error::{AppError, AppResult};
use crate::models::{AssignmentFile, AssignmentInfo, CourseContext};
use crate::routes::read_upload;
use crate::state::AppState;
use crate::storage::{self, ASSIGNMENTS};
use crate::store::assignments;

#[derive(Serialize, Debug)]
pub struct AssignmentContext {
    pub assessment_name: String,
    pub course_code: String,
    pub course_title: String,
    pub year: i64,
    pub trimester: i64,
    pub course_date: String,
}

fn course_title(state: &AppState, ctx: &CourseContext) -> String {
    ctx.course_title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| state.catalog.course_title(ctx.year, ctx.trimester, &ctx.course_code))
        .unwrap_or_default()
}

pub async fn context(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Query(ctx): Query<CourseContext>,
) -> Json<AssignmentContext> {
    Json(AssignmentContext {
        course_title: course_title(&state, &ctx),
        course_date: calendar::trimester_date_range(ctx.year, ctx.trimester),
        assessment_name: ctx.assessment_name,
        course_code: ctx.course_code,
        year: ctx.year,
        trimester: ctx.trimester,
    })
}

pub async fn information(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Query(ctx): Query<CourseContext>,
) -> AppResult<Json<AssignmentInfo>> {
    let assignment = assignments::find_or_create(
        &state.db,
        &ctx.course_code,
        &ctx.assessment_name,
        ctx.year,
        ctx.trimester,
    )
    .await?;
    let files = assignments::list_files(&state.db, assignment.id).await?;
    Ok(Json(AssignmentInfo {
        assignment,
        files,
        course_title: course_title(&state, &ctx),
        course_date: calendar::trimester_date_range(ctx.year, ctx.trimester),
    }))
}

/// New version of the assignment brief. The file is checked before the
/// assignment row or anything on disk is touched.
pub async fn upload(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Query(ctx): Query<CourseContext>,
    mut mp: Multipart,
) -> AppResult<(StatusCode, Json<AssignmentFile>)> {
    let upload = read_upload(&mut mp)
        .await?
        .ok_or_else(|| AppError::validation("Please choose a PDF file."))?;
    if !storage::has_extension(&upload.file_name, "pdf") {
        return Err(AppError::validation("Only PDF files are allowed."));
    }

    let assignment = assignments::find_or_create(
        &state.db,
        &ctx.course_code,
        &ctx.assessment_name,
        ctx.year,
        ctx.trimester,
    )
    .await?;

    let stored = state
        .files
        .save(ASSIGNMENTS, &storage::random_pdf_name(), &upload.bytes)
        .await?;
    let file = match assignments::add_file(
        &state.db,
        assignment.id,
        &upload.file_name,
        &stored.stored_name,
        &stored.url,
    )
    .await
    {
        Ok(file) => file,
        Err(e) => {
            // no row points at the file, so it must not stay on disk
            if let Err(cleanup) = state.files.remove(ASSIGNMENTS, &stored.stored_name).await {
                tracing::warn!(stored = %stored.stored_name, error = %cleanup, "orphaned upload not removed");
            }
            return Err(e);
        }
    };
    Ok((StatusCode::CREATED, Json(file)))
}
