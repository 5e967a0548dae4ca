use axum::extract::{Multipart, Path, State};
use axum::Json;

use crate::auth::Lecturer;
use crate::error::{AppError, AppResult};
use crate::models::{RubricEdit, RubricView};
use crate::routes::read_upload;
use crate::rubric_import;
use crate::state::AppState;
use crate::storage;
use crate::store::{assignments, rubrics};

pub async fn index(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Path(assignment_id): Path<i64>,
) -> AppResult<Json<Option<RubricView>>> {
    assignments::get(&state.db, assignment_id).await?;
    Ok(Json(rubrics::for_assignment(&state.db, assignment_id).await?))
}

/// Replaces the assignment's rubric with the uploaded spreadsheet.
pub async fn import(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Path(assignment_id): Path<i64>,
    mut mp: Multipart,
) -> AppResult<Json<RubricView>> {
    let upload = read_upload(&mut mp)
        .await?
        .ok_or_else(|| AppError::validation("Please choose an Excel file."))?;
    if !storage::has_extension(&upload.file_name, "xlsx") {
        return Err(AppError::validation("Only .xlsx spreadsheets are supported."));
    }
    assignments::get(&state.db, assignment_id).await?;

    let draft = rubric_import::parse_workbook(&upload.bytes)?;
    let view = rubrics::replace_rubric(&state.db, assignment_id, &draft).await?;
    Ok(Json(view))
}

pub async fn preview(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Path(rubric_id): Path<i64>,
) -> AppResult<Json<RubricView>> {
    Ok(Json(rubrics::get(&state.db, rubric_id).await?))
}

pub async fn edit(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Path(rubric_id): Path<i64>,
    Json(edit): Json<RubricEdit>,
) -> AppResult<Json<RubricView>> {
    Ok(Json(rubrics::apply_edit(&state.db, rubric_id, &edit).await?))
}
