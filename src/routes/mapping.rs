use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::auth::Lecturer;
use crate::error::AppResult;
use crate::models::{MappingSaveReport, MappingScreen, SaveMappingsReq};
use crate::state::AppState;
use crate::store::mappings;

#[derive(Serialize, Debug)]
pub struct MappingsSaved {
    pub message: &'static str,
    pub report: MappingSaveReport,
}

pub async fn index(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Path(assignment_id): Path<i64>,
) -> AppResult<Json<MappingScreen>> {
    Ok(Json(mappings::mapping_screen(&state.db, assignment_id).await?))
}

pub async fn save(
    _lecturer: Lecturer,
    State(state): State<AppState>,
    Path(assignment_id): Path<i64>,
    Json(req): Json<SaveMappingsReq>,
) -> AppResult<Json<MappingsSaved>> {
    let report = mappings::save_mappings(&state.db, assignment_id, &req).await?;
    Ok(Json(MappingsSaved {
        message: "LO mappings and weights saved successfully!",
        report,
    }))
}
