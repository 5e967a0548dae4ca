use sqlx::{query, query_scalar};
use std::collections::HashSet;

use crate::db::Db;
use crate::error::{AppError, AppResult};
use crate::models::{MappingSaveReport, MappingScreen, SaveMappingsReq};
use crate::store::{assignments, outcomes, rubrics};

/// Everything the mapping screen needs. Outcomes are seeded with the
/// defaults if the course has none; with no saved selection every outcome
/// counts as selected.
pub async fn mapping_screen(db: &Db, assignment_id: i64) -> AppResult<MappingScreen> {
    let assignment = assignments::get(db, assignment_id).await?;
    let rubric = rubrics::for_assignment(db, assignment_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found("Please create a rubric first before mapping learning outcomes.")
        })?;

    let learning_outcomes = outcomes::ensure_defaults(db, &assignment.course_code).await?;
    let mut selected_lo_ids = assignments::selected_outcome_ids(db, assignment_id).await?;
    if selected_lo_ids.is_empty() {
        selected_lo_ids = learning_outcomes.iter().map(|lo| lo.id).collect();
    }

    Ok(MappingScreen {
        assignment_id,
        rubric,
        learning_outcomes,
        selected_lo_ids,
    })
}

/// Full replace of the assignment's criterion/outcome links.
///
/// A tuple contributes nothing when its criterion is not on the current
/// rubric or its weight is not strictly positive. Otherwise its weight is
/// copied onto one row per listed outcome of the assignment's course.
pub async fn save_mappings(
    db: &Db,
    assignment_id: i64,
    req: &SaveMappingsReq,
) -> AppResult<MappingSaveReport> {
    let assignment = assignments::get(db, assignment_id).await?;

    let mut tx = db.begin().await?;

    let rubric_id: i64 = query_scalar("SELECT id FROM rubrics WHERE assignment_id = ?1")
        .bind(assignment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Rubric not found."))?;

    let criteria: HashSet<i64> =
        query_scalar::<_, i64>("SELECT id FROM rubric_criteria WHERE rubric_id = ?1")
            .bind(rubric_id)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .collect();
    let course_outcomes: HashSet<i64> =
        query_scalar::<_, i64>("SELECT id FROM learning_outcomes WHERE course_code = ?1")
            .bind(&assignment.course_code)
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .collect();

    let mut report = MappingSaveReport::default();
    let mut rows: Vec<(i64, i64, f64)> = Vec::new();
    for input in &req.mappings {
        if !criteria.contains(&input.criterion_id) || !(input.weight.is_finite() && input.weight > 0.0) {
            report.tuples_dropped += 1;
            continue;
        }
        for lo in &input.selected_lo_ids {
            if course_outcomes.contains(lo) {
                rows.push((input.criterion_id, *lo, input.weight));
            } else {
                report.outcome_ids_dropped += 1;
            }
        }
    }

    let mut seen = HashSet::new();
    let selected: Vec<i64> = req
        .selected_lo_ids
        .iter()
        .copied()
        .filter(|id| course_outcomes.contains(id) && seen.insert(*id))
        .collect();

    query("DELETE FROM assignment_selected_outcomes WHERE assignment_id = ?1")
        .bind(assignment_id)
        .execute(&mut *tx)
        .await?;
    for lo in &selected {
        query("INSERT INTO assignment_selected_outcomes (assignment_id, learning_outcome_id) VALUES (?1, ?2)")
            .bind(assignment_id)
            .bind(lo)
            .execute(&mut *tx)
            .await?;
    }

    let removed = query(
        "DELETE FROM criterion_lo_mappings
         WHERE criterion_id IN (SELECT id FROM rubric_criteria WHERE rubric_id = ?1)",
    )
    .bind(rubric_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    for (criterion_id, lo, weight) in &rows {
        query("INSERT INTO criterion_lo_mappings (criterion_id, learning_outcome_id, weight) VALUES (?1, ?2, ?3)")
            .bind(criterion_id)
            .bind(lo)
            .bind(weight)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    report.rows_inserted = rows.len();
    tracing::info!(
        assignment_id,
        rubric_id,
        removed,
        inserted = report.rows_inserted,
        dropped = report.tuples_dropped,
        selected = selected.len(),
        "lo mappings saved"
    );
    Ok(report)
}
