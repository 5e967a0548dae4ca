use sqlx::{query, query_as, query_scalar};
use std::collections::HashMap;

use crate::db::Db;
use crate::error::{AppError, AppResult};
use crate::models::{
    CriterionLoMapping, CriterionView, Rubric, RubricCriterion, RubricEdit, RubricLevel, RubricView,
};
use crate::rubric_import::RubricDraft;

const LEVEL_SCORES: [i64; 5] = [4, 3, 2, 1, 0];

pub async fn for_assignment(db: &Db, assignment_id: i64) -> AppResult<Option<RubricView>> {
    let rubric = query_as::<_, Rubric>(
        "SELECT id, assignment_id, created_at FROM rubrics WHERE assignment_id = ?1",
    )
    .bind(assignment_id)
    .fetch_optional(db)
    .await?;
    match rubric {
        Some(r) => Ok(Some(load_view(db, r).await?)),
        None => Ok(None),
    }
}

pub async fn get(db: &Db, rubric_id: i64) -> AppResult<RubricView> {
    let rubric = query_as::<_, Rubric>("SELECT id, assignment_id, created_at FROM rubrics WHERE id = ?1")
        .bind(rubric_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Rubric not found."))?;
    load_view(db, rubric).await
}

async fn load_view(db: &Db, rubric: Rubric) -> AppResult<RubricView> {
    let criteria = query_as::<_, RubricCriterion>(
        "SELECT id, rubric_id, position, criterion_name FROM rubric_criteria
         WHERE rubric_id = ?1 ORDER BY position, id",
    )
    .bind(rubric.id)
    .fetch_all(db)
    .await?;

    let levels = query_as::<_, RubricLevel>(
        r#"
        SELECT l.id, l.criterion_id, l.score, l.scale_name, l.description
        FROM rubric_levels l
        JOIN rubric_criteria c ON c.id = l.criterion_id
        WHERE c.rubric_id = ?1
        ORDER BY l.score DESC, l.id
        "#,
    )
    .bind(rubric.id)
    .fetch_all(db)
    .await?;

    let mappings = query_as::<_, CriterionLoMapping>(
        r#"
        SELECT m.id, m.criterion_id, m.learning_outcome_id, m.weight
        FROM criterion_lo_mappings m
        JOIN rubric_criteria c ON c.id = m.criterion_id
        WHERE c.rubric_id = ?1
        ORDER BY m.id
        "#,
    )
    .bind(rubric.id)
    .fetch_all(db)
    .await?;

    let mut levels_by: HashMap<i64, Vec<RubricLevel>> = HashMap::new();
    for l in levels {
        levels_by.entry(l.criterion_id).or_default().push(l);
    }
    let mut mappings_by: HashMap<i64, Vec<CriterionLoMapping>> = HashMap::new();
    for m in mappings {
        mappings_by.entry(m.criterion_id).or_default().push(m);
    }

    let criteria = criteria
        .into_iter()
        .map(|c| CriterionView {
            levels: levels_by.remove(&c.id).unwrap_or_default(),
            mappings: mappings_by.remove(&c.id).unwrap_or_default(),
            criterion: c,
        })
        .collect();

    Ok(RubricView { rubric, criteria })
}

/// Re-import is destructive: the assignment's current rubric, with its
/// criteria, levels and mappings, is deleted before the draft is inserted.
/// Both happen in one transaction.
pub async fn replace_rubric(db: &Db, assignment_id: i64, draft: &RubricDraft) -> AppResult<RubricView> {
    validate_draft(draft)?;

    let mut tx = db.begin().await?;

    let exists: Option<i64> = query_scalar("SELECT id FROM assignments WHERE id = ?1")
        .bind(assignment_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(AppError::not_found("Assignment not found."));
    }

    let removed = query("DELETE FROM rubrics WHERE assignment_id = ?1")
        .bind(assignment_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let rubric_id: i64 = query_scalar("INSERT INTO rubrics (assignment_id) VALUES (?1) RETURNING id")
        .bind(assignment_id)
        .fetch_one(&mut *tx)
        .await?;

    for (pos, c) in draft.criteria.iter().enumerate() {
        let criterion_id: i64 = query_scalar(
            "INSERT INTO rubric_criteria (rubric_id, position, criterion_name) VALUES (?1, ?2, ?3) RETURNING id",
        )
        .bind(rubric_id)
        .bind(pos as i64 + 1)
        .bind(&c.name)
        .fetch_one(&mut *tx)
        .await?;

        for l in &c.levels {
            query(
                "INSERT INTO rubric_levels (criterion_id, score, scale_name, description) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(criterion_id)
            .bind(l.score)
            .bind(&l.scale_name)
            .bind(&l.description)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    tracing::info!(
        target: "import",
        assignment_id,
        rubric_id,
        replaced = removed > 0,
        criteria = draft.criteria.len(),
        "rubric imported"
    );
    get(db, rubric_id).await
}

fn validate_draft(draft: &RubricDraft) -> AppResult<()> {
    if draft.criteria.is_empty() {
        return Err(AppError::validation("The spreadsheet contains no rubric criteria."));
    }
    for c in &draft.criteria {
        let scores: Vec<i64> = c.levels.iter().map(|l| l.score).collect();
        if c.name.trim().is_empty() || scores != LEVEL_SCORES {
            return Err(AppError::validation(format!(
                "criterion '{}' must have exactly five levels scored 4 to 0",
                c.name
            )));
        }
    }
    Ok(())
}

/// In-place edit from the rubric editor. Ids that do not belong to this
/// rubric are ignored; absent fields keep their stored value.
pub async fn apply_edit(db: &Db, rubric_id: i64, edit: &RubricEdit) -> AppResult<RubricView> {
    for c in &edit.criteria {
        for l in &c.levels {
            if let Some(score) = l.score {
                if !(0..=4).contains(&score) {
                    return Err(AppError::validation("Level scores must be between 0 and 4."));
                }
            }
        }
    }

    let mut tx = db.begin().await?;
    let exists: Option<i64> = query_scalar("SELECT id FROM rubrics WHERE id = ?1")
        .bind(rubric_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(AppError::not_found("Rubric not found."));
    }

    let mut touched = 0u64;
    for c in &edit.criteria {
        if let Some(name) = c.criterion_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            touched += query(
                "UPDATE rubric_criteria SET criterion_name = ?1 WHERE id = ?2 AND rubric_id = ?3",
            )
            .bind(name)
            .bind(c.id)
            .bind(rubric_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        for l in &c.levels {
            touched += query(
                r#"
                UPDATE rubric_levels
                SET score = COALESCE(?1, score),
                    scale_name = COALESCE(?2, scale_name),
                    description = COALESCE(?3, description)
                WHERE id = ?4
                  AND criterion_id = ?5
                  AND criterion_id IN (SELECT id FROM rubric_criteria WHERE rubric_id = ?6)
                "#,
            )
            .bind(l.score)
            .bind(l.scale_name.as_deref())
            .bind(l.description.as_deref())
            .bind(l.id)
            .bind(c.id)
            .bind(rubric_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
    }

    // every criterion must still hold one level per score 4..0
    let broken: Vec<i64> = query_scalar(
        r#"
        SELECT c.id
        FROM rubric_criteria c
        LEFT JOIN rubric_levels l ON l.criterion_id = c.id
        WHERE c.rubric_id = ?1
        GROUP BY c.id
        HAVING COUNT(l.id) <> 5 OR COUNT(DISTINCT l.score) <> 5
        "#,
    )
    .bind(rubric_id)
    .fetch_all(&mut *tx)
    .await?;
    if !broken.is_empty() {
        tracing::warn!(target: "import", rubric_id, criteria = ?broken, "rubric edit rejected");
        return Err(AppError::validation(
            "Each criterion needs exactly one level for each score from 4 to 0.",
        ));
    }
    tx.commit().await?;

    tracing::info!(rubric_id, rows = touched, "rubric edited");
    get(db, rubric_id).await
}
