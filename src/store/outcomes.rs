use sqlx::{query, query_as};

use crate::db::Db;
use crate::error::AppResult;
use crate::models::LearningOutcome;

/// Seeded for a course that has no outcomes yet when the mapping screen
/// first opens.
pub const DEFAULT_OUTCOMES: [&str; 6] = [
    "Analyse client requirements using current analysis techniques.",
    "Identify and relate whenever required appropriate project control techniques in an industry environment.",
    "Produce a comprehensive project plan for an industrial IT project; apply project principles and task management, resource management, risk management, project tracking, and project tools in industry environment.",
    "Implement the industrial IT project following the appropriate project management framework and System Development Life Cycle.",
    "Produce all relevant documentation.",
    "Develop both IT and workplace soft-skills, including working in groups, writing formal reports, carrying out individual research and/or delivering oral presentations.",
];

pub async fn list_for_course(db: &Db, course_code: &str) -> AppResult<Vec<LearningOutcome>> {
    let los = query_as::<_, LearningOutcome>(
        r#"
        SELECT id, course_code, outcome_text, order_number
        FROM learning_outcomes
        WHERE course_code = ?1
        ORDER BY order_number
        "#,
    )
    .bind(course_code)
    .fetch_all(db)
    .await?;
    Ok(los)
}

/// Discards every outcome of the course and inserts `texts` as LO1..LOn.
/// Blank entries are dropped and the rest trimmed. Mappings and assignment
/// selections that pointed at the old rows go with them.
pub async fn replace_for_course(
    db: &Db,
    course_code: &str,
    texts: &[String],
) -> AppResult<Vec<LearningOutcome>> {
    let cleaned: Vec<&str> = texts
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();

    let mut tx = db.begin().await?;
    let removed = query("DELETE FROM learning_outcomes WHERE course_code = ?1")
        .bind(course_code)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    for (i, text) in cleaned.iter().enumerate() {
        query(
            "INSERT INTO learning_outcomes (course_code, outcome_text, order_number) VALUES (?1, ?2, ?3)",
        )
        .bind(course_code)
        .bind(*text)
        .bind(i as i64 + 1)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    tracing::info!(course_code, removed, inserted = cleaned.len(), "learning outcomes replaced");
    list_for_course(db, course_code).await
}

pub async fn ensure_defaults(db: &Db, course_code: &str) -> AppResult<Vec<LearningOutcome>> {
    let existing = list_for_course(db, course_code).await?;
    if !existing.is_empty() {
        return Ok(existing);
    }
    let defaults: Vec<String> = DEFAULT_OUTCOMES.iter().map(|s| s.to_string()).collect();
    replace_for_course(db, course_code, &defaults).await
}
