use sqlx::{query, query_as, query_scalar};

use crate::db::Db;
use crate::error::{AppError, AppResult};
use crate::models::{Assignment, AssignmentFile};

const COLUMNS: &str = "id, course_code, assessment_name, year, trimester, created_at";

/// Assignments come into existence the first time their context is visited.
pub async fn find_or_create(
    db: &Db,
    course_code: &str,
    assessment_name: &str,
    year: i64,
    trimester: i64,
) -> AppResult<Assignment> {
    let course_code = course_code.trim();
    let assessment_name = assessment_name.trim();
    if course_code.is_empty() || assessment_name.is_empty() {
        return Err(AppError::validation(
            "Course code and assessment name are required.",
        ));
    }

    let created = query(
        r#"
        INSERT INTO assignments (course_code, assessment_name, year, trimester)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (course_code, assessment_name, year, trimester) DO NOTHING
        "#,
    )
    .bind(course_code)
    .bind(assessment_name)
    .bind(year)
    .bind(trimester)
    .execute(db)
    .await?
    .rows_affected();
    if created > 0 {
        tracing::info!(course_code, assessment_name, year, trimester, "assignment created");
    }

    let a = query_as::<_, Assignment>(&format!(
        "SELECT {COLUMNS} FROM assignments
         WHERE course_code = ?1 AND assessment_name = ?2 AND year = ?3 AND trimester = ?4"
    ))
    .bind(course_code)
    .bind(assessment_name)
    .bind(year)
    .bind(trimester)
    .fetch_one(db)
    .await?;
    Ok(a)
}

pub async fn get(db: &Db, id: i64) -> AppResult<Assignment> {
    query_as::<_, Assignment>(&format!("SELECT {COLUMNS} FROM assignments WHERE id = ?1"))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Assignment not found."))
}

/// Newest version first.
pub async fn list_files(db: &Db, assignment_id: i64) -> AppResult<Vec<AssignmentFile>> {
    let files = query_as::<_, AssignmentFile>(
        r#"
        SELECT id, assignment_id, original_file_name, stored_file_name, file_path,
               version_number, upload_date
        FROM assignment_files
        WHERE assignment_id = ?1
        ORDER BY version_number DESC
        "#,
    )
    .bind(assignment_id)
    .fetch_all(db)
    .await?;
    Ok(files)
}

/// Records an uploaded file as the next version, `max(existing) + 1`.
pub async fn add_file(
    db: &Db,
    assignment_id: i64,
    original_file_name: &str,
    stored_file_name: &str,
    file_path: &str,
) -> AppResult<AssignmentFile> {
    let mut tx = db.begin().await?;

    let latest: i64 = query_scalar(
        "SELECT COALESCE(MAX(version_number), 0) FROM assignment_files WHERE assignment_id = ?1",
    )
    .bind(assignment_id)
    .fetch_one(&mut *tx)
    .await?;

    let file = query_as::<_, AssignmentFile>(
        r#"
        INSERT INTO assignment_files
            (assignment_id, original_file_name, stored_file_name, file_path, version_number)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id, assignment_id, original_file_name, stored_file_name, file_path,
                  version_number, upload_date
        "#,
    )
    .bind(assignment_id)
    .bind(original_file_name)
    .bind(stored_file_name)
    .bind(file_path)
    .bind(latest + 1)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(assignment_id, version = file.version_number, "assignment file recorded");
    Ok(file)
}

pub async fn selected_outcome_ids(db: &Db, assignment_id: i64) -> AppResult<Vec<i64>> {
    let ids = query_scalar::<_, i64>(
        r#"
        SELECT s.learning_outcome_id
        FROM assignment_selected_outcomes s
        JOIN learning_outcomes lo ON lo.id = s.learning_outcome_id
        WHERE s.assignment_id = ?1
        ORDER BY lo.order_number
        "#,
    )
    .bind(assignment_id)
    .fetch_all(db)
    .await?;
    Ok(ids)
}
